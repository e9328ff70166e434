// ── Check-in desk ──
//
// Owns the two submission paths (scanner and manual entry), the manual
// cooldown and the confirmation modal. Every attempt ends in exactly one
// notification.

mod modal;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use visitgate_api::{CheckinReply, CheckinRequest, DashboardClient};

use crate::config::CheckinConfig;
use crate::error::CoreError;
use crate::lock;
use crate::notify::{Notification, Notifier};

pub use modal::{ConfirmationModal, PurposeChoice};

/// Shown when the request never produced a usable reply.
pub const NETWORK_ERROR_MESSAGE: &str = "A network error occurred.";
/// Shown when the backend refused without saying why.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred.";

const OUTCOME_CHANNEL_CAPACITY: usize = 64;

/// A validated check-in to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinSubmission {
    code: String,
    purpose: Option<String>,
    destination: Option<String>,
}

impl CheckinSubmission {
    /// The code is trimmed and must not be empty.
    pub fn new(code: &str) -> Result<Self, CoreError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CoreError::validation("check-in code is empty"));
        }
        Ok(Self {
            code: code.to_owned(),
            purpose: None,
            destination: None,
        })
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_destination(mut self, destination: Option<String>) -> Self {
        self.destination = destination;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn to_request(&self) -> CheckinRequest {
        CheckinRequest {
            qr_data: self.code.clone(),
            purpose: self.purpose.clone(),
            destination: self.destination.clone(),
        }
    }
}

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinOutcome {
    Completed { message: String, details: Vec<String> },
    /// The modal is now open with this state.
    NeedsConfirmation(ConfirmationModal),
    Failed { message: String },
}

#[derive(Debug, Default)]
struct DeskState {
    manual_input: String,
    modal: Option<ConfirmationModal>,
    cooldown_until: Option<Instant>,
}

pub struct CheckinDesk {
    client: Arc<DashboardClient>,
    config: CheckinConfig,
    notifier: Arc<dyn Notifier>,
    state: Mutex<DeskState>,
    outcomes: broadcast::Sender<CheckinOutcome>,
}

impl CheckinDesk {
    pub fn new(
        client: Arc<DashboardClient>,
        config: CheckinConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            client,
            config,
            notifier,
            state: Mutex::new(DeskState::default()),
            outcomes,
        }
    }

    pub fn config(&self) -> &CheckinConfig {
        &self.config
    }

    /// Receive every outcome from now on, whichever path produced it.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<CheckinOutcome> {
        self.outcomes.subscribe()
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Send one check-in and surface its result.
    pub async fn submit(&self, submission: CheckinSubmission) -> CheckinOutcome {
        let request = submission.to_request();
        debug!(code = %request.qr_data, purpose = ?request.purpose, "submitting check-in");

        let outcome = match self.client.scan_checkin(&request).await {
            Ok(CheckinReply::Completed { message, details }) => {
                info!(code = %request.qr_data, "check-in accepted");
                lock(&self.state).manual_input.clear();
                self.notifier.notify(&Notification::success(message.clone()));
                CheckinOutcome::Completed { message, details }
            }
            Ok(CheckinReply::NeedsConfirmation {
                name,
                purpose,
                destination,
            }) => {
                let modal = ConfirmationModal::prefill(
                    submission.code(),
                    name,
                    purpose.as_deref(),
                    destination.as_deref(),
                    &self.config,
                );
                info!(visitor = %modal.visitor_name(), "check-in needs confirmation");
                lock(&self.state).modal = Some(modal.clone());
                CheckinOutcome::NeedsConfirmation(modal)
            }
            Err(e) => {
                let message = failure_message(&e);
                warn!(code = %request.qr_data, error = %e, "check-in failed");
                self.notifier.notify(&Notification::error(message.clone()));
                CheckinOutcome::Failed { message }
            }
        };

        // No receivers is fine.
        let _ = self.outcomes.send(outcome.clone());
        outcome
    }

    /// Scanner path: no cooldown. Blank codes are ignored.
    pub async fn submit_scan(&self, code: &str) -> Option<CheckinOutcome> {
        let submission = CheckinSubmission::new(code).ok()?;
        Some(self.submit(submission).await)
    }

    /// Manual path. Returns `None` while cooling down or when the input
    /// is blank; otherwise the cooldown restarts at `now`.
    pub async fn submit_manual(&self, now: Instant) -> Option<CheckinOutcome> {
        let submission = {
            let mut state = lock(&self.state);
            if state.cooldown_until.is_some_and(|until| now < until) {
                debug!("manual submit ignored during cooldown");
                return None;
            }
            let submission = CheckinSubmission::new(&state.manual_input).ok()?;
            state.cooldown_until = Some(now + self.config.cooldown);
            submission
        };
        Some(self.submit(submission).await)
    }

    pub fn set_manual_input(&self, text: impl Into<String>) {
        lock(&self.state).manual_input = text.into();
    }

    pub fn manual_input(&self) -> String {
        lock(&self.state).manual_input.clone()
    }

    pub fn is_cooling_down(&self, now: Instant) -> bool {
        lock(&self.state)
            .cooldown_until
            .is_some_and(|until| now < until)
    }

    // ── Modal ────────────────────────────────────────────────────────

    pub fn modal(&self) -> Option<ConfirmationModal> {
        lock(&self.state).modal.clone()
    }

    pub fn select_purpose(&self, value: &str) -> Result<(), CoreError> {
        self.with_modal(|m, config| m.select_purpose(value, config))?
    }

    pub fn set_other_purpose(&self, text: &str) -> Result<(), CoreError> {
        self.with_modal(|m, _| m.set_other_purpose(text))
    }

    pub fn select_destination(&self, value: Option<&str>) -> Result<(), CoreError> {
        self.with_modal(|m, config| m.select_destination(value, config))?
    }

    pub fn cancel_modal(&self) {
        lock(&self.state).modal = None;
    }

    /// Validate the open modal and resubmit with its purpose and
    /// destination. On a validation error the modal stays open and
    /// nothing is sent; otherwise it closes before the request goes out.
    pub async fn confirm_modal(&self) -> Result<CheckinOutcome, CoreError> {
        let submission = {
            let mut state = lock(&self.state);
            let modal = state.modal.as_ref().ok_or(CoreError::NoPendingConfirmation)?;
            let submission = modal.to_submission(self.config.destination_required)?;
            state.modal = None;
            submission
        };
        Ok(self.submit(submission).await)
    }

    fn with_modal<R>(
        &self,
        f: impl FnOnce(&mut ConfirmationModal, &CheckinConfig) -> R,
    ) -> Result<R, CoreError> {
        let mut state = lock(&self.state);
        let modal = state.modal.as_mut().ok_or(CoreError::NoPendingConfirmation)?;
        Ok(f(modal, &self.config))
    }
}

impl std::fmt::Debug for CheckinDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckinDesk")
            .field("base_url", &self.client.base_url().as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Operator-facing text for a failed attempt.
fn failure_message(err: &visitgate_api::Error) -> String {
    match err {
        visitgate_api::Error::Authentication { .. } | visitgate_api::Error::Rejected { .. } => err
            .server_message()
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_owned(),
        visitgate_api::Error::Transport(_)
        | visitgate_api::Error::InvalidUrl(_)
        | visitgate_api::Error::Tls(_)
        | visitgate_api::Error::Deserialization { .. } => NETWORK_ERROR_MESSAGE.to_owned(),
    }
}

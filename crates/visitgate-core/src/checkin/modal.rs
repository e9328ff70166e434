// ── Confirmation modal ──
//
// Form state shown when the backend answers a check-in with
// `show_modal`. Pure data: opening, editing and validating the form
// never talks to the network.

use crate::config::{CheckinConfig, OTHER_PURPOSE};
use crate::error::CoreError;

use super::CheckinSubmission;

/// Which purpose option is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurposeChoice {
    Unset,
    Known(String),
    /// The catch-all option; the free-text field supplies the value.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationModal {
    code: String,
    visitor_name: String,
    purpose: PurposeChoice,
    other_purpose: String,
    destination: Option<String>,
}

impl ConfirmationModal {
    /// Open the form for `code` using what the backend already knows.
    ///
    /// A purpose outside the configured options selects "Other" with the
    /// raw value in the free-text field. A destination outside the
    /// configured options is left unselected.
    pub fn prefill(
        code: impl Into<String>,
        visitor_name: impl Into<String>,
        purpose: Option<&str>,
        destination: Option<&str>,
        options: &CheckinConfig,
    ) -> Self {
        let (purpose, other_purpose) = match purpose.map(str::trim) {
            None | Some("") => (PurposeChoice::Unset, String::new()),
            Some(OTHER_PURPOSE) => (PurposeChoice::Other, String::new()),
            Some(p) if is_option(&options.purposes, p) => {
                (PurposeChoice::Known(p.to_owned()), String::new())
            }
            Some(p) => (PurposeChoice::Other, p.to_owned()),
        };

        let destination = destination
            .map(str::trim)
            .filter(|d| !d.is_empty() && accepts(&options.destinations, d))
            .map(str::to_owned);

        Self {
            code: code.into(),
            visitor_name: visitor_name.into(),
            purpose,
            other_purpose,
            destination,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn visitor_name(&self) -> &str {
        &self.visitor_name
    }

    pub fn purpose(&self) -> &PurposeChoice {
        &self.purpose
    }

    /// Free-text purpose, present only while "Other" is selected.
    pub fn other_purpose(&self) -> Option<&str> {
        self.other_purpose_visible()
            .then_some(self.other_purpose.as_str())
    }

    pub fn other_purpose_visible(&self) -> bool {
        self.purpose == PurposeChoice::Other
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Select a purpose option. An empty value clears the selection.
    pub fn select_purpose(
        &mut self,
        value: &str,
        options: &CheckinConfig,
    ) -> Result<(), CoreError> {
        let value = value.trim();
        self.purpose = if value.is_empty() {
            PurposeChoice::Unset
        } else if value == OTHER_PURPOSE {
            PurposeChoice::Other
        } else if is_option(&options.purposes, value) {
            self.other_purpose.clear();
            PurposeChoice::Known(value.to_owned())
        } else {
            return Err(CoreError::validation(format!("unknown purpose '{value}'")));
        };
        Ok(())
    }

    pub fn set_other_purpose(&mut self, text: impl Into<String>) {
        self.other_purpose = text.into();
    }

    pub fn select_destination(
        &mut self,
        value: Option<&str>,
        options: &CheckinConfig,
    ) -> Result<(), CoreError> {
        match value.map(str::trim) {
            None | Some("") => self.destination = None,
            Some(d) if accepts(&options.destinations, d) => self.destination = Some(d.to_owned()),
            Some(d) => {
                return Err(CoreError::validation(format!("unknown destination '{d}'")));
            }
        }
        Ok(())
    }

    /// The purpose that would be submitted, if any.
    pub fn resolved_purpose(&self) -> Option<String> {
        match &self.purpose {
            PurposeChoice::Unset => None,
            PurposeChoice::Known(p) => Some(p.clone()),
            PurposeChoice::Other => {
                let text = self.other_purpose.trim();
                (!text.is_empty()).then(|| text.to_owned())
            }
        }
    }

    /// Validate the form and build the resubmission.
    pub fn to_submission(
        &self,
        destination_required: bool,
    ) -> Result<CheckinSubmission, CoreError> {
        let purpose = self
            .resolved_purpose()
            .ok_or_else(|| CoreError::validation("Please select a purpose."))?;
        if destination_required && self.destination.is_none() {
            return Err(CoreError::validation("Please select a destination."));
        }

        Ok(CheckinSubmission::new(&self.code)?
            .with_purpose(purpose)
            .with_destination(self.destination.clone()))
    }
}

fn is_option(options: &[String], value: &str) -> bool {
    options.iter().any(|o| o == value)
}

/// An empty option list accepts any value.
fn accepts(options: &[String], value: &str) -> bool {
    options.is_empty() || is_option(options, value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn options() -> CheckinConfig {
        CheckinConfig {
            destinations: vec!["Registrar".into(), "Library".into()],
            ..CheckinConfig::default()
        }
    }

    #[test]
    fn known_purpose_is_selected() {
        let modal = ConfirmationModal::prefill("QR1", "Jane", Some("Delivery"), None, &options());
        assert_eq!(modal.purpose(), &PurposeChoice::Known("Delivery".into()));
        assert!(!modal.other_purpose_visible());
        assert_eq!(modal.other_purpose(), None);
    }

    #[test]
    fn unknown_purpose_goes_to_other_field() {
        let modal = ConfirmationModal::prefill(
            "QR1",
            "Jane",
            Some("Birthday Party"),
            Some("Library"),
            &options(),
        );
        assert_eq!(modal.purpose(), &PurposeChoice::Other);
        assert_eq!(modal.other_purpose(), Some("Birthday Party"));
        assert_eq!(modal.destination(), Some("Library"));
    }

    #[test]
    fn unknown_destination_is_left_unselected() {
        let modal = ConfirmationModal::prefill("QR1", "Jane", None, Some("Moon"), &options());
        assert_eq!(modal.purpose(), &PurposeChoice::Unset);
        assert_eq!(modal.destination(), None);
    }

    #[test]
    fn other_purpose_is_trimmed_on_submit() {
        let opts = options();
        let mut modal = ConfirmationModal::prefill("QR1", "Jane", None, Some("Library"), &opts);
        modal.select_purpose(OTHER_PURPOSE, &opts).expect("valid option");
        modal.set_other_purpose("  Campus tour ");

        let submission = modal.to_submission(true).expect("complete form");
        let request = submission.to_request();
        assert_eq!(request.purpose.as_deref(), Some("Campus tour"));
        assert_eq!(request.destination.as_deref(), Some("Library"));
    }

    #[test]
    fn blank_other_purpose_is_rejected() {
        let opts = options();
        let mut modal = ConfirmationModal::prefill("QR1", "Jane", None, Some("Library"), &opts);
        modal.select_purpose(OTHER_PURPOSE, &opts).expect("valid option");
        modal.set_other_purpose("   ");
        assert!(matches!(
            modal.to_submission(true),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn missing_destination_only_matters_when_required() {
        let modal = ConfirmationModal::prefill("QR1", "Jane", Some("Meeting"), None, &options());
        assert!(modal.to_submission(true).is_err());
        assert!(modal.to_submission(false).is_ok());
    }

    #[test]
    fn switching_to_known_purpose_clears_free_text() {
        let opts = options();
        let mut modal =
            ConfirmationModal::prefill("QR1", "Jane", Some("Birthday Party"), None, &opts);
        modal.select_purpose("Meeting", &opts).expect("valid option");
        modal.select_purpose(OTHER_PURPOSE, &opts).expect("valid option");
        assert_eq!(modal.other_purpose(), Some(""));
        assert!(modal.select_purpose("Skydiving", &opts).is_err());
    }
}

//! Shared helpers for command handlers.

use std::sync::Arc;
use std::time::Duration;

use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use visitgate_core::{
    AppContext, CheckinDesk, ConfirmationModal, LogNotifier, Notifier, OTHER_PURPOSE,
};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::render::{ChartBoard, TerminalNotifier, TerminalRenderer};

/// Build the application context for a dashboard-bound command.
pub fn connect(global: &GlobalOpts) -> Result<(AppContext, Arc<ChartBoard>), CliError> {
    let dashboard_config = config::build_dashboard_config(global)?;
    connect_with(dashboard_config, global)
}

pub fn connect_with(
    dashboard_config: visitgate_core::DashboardConfig,
    global: &GlobalOpts,
) -> Result<(AppContext, Arc<ChartBoard>), CliError> {
    let color = output::should_color(&global.color);
    let board = Arc::new(ChartBoard::default());
    let renderer = Arc::new(TerminalRenderer::new(Arc::clone(&board), color));
    let notifier: Arc<dyn Notifier> = if global.quiet {
        Arc::new(LogNotifier)
    } else {
        Arc::new(TerminalNotifier::new(color))
    };

    tracing::debug!(url = %dashboard_config.url, "building app context");
    let ctx = AppContext::new(dashboard_config, renderer, notifier)?;
    Ok((ctx, board))
}

/// Spinner on stderr, hidden in quiet mode or for machine-readable output.
pub fn spinner(global: &GlobalOpts, message: String) -> ProgressBar {
    if global.quiet || !matches!(global.output, OutputFormat::Table) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Confirmation modal ──────────────────────────────────────────────

/// Select a purpose on the open modal; values outside the configured
/// options go through "Other".
pub fn apply_purpose(desk: &CheckinDesk, purpose: &str) -> Result<(), CliError> {
    if desk.config().purposes.iter().any(|p| p == purpose) {
        desk.select_purpose(purpose)?;
    } else {
        desk.select_purpose(OTHER_PURPOSE)?;
        desk.set_other_purpose(purpose)?;
    }
    Ok(())
}

/// What the open modal still lacks, phrased for an error message.
pub fn missing_fields(desk: &CheckinDesk, modal: &ConfirmationModal) -> String {
    let purpose = modal.resolved_purpose().is_none();
    let destination = desk.config().destination_required && modal.destination().is_none();
    match (purpose, destination) {
        (true, true) => "a purpose and a destination".into(),
        (false, true) => "a destination".into(),
        _ => "a purpose".into(),
    }
}

/// Ask for whatever the open modal is missing.
pub fn prompt_modal(desk: &CheckinDesk) -> Result<(), CliError> {
    let Some(modal) = desk.modal() else {
        return Ok(());
    };
    let options = desk.config();
    eprintln!("Confirm visit for {}", modal.visitor_name());

    if modal.resolved_purpose().is_none() {
        let idx = Select::new()
            .with_prompt("Purpose")
            .items(&options.purposes)
            .default(0)
            .interact()
            .map_err(prompt_err)?;
        let chosen = options.purposes.get(idx).map_or(OTHER_PURPOSE, String::as_str);
        desk.select_purpose(chosen)?;

        if chosen == OTHER_PURPOSE {
            let text: String = Input::new()
                .with_prompt("Please specify")
                .with_initial_text(modal.other_purpose().unwrap_or_default())
                .interact_text()
                .map_err(prompt_err)?;
            desk.set_other_purpose(&text)?;
        }
    }

    if modal.destination().is_none() && options.destination_required {
        let destination = if options.destinations.is_empty() {
            Input::<String>::new()
                .with_prompt("Destination")
                .interact_text()
                .map_err(prompt_err)?
        } else {
            let idx = Select::new()
                .with_prompt("Destination")
                .items(&options.destinations)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            options.destinations.get(idx).cloned().unwrap_or_default()
        };
        desk.select_destination(Some(&destination))?;
    }
    Ok(())
}

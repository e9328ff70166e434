//! Check-in command: one manual submission, with the confirmation modal
//! filled from flags or prompts.

use std::io::IsTerminal;
use std::time::Instant;

use serde::Serialize;

use visitgate_core::{CheckinDesk, CheckinOutcome, CoreError};

use crate::cli::{CheckinArgs, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct CheckinReport {
    code: String,
    message: String,
    details: Vec<String>,
}

pub async fn handle(args: CheckinArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, _board) = util::connect(global)?;
    let desk = ctx.desk();

    desk.set_manual_input(args.code.as_str());
    let outcome = desk
        .submit_manual(Instant::now())
        .await
        .ok_or_else(|| CliError::Validation {
            field: "code".into(),
            reason: "code cannot be empty".into(),
        })?;

    let outcome = match outcome {
        CheckinOutcome::NeedsConfirmation(_) => confirm(desk, &args, global).await?,
        other => other,
    };

    match outcome {
        CheckinOutcome::Completed { message, details } => {
            let report = CheckinReport {
                code: args.code.trim().to_owned(),
                message,
                details,
            };
            let rendered = output::render_single(
                &global.output,
                &report,
                |r| r.details.iter().map(|d| format!("  {d}")).collect::<Vec<_>>().join("\n"),
                |r| r.message.clone(),
            )?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
        CheckinOutcome::Failed { message } => Err(CliError::CheckinFailed { message }),
        CheckinOutcome::NeedsConfirmation(_) => Err(CliError::Internal(
            "dashboard asked for confirmation twice".into(),
        )),
    }
}

/// Fill the open modal from flags, prompt for the rest when attached to
/// a terminal, then resubmit.
async fn confirm(
    desk: &CheckinDesk,
    args: &CheckinArgs,
    global: &GlobalOpts,
) -> Result<CheckinOutcome, CliError> {
    if let Some(ref purpose) = args.purpose {
        util::apply_purpose(desk, purpose)?;
    }
    if let Some(ref destination) = args.destination {
        desk.select_destination(Some(destination))?;
    }

    match desk.confirm_modal().await {
        Ok(outcome) => Ok(outcome),
        Err(CoreError::ValidationFailed { .. })
            if !global.yes && std::io::stdin().is_terminal() =>
        {
            util::prompt_modal(desk)?;
            Ok(desk.confirm_modal().await?)
        }
        Err(CoreError::ValidationFailed { .. }) => {
            let missing = desk
                .modal()
                .map_or_else(|| "a purpose".into(), |m| util::missing_fields(desk, &m));
            desk.cancel_modal();
            Err(CliError::ConfirmationRequired { missing })
        }
        Err(e) => Err(e.into()),
    }
}

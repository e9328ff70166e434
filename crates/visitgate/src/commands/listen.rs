//! Listen command: feed raw keystrokes to the scan disambiguator and
//! check in every scanner burst it recognizes.

use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode,
};
use crossterm::terminal;
use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use visitgate_core::{CheckinDesk, CheckinOutcome, CoreError, Focus, Key};

use crate::cli::{GlobalOpts, ListenArgs};
use crate::commands::util;
use crate::config;
use crate::error::CliError;

pub async fn handle(args: ListenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut dashboard_config = config::build_dashboard_config(global)?;
    if let Some(min_length) = args.min_length {
        dashboard_config.scanner.min_length = min_length;
    }
    if let Some(ms) = args.idle_ms {
        dashboard_config.scanner.idle_timeout = Duration::from_millis(ms);
    }
    let (ctx, _board) = util::connect_with(dashboard_config, global)?;

    if !global.quiet {
        eprintln!("Listening for scans on {}. Press Esc or Ctrl-C to stop.", ctx.config().url);
    }

    let mut outcomes = ctx.desk().subscribe_outcomes();
    let mut raw = RawMode::enable()?;
    let mut events = EventStream::new();

    loop {
        let deadline = ctx.scan_deadline();
        let mut needs_confirmation = false;
        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event else { break };
                let Event::Key(key) = event? else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if is_exit(&key) {
                    break;
                }
                let action = ctx.handle_key(&to_key(&key), Focus::Document, Instant::now());
                debug!(?action, "key handled");
            }
            () = wait_until(deadline) => {
                if ctx.expire_scan(Instant::now()) {
                    debug!("partial scan discarded");
                }
            }
            outcome = outcomes.recv() => match outcome {
                Ok(CheckinOutcome::NeedsConfirmation(_)) => needs_confirmation = true,
                Ok(outcome) => {
                    if let Some(lines) = detail_lines(&outcome) {
                        if !global.quiet {
                            eprint!("{lines}");
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed check-in outcomes"),
                Err(RecvError::Closed) => break,
            },
        }

        if needs_confirmation {
            // Prompts need cooked mode and sole ownership of stdin.
            drop(events);
            raw.suspend()?;
            let result = confirm_interactively(ctx.desk()).await;
            raw.resume()?;
            events = EventStream::new();
            if let Err(e) = result {
                warn!(error = %e, "confirmation abandoned");
                ctx.desk().cancel_modal();
            }
        }
    }

    drop(raw);
    ctx.settle().await;
    Ok(())
}

async fn confirm_interactively(desk: &CheckinDesk) -> Result<(), CliError> {
    util::prompt_modal(desk)?;
    match desk.confirm_modal().await {
        Ok(_) | Err(CoreError::NoPendingConfirmation) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Group members of a completed check-in, one indented line each.
/// Lines end in `\r\n` since raw mode is usually active.
fn detail_lines(outcome: &CheckinOutcome) -> Option<String> {
    match outcome {
        CheckinOutcome::Completed { details, .. } if !details.is_empty() => Some(
            details
                .iter()
                .map(|detail| format!("  {detail}\r\n"))
                .collect(),
        ),
        _ => None,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

fn is_exit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn to_key(event: &KeyEvent) -> Key {
    match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Modifier(
            ModifierKeyCode::LeftShift
            | ModifierKeyCode::RightShift
            | ModifierKeyCode::IsoLevel3Shift
            | ModifierKeyCode::IsoLevel5Shift,
        ) => Key::Shift,
        KeyCode::Modifier(ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl) => {
            Key::Control
        }
        KeyCode::Modifier(ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt) => Key::Alt,
        other => Key::Other(format!("{other:?}")),
    }
}

/// Raw terminal mode for the lifetime of the listener.
struct RawMode {
    active: bool,
}

impl RawMode {
    fn enable() -> Result<Self, CliError> {
        terminal::enable_raw_mode()?;
        Ok(Self { active: true })
    }

    fn suspend(&mut self) -> Result<(), CliError> {
        if self.active {
            terminal::disable_raw_mode()?;
            self.active = false;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CliError> {
        if !self.active {
            terminal::enable_raw_mode()?;
            self.active = true;
        }
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if self.active {
            let _ = terminal::disable_raw_mode();
        }
    }
}

//! Command dispatch: bridges CLI args to the app context and output.

pub mod analytics;
pub mod checkin;
pub mod config_cmd;
pub mod listen;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a dashboard-bound command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Analytics(args) => analytics::handle(args, global).await,
        Command::Checkin(args) => checkin::handle(args, global).await,
        Command::Listen(args) => listen::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;

            let mut cmd = crate::cli::Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "visitgate", &mut std::io::stdout());
            Ok(())
        }
    }
}

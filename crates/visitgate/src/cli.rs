//! Clap derive structures for the `visitgate` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.
//! Compiled standalone by build.rs for man pages, so it only depends on
//! clap and chrono.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// visitgate -- front desk for the visitor check-in dashboard
#[derive(Debug, Parser)]
#[command(
    name = "visitgate",
    version,
    about = "Visitor check-in and analytics from the command line",
    long_about = "Check visitors in by QR or unique code, listen for barcode scanner\n\
        input, and pull the dashboard's visitor analytics charts.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Dashboard profile to use
    #[arg(long, short = 'p', env = "VISITGATE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Dashboard URL (overrides profile)
    #[arg(long, short = 'u', env = "VISITGATE_URL", global = true)]
    pub url: Option<String>,

    /// CSRF token sent with check-in requests
    #[arg(long, env = "VISITGATE_CSRF_TOKEN", global = true, hide_env_values = true)]
    pub csrf_token: Option<String>,

    /// Login session cookie as name=value
    #[arg(long, env = "VISITGATE_SESSION_COOKIE", global = true, hide_env_values = true)]
    pub session_cookie: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VISITGATE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "VISITGATE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "VISITGATE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch visitor analytics charts for a date range
    #[command(alias = "a")]
    Analytics(AnalyticsArgs),

    /// Check a visitor in or out by QR or unique code
    #[command(alias = "in")]
    Checkin(CheckinArgs),

    /// Listen for barcode scanner input and check visitors in
    Listen(ListenArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Analytics ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartArg {
    /// Daily check-ins
    Trend,
    /// Most frequent visitors
    TopVisitors,
    /// Visit length histogram
    Durations,
    /// Visits by purpose
    Purpose,
    /// Visits by destination
    Destination,
    /// Approved vs. rejected requests
    Status,
}

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    /// Last N days including today (quick range)
    #[arg(long, short = 'd', conflicts_with_all = ["from", "to", "all"])]
    pub days: Option<u32>,

    /// Range start (YYYY-MM-DD)
    #[arg(long, requires = "to", conflicts_with = "all")]
    pub from: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD)
    #[arg(long, requires = "from", conflicts_with = "all")]
    pub to: Option<NaiveDate>,

    /// All recorded history
    #[arg(long)]
    pub all: bool,

    /// Only show these charts (repeatable)
    #[arg(long, short = 'c', value_enum)]
    pub chart: Vec<ChartArg>,

    /// Write each chart as JSON into this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,
}

// ── Check-in ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckinArgs {
    /// QR payload or unique code
    pub code: String,

    /// Purpose to use if the dashboard asks for confirmation
    #[arg(long)]
    pub purpose: Option<String>,

    /// Destination to use if the dashboard asks for confirmation
    #[arg(long)]
    pub destination: Option<String>,
}

// ── Listen ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Minimum scan length; bursts must be longer than this
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Idle gap in milliseconds that discards an unfinished burst
    #[arg(long)]
    pub idle_ms: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the resolved configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Store a CSRF token or session cookie in the system keyring
    SetToken {
        /// Which secret to store
        #[arg(long, value_enum, default_value = "csrf")]
        kind: TokenKind,

        /// Secret value (prompted for if omitted)
        #[arg(long)]
        value: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenKind {
    /// CSRF token header
    Csrf,
    /// Login session cookie (name=value)
    Cookie,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

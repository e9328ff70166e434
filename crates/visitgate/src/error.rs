//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use visitgate_config::ConfigError;
use visitgate_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to dashboard at {url}")]
    #[diagnostic(
        code(visitgate::connection_failed),
        help(
            "Check that the dashboard is running and reachable.\n\
             Self-signed gate server? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(visitgate::timeout),
        help("Increase the timeout with --timeout or check dashboard responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(visitgate::auth_failed),
        help(
            "Log in to the dashboard in a browser and copy the session cookie.\n\
             Run: visitgate config set-token --kind cookie"
        )
    )]
    AuthFailed { message: String },

    // ── Dashboard ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(visitgate::rejected))]
    Rejected {
        message: String,
        status: Option<u16>,
    },

    #[error("Check-in was not recorded")]
    #[diagnostic(code(visitgate::checkin_failed))]
    CheckinFailed { message: String },

    #[error("Check-in needs {missing}")]
    #[diagnostic(
        code(visitgate::confirmation_required),
        help("Pass --purpose and --destination, or run interactively to pick them.")
    )]
    ConfirmationRequired { missing: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(visitgate::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No dashboard URL configured")]
    #[diagnostic(
        code(visitgate::no_config),
        help(
            "Create a profile with: visitgate config init\n\
             Or pass --url / set VISITGATE_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(visitgate::config))]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    #[diagnostic(code(visitgate::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(visitgate::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Rejected {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ConfirmationRequired { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Rejected { message, status } => CliError::Rejected { message, status },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::NoPendingConfirmation => {
                CliError::Internal("no check-in awaiting confirmation".into())
            }
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Runtime(message) | CoreError::Internal(message) => {
                CliError::Internal(message)
            }
        }
    }
}

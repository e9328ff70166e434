// ── Core error types ──
//
// User-facing errors from visitgate-core. Consumers never see raw HTTP
// statuses or JSON parse failures; the `From<visitgate_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach dashboard at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Dashboard request timed out")]
    Timeout,

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Rejected by dashboard: {message}")]
    Rejected {
        message: String,
        status: Option<u16>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("No check-in is awaiting confirmation")]
    NoPendingConfirmation,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A component that spawns background work was built outside a runtime.
    #[error("No async runtime available: {0}")]
    Runtime(String),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<visitgate_api::Error> for CoreError {
    fn from(err: visitgate_api::Error) -> Self {
        match err {
            visitgate_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            visitgate_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            visitgate_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            visitgate_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            visitgate_api::Error::Rejected { status, message } => CoreError::Rejected {
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
                status: Some(status),
            },
            visitgate_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

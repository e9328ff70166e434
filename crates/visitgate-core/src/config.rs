// ── Runtime dashboard configuration ──
//
// These types describe how to reach the dashboard backend and how the
// scanner and check-in desk behave. They never touch disk; the CLI
// builds a `DashboardConfig` (usually via `visitgate-config`) and hands
// it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Purpose option that reveals the free-text field.
pub const OTHER_PURPOSE: &str = "Other";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed gate servers).
    DangerAcceptInvalid,
}

/// Scan disambiguation tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// A burst must be strictly longer than this to count as a scan.
    pub min_length: usize,
    /// Gap after which an unfinished burst is discarded.
    pub idle_timeout: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            idle_timeout: Duration::from_millis(100),
        }
    }
}

/// Check-in desk behaviour and the options offered by the confirmation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinConfig {
    /// Manual-entry cooldown after each attempt.
    pub cooldown: Duration,
    /// Purpose options, including the catch-all [`OTHER_PURPOSE`].
    pub purposes: Vec<String>,
    /// Destination options. Empty means any non-empty value is accepted.
    pub destinations: Vec<String>,
    /// Reject modal confirmation without a destination.
    pub destination_required: bool,
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(2),
            purposes: default_purposes(),
            destinations: Vec::new(),
            destination_required: true,
        }
    }
}

pub fn default_purposes() -> Vec<String> {
    [
        "Meeting",
        "Delivery",
        "Interview",
        "Official Business",
        "Maintenance",
        OTHER_PURPOSE,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Everything needed to stand up an [`AppContext`](crate::AppContext).
///
/// Built by the CLI, passed to core; core never reads config files.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Dashboard base URL (e.g. `https://gate.example.org`).
    pub url: Url,
    /// CSRF token sent with check-in POSTs.
    pub csrf_token: Option<SecretString>,
    /// Login session cookie (`name=value`).
    pub session_cookie: Option<SecretString>,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Quick range broadcast on start-up.
    pub default_range_days: u32,
    pub scanner: ScannerConfig,
    pub checkin: CheckinConfig,
}

impl DashboardConfig {
    /// Config with defaults for everything except the URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            csrf_token: None,
            session_cookie: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            default_range_days: 7,
            scanner: ScannerConfig::default(),
            checkin: CheckinConfig::default(),
        }
    }
}

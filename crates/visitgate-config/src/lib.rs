//! Configuration for the visitgate CLI.
//!
//! TOML profiles, session secret resolution (env + keyring + plaintext),
//! and translation to `visitgate_core::DashboardConfig`. The CLI layers
//! its `GlobalOpts` overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use visitgate_core::{
    CheckinConfig, DashboardConfig, ScannerConfig, TlsVerification, config::default_purposes,
};

/// Keyring service name for stored session secrets.
pub const KEYRING_SERVICE: &str = "visitgate";

/// Prefix for environment overrides of config keys.
pub const ENV_PREFIX: &str = "VISITGATE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in config")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named dashboard profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub checkin: CheckinSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
            scanner: ScannerSettings::default(),
            checkin: CheckinSettings::default(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the override, else the configured
    /// default, else `"default"`.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Quick range, in days, used when no range is given.
    #[serde(default = "default_range_days")]
    pub range_days: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            range_days: default_range_days(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_range_days() -> u32 {
    7
}

/// A named dashboard profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Dashboard base URL (e.g., "https://gate.example.org").
    pub url: String,

    /// CSRF token (plaintext; prefer keyring or env var).
    pub csrf_token: Option<String>,

    /// Environment variable name containing the CSRF token.
    pub csrf_token_env: Option<String>,

    /// Login session cookie as `name=value` (plaintext; prefer keyring).
    pub session_cookie: Option<String>,

    /// Environment variable name containing the session cookie.
    pub session_cookie_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Override timeout, in seconds.
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScannerSettings {
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

fn default_min_length() -> usize {
    3
}
fn default_idle_timeout_ms() -> u64 {
    100
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckinSettings {
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    #[serde(default = "default_purposes")]
    pub purposes: Vec<String>,

    #[serde(default)]
    pub destinations: Vec<String>,

    #[serde(default = "default_true")]
    pub destination_required: bool,
}

impl Default for CheckinSettings {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            purposes: default_purposes(),
            destinations: Vec::new(),
            destination_required: true,
        }
    }
}

fn default_cooldown_ms() -> u64 {
    2000
}
fn default_true() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "visitgate", "visitgate").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("visitgate");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file yields
/// defaults. Nested keys use a double underscore
/// (`VISITGATE_CHECKIN__COOLDOWN_MS`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Secret resolution ───────────────────────────────────────────────

/// The two pieces of session material a profile can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    CsrfToken,
    SessionCookie,
}

impl SecretKind {
    fn keyring_suffix(self) -> &'static str {
        match self {
            Self::CsrfToken => "csrf-token",
            Self::SessionCookie => "session-cookie",
        }
    }

    fn env_name(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::CsrfToken => profile.csrf_token_env.as_deref(),
            Self::SessionCookie => profile.session_cookie_env.as_deref(),
        }
    }

    fn plaintext(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::CsrfToken => profile.csrf_token.as_deref(),
            Self::SessionCookie => profile.session_cookie.as_deref(),
        }
    }
}

fn keyring_entry(profile_name: &str, kind: SecretKind) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{}", kind.keyring_suffix()),
    )?)
}

/// Resolve a session secret: profile's env var, then system keyring,
/// then plaintext in config. `None` when no source has it.
pub fn resolve_secret(
    profile: &Profile,
    profile_name: &str,
    kind: SecretKind,
) -> Option<SecretString> {
    resolve_secret_with(profile, profile_name, kind, |var| std::env::var(var).ok())
}

/// [`resolve_secret`] with a custom environment lookup.
pub fn resolve_secret_with(
    profile: &Profile,
    profile_name: &str,
    kind: SecretKind,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    // 1. Profile's *_env → env var lookup
    if let Some(value) = kind.env_name(profile).and_then(&env) {
        return Some(SecretString::from(value));
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name, kind) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    kind.plaintext(profile)
        .map(|value| SecretString::from(value.to_owned()))
}

/// Store a session secret in the system keyring.
pub fn store_secret(profile_name: &str, kind: SecretKind, value: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, kind)?.set_password(value)?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `DashboardConfig` from a profile with no CLI overrides.
pub fn profile_to_dashboard_config(
    config: &Config,
    profile: &Profile,
    profile_name: &str,
) -> Result<DashboardConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let checkin = checkin_config(&config.checkin)?;

    Ok(DashboardConfig {
        url,
        csrf_token: resolve_secret(profile, profile_name, SecretKind::CsrfToken),
        session_cookie: resolve_secret(profile, profile_name, SecretKind::SessionCookie),
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(config.defaults.timeout)),
        default_range_days: config.defaults.range_days,
        scanner: ScannerConfig {
            min_length: config.scanner.min_length,
            idle_timeout: Duration::from_millis(config.scanner.idle_timeout_ms),
        },
        checkin,
    })
}

fn checkin_config(settings: &CheckinSettings) -> Result<CheckinConfig, ConfigError> {
    if settings.purposes.is_empty() {
        return Err(ConfigError::Validation {
            field: "checkin.purposes".into(),
            reason: "at least one purpose is required".into(),
        });
    }
    Ok(CheckinConfig {
        cooldown: Duration::from_millis(settings.cooldown_ms),
        purposes: settings.purposes.clone(),
        destinations: settings.destinations.clone(),
        destination_required: settings.destination_required,
    })
}

//! CLI configuration: thin wrapper around `visitgate_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --csrf-token, --session-cookie, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use visitgate_core::{DashboardConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use visitgate_config::{
    Config, Profile, SecretKind, config_path, load_config_or_default, save_config, store_secret,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Build a `DashboardConfig` from the config file, profile, and CLI
/// overrides. Flags win over the profile; without a profile, `--url` is
/// enough.
pub fn build_dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut dashboard = if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut profile = profile.clone();
        if let Some(ref url) = global.url {
            profile.url.clone_from(url);
        }
        visitgate_config::profile_to_dashboard_config(&cfg, &profile, &profile_name)?
    } else {
        let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        let profile = Profile {
            url: url_str.to_owned(),
            ..Profile::default()
        };
        visitgate_config::profile_to_dashboard_config(&cfg, &profile, &profile_name)?
    };

    apply_overrides(&mut dashboard, global);
    Ok(dashboard)
}

fn apply_overrides(dashboard: &mut DashboardConfig, global: &GlobalOpts) {
    if let Some(ref token) = global.csrf_token {
        dashboard.csrf_token = Some(SecretString::from(token.clone()));
    }
    if let Some(ref cookie) = global.session_cookie {
        dashboard.session_cookie = Some(SecretString::from(cookie.clone()));
    }
    if global.insecure {
        dashboard.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        dashboard.timeout = Duration::from_secs(secs);
    }
}

//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Password, Select};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, TokenKind};
use crate::commands::util::{self, prompt_err};
use crate::config::{self, Config, Profile, SecretKind};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

impl From<TokenKind> for SecretKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Csrf => Self::CsrfToken,
            TokenKind::Cookie => Self::SessionCookie,
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Default")]
    default: bool,
}

// ── Helpers ─────────────────────────────────────────────────────────

fn profile_rows(cfg: &Config) -> Vec<ProfileRow> {
    let default = cfg.default_profile.as_deref().unwrap_or("default");
    let mut rows: Vec<ProfileRow> = cfg
        .profiles
        .iter()
        .map(|(name, profile)| ProfileRow {
            name: name.clone(),
            url: profile.url.clone(),
            default: name == default,
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.csrf_token.is_some() {
            profile.csrf_token = Some(MASK.into());
        }
        if profile.session_cookie.is_some() {
            profile.session_cookie = Some(MASK.into());
        }
    }
    cfg
}

/// TOML-style listing of a (redacted) config.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "range_days = {}", cfg.defaults.range_days);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        if let Some(ref token) = p.csrf_token {
            let _ = writeln!(out, "csrf_token = \"{token}\"");
        }
        if let Some(ref env) = p.csrf_token_env {
            let _ = writeln!(out, "csrf_token_env = \"{env}\"");
        }
        if let Some(ref cookie) = p.session_cookie {
            let _ = writeln!(out, "session_cookie = \"{cookie}\"");
        }
        if let Some(ref env) = p.session_cookie_env {
            let _ = writeln!(out, "session_cookie_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "[scanner]");
    let _ = writeln!(out, "min_length = {}", cfg.scanner.min_length);
    let _ = writeln!(out, "idle_timeout_ms = {}", cfg.scanner.idle_timeout_ms);

    let _ = writeln!(out);
    let _ = writeln!(out, "[checkin]");
    let _ = writeln!(out, "cooldown_ms = {}", cfg.checkin.cooldown_ms);
    let _ = writeln!(out, "purposes = {:?}", cfg.checkin.purposes);
    let _ = writeln!(out, "destinations = {:?}", cfg.checkin.destinations);
    let _ = writeln!(out, "destination_required = {}", cfg.checkin.destination_required);

    out
}

/// Ask where a secret should live. `Some` means plaintext in config.
fn prompt_secret(
    label: &str,
    profile_name: &str,
    kind: SecretKind,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Skip",
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("{label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    if selection == 0 {
        return Ok(None);
    }

    let secret = Password::new()
        .with_prompt(label)
        .interact()
        .map_err(prompt_err)?;
    if secret.is_empty() {
        return Ok(None);
    }

    if selection == 1 {
        config::store_secret(profile_name, kind, &secret)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let rendered =
                output::render_single(&global.output, &cfg, format_config, format_config)?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let rows = profile_rows(&cfg);
            if rows.is_empty() {
                eprintln!("No profiles configured. Run: visitgate config init");
                return Ok(());
            }
            let rendered = output::render_list(&global.output, &rows, ProfileRow::clone, |r| {
                let marker = if r.default { " *" } else { "" };
                format!("{}{marker}", r.name)
            })?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken { kind, value } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let secret = match value {
                Some(v) => v,
                None => Password::new()
                    .with_prompt("Secret")
                    .interact()
                    .map_err(prompt_err)?,
            };
            if secret.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "value".into(),
                    reason: "secret cannot be empty".into(),
                });
            }
            config::store_secret(&profile_name, kind.into(), secret.trim())?;
            if !global.quiet {
                eprintln!("✓ Stored in system keyring for profile '{profile_name}'");
            }
            Ok(())
        }
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    eprintln!("visitgate configuration wizard");
    eprintln!("   Config path: {}\n", config::config_path().display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    if cfg.profiles.contains_key(&profile_name)
        && !util::confirm(&format!("Overwrite profile '{profile_name}'?"), global.yes)?
    {
        eprintln!("Aborted.");
        return Ok(());
    }

    let url: String = Input::new()
        .with_prompt("Dashboard URL")
        .default("https://localhost:5000".into())
        .interact_text()
        .map_err(prompt_err)?;
    url::Url::parse(&url).map_err(|e| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {e}"),
    })?;

    let csrf_token = prompt_secret("CSRF token", &profile_name, SecretKind::CsrfToken)?;
    let session_cookie =
        prompt_secret("Session cookie (name=value)", &profile_name, SecretKind::SessionCookie)?;

    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            url,
            csrf_token,
            session_cookie,
            ..Profile::default()
        },
    );
    if cfg.profiles.len() == 1 || cfg.default_profile.is_none() {
        cfg.default_profile = Some(profile_name.clone());
    }

    let path = config::save_config(&cfg)?;
    eprintln!("\n✓ Profile '{profile_name}' saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lobby".into(),
            Profile {
                url: "https://gate.example.org".into(),
                csrf_token: Some("s3cret".into()),
                session_cookie: Some("session=abc".into()),
                ..Profile::default()
            },
        );

        let text = format_config(&redacted(&cfg));
        assert!(text.contains("[profiles.lobby]"));
        assert!(text.contains("csrf_token = \"****\""));
        assert!(!text.contains("s3cret"));
        assert!(!text.contains("session=abc"));
    }

    #[test]
    fn profile_rows_are_sorted_and_mark_the_default() {
        let mut cfg = Config::default();
        for (name, url) in [
            ("lobby", "https://lobby.example.org"),
            ("annex", "https://annex.example.org"),
        ] {
            cfg.profiles.insert(
                name.into(),
                Profile {
                    url: url.into(),
                    ..Profile::default()
                },
            );
        }
        cfg.default_profile = Some("lobby".into());

        let rows = profile_rows(&cfg);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["annex", "lobby"]);
        assert!(!rows[0].default);
        assert!(rows[1].default);
    }
}

//! Integration tests for the `visitgate` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a backend; check-in and analytics flows run against wiremock.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `visitgate` binary with env isolation.
///
/// Clears all `VISITGATE_*` env vars and points config directories at a
/// throwaway path so tests never touch the user's real configuration.
fn visitgate_cmd(home: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("visitgate");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("VISITGATE_PROFILE")
        .env_remove("VISITGATE_URL")
        .env_remove("VISITGATE_CSRF_TOKEN")
        .env_remove("VISITGATE_SESSION_COOKIE")
        .env_remove("VISITGATE_OUTPUT")
        .env_remove("VISITGATE_INSECURE")
        .env_remove("VISITGATE_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn home() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = home();
    let output = visitgate_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = home();
    visitgate_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("analytics")
            .and(predicate::str::contains("checkin"))
            .and(predicate::str::contains("listen"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    let home = home();
    visitgate_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("visitgate"));
}

#[test]
fn test_completions_bash() {
    let home = home();
    visitgate_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_config_path() {
    let home = home();
    visitgate_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_profiles_empty() {
    let home = home();
    visitgate_cmd(&home)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_analytics_without_url_fails() {
    let home = home();
    visitgate_cmd(&home)
        .arg("analytics")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No dashboard URL configured"));
}

#[test]
fn test_conflicting_range_flags() {
    let home = home();
    visitgate_cmd(&home)
        .args(["analytics", "--days", "7", "--all", "--url", "http://127.0.0.1:1"])
        .assert()
        .code(2);
}

// ── Against a mock dashboard ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_analytics_json_lists_requested_charts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/purpose_distribution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "purpose": "Meeting", "count": 3 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let home = home();
    let output = visitgate_cmd(&home)
        .args(["analytics", "--all", "-c", "purpose", "-o", "json", "--url"])
        .arg(server.uri())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let charts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let charts = charts.as_array().unwrap();
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0]["kind"], "purpose_distribution");
    assert_eq!(charts[0]["description"], "All Time");
    assert_eq!(charts[0]["view"]["labels"][0], "Meeting");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analytics_export_writes_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let home = home();
    let export = home.path().join("charts");
    visitgate_cmd(&home)
        .args(["analytics", "--days", "30", "-q", "--export"])
        .arg(&export)
        .arg("--url")
        .arg(server.uri())
        .assert()
        .success();

    let trend = std::fs::read_to_string(export.join("visitor_trend.json")).unwrap();
    assert!(trend.contains("Failed to load visitor trend."));
    assert!(export.join("request_status.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_checkin_success_prints_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .and(body_json(json!({ "qr_data": "ABC123" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Ana checked in." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let home = home();
    visitgate_cmd(&home)
        .args(["checkin", "ABC123", "-o", "plain", "--url"])
        .arg(server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana checked in."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_checkin_unknown_code_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "message": "QR code or unique code not recognized." })),
        )
        .mount(&server)
        .await;

    let home = home();
    visitgate_cmd(&home)
        .args(["checkin", "NOPE", "--url"])
        .arg(server.uri())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not recognized"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_checkin_confirmation_from_flags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .and(body_json(json!({
            "qr_data": "QR9",
            "purpose": "Campus tour",
            "destination": "Library"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Jane checked in." })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "show_modal",
            "name": "Jane",
            "purpose": null,
            "destination": null
        })))
        .mount(&server)
        .await;

    let home = home();
    visitgate_cmd(&home)
        .args([
            "checkin",
            "QR9",
            "--purpose",
            "Campus tour",
            "--destination",
            "Library",
            "--yes",
            "-o",
            "plain",
            "--url",
        ])
        .arg(server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane checked in."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_checkin_confirmation_without_flags_is_usage_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan-checkin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "show_modal",
            "name": "Jane"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = home();
    visitgate_cmd(&home)
        .args(["checkin", "QR9", "--yes", "--url"])
        .arg(server.uri())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("needs a purpose and a destination"));
}

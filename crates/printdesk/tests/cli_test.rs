//! Integration tests for the `printdesk` CLI binary.
//!
//! Each test points `--config-dir` at a fresh temp directory, and resource
//! commands talk to a wiremock backend.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `printdesk` binary with env isolation.
fn printdesk_cmd(config_dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("printdesk");
    cmd.env("HOME", config_dir)
        .env("XDG_CONFIG_HOME", config_dir)
        .env("XDG_DATA_HOME", config_dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("PRINTDESK_CONFIG_DIR")
        .env_remove("PRINTDESK_API_BASE")
        .env_remove("PRINTDESK_PRINT_API_BASE")
        .env_remove("PRINTDESK_TIMEOUT_SECS")
        .arg("--config-dir")
        .arg(config_dir);
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = printdesk_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    printdesk_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("url")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("service")),
    );
}

#[test]
fn test_completions_zsh() {
    let dir = TempDir::new().unwrap();
    printdesk_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── url ─────────────────────────────────────────────────────────────

#[test]
fn test_url_show_defaults_to_fallback() {
    let dir = TempDir::new().unwrap();
    printdesk_cmd(dir.path())
        .args(["url", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://localhost:4000 (fallback)")
                .and(predicate::str::contains("http://localhost:4001")),
        );
}

#[test]
fn test_url_set_then_clear() {
    let dir = TempDir::new().unwrap();

    printdesk_cmd(dir.path())
        .args(["url", "set", "http://192.168.1.20:4000"])
        .assert()
        .success();
    assert!(dir.path().join("api_url").exists());

    printdesk_cmd(dir.path())
        .args(["url", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://192.168.1.20:4000 (override)"));

    printdesk_cmd(dir.path())
        .args(["url", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:4000"));
    assert!(!dir.path().join("api_url").exists());
}

#[test]
fn test_url_set_rejects_bad_scheme() {
    let dir = TempDir::new().unwrap();
    printdesk_cmd(dir.path())
        .args(["url", "set", "ftp://printers"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected http or https"));
}

#[test]
fn test_url_discover_uses_server_table() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[server]\nhost = \"10.0.0.9\"\nport = 4000\n",
    )
    .unwrap();

    printdesk_cmd(dir.path())
        .args(["url", "discover"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://10.0.0.9:4000"));

    let stored = std::fs::read_to_string(dir.path().join("api_url")).unwrap();
    assert_eq!(stored, "http://10.0.0.9:4000");
}

#[test]
fn test_url_discover_without_server_fails() {
    let dir = TempDir::new().unwrap();
    printdesk_cmd(dir.path())
        .args(["url", "discover"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("discovery"));
}

// ── Resource commands ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_get_prints_items() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/printers"))
        .and(query_param("site", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Front desk" })))
        .mount(&server)
        .await;

    printdesk_cmd(dir.path())
        .args(["--api-base", &server.uri(), "-o", "json-compact"])
        .args(["get", "/api/printers", "-q", "site=main"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"[{"id":1,"name":"Front desk"}]"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_not_found_exit_code() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/printers"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "no such site" })))
        .mount(&server)
        .await;

    printdesk_cmd(dir.path())
        .args(["--api-base", &server.uri(), "get", "/api/printers"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("no such site"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_failure_is_notified() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/printers"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "message": "name taken" })))
        .mount(&server)
        .await;

    printdesk_cmd(dir.path())
        .args(["--api-base", &server.uri()])
        .args(["create", "/api/printers", "--data", r#"{"name":"Lobby"}"#])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("API error: name taken"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_success() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/printers"))
        .and(query_param("id", "3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    printdesk_cmd(dir.path())
        .args(["--api-base", &server.uri(), "delete", "/api/printers", "-q", "id=3"])
        .assert()
        .success();
}

#[test]
fn test_create_requires_body() {
    let dir = TempDir::new().unwrap();
    printdesk_cmd(dir.path())
        .args(["create", "/api/printers"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--data"));
}

// ── watch / service ─────────────────────────────────────────────────

#[test]
fn test_watch_unreachable_backend_reports_stopped() {
    let dir = TempDir::new().unwrap();
    printdesk_cmd(dir.path())
        .args(["--api-base", "http://127.0.0.1:1", "watch", "--for", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("status: Detenido"));
}

#[cfg(not(windows))]
#[test]
fn test_service_control_unavailable() {
    let dir = TempDir::new().unwrap();
    printdesk_cmd(dir.path())
        .args(["service", "PrintSpooler", "restart"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("not available"));
}

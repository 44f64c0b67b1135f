//! Integration tests for the `ubusly` CLI binary.
//!
//! Argument parsing, help output, completions and error mapping run without
//! any router; the round-trip tests point the binary at a wiremock rpcd.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, Respond, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ubusly` binary with env isolation.
///
/// Clears all `UBUSLY_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn ubusly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ubusly");
    cmd.env("HOME", "/tmp/ubusly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/ubusly-cli-test-nonexistent")
        .env(
            "UBUSLY_CONFIG",
            "/tmp/ubusly-cli-test-nonexistent/config.toml",
        )
        .env_remove("UBUSLY_PROFILE")
        .env_remove("UBUSLY_ENDPOINT")
        .env_remove("UBUSLY_USERNAME")
        .env_remove("UBUSLY_PASSWORD")
        .env_remove("UBUSLY_OUTPUT")
        .env_remove("UBUSLY_INSECURE")
        .env_remove("UBUSLY_TIMEOUT")
        .env_remove("UBUSLY_DEFAULT_PROFILE")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or_default()
}

/// Match requests invoking `object.ubus_method`.
fn ubus(object: &'static str, ubus_method: &'static str) -> impl Match + 'static {
    move |request: &Request| {
        let body = body(request);
        body["params"][1] == object && body["params"][2] == ubus_method
    }
}

/// Answer with `result`, echoing the request id.
fn reply(result: Value) -> impl Respond + 'static {
    move |request: &Request| {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": body(request)["id"],
            "result": result.clone(),
        }))
    }
}

/// Mount `session.login` and `session.destroy` so module commands can run.
async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(ubus("session", "login"))
        .respond_with(reply(json!([0, {
            "ubus_rpc_session": "0123456789abcdef0123456789abcdef",
            "timeout": 300,
            "expires": 300,
            "acls": {},
            "data": {"username": "root"}
        }])))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(ubus("session", "destroy"))
        .respond_with(reply(json!([0])))
        .expect(1)
        .mount(server)
        .await;
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = ubusly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    ubusly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("ubus")
            .and(predicate::str::contains("call"))
            .and(predicate::str::contains("uci"))
            .and(predicate::str::contains("wireless")),
    );
}

#[test]
fn test_version_flag() {
    ubusly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ubusly"));
}

#[test]
fn test_completions_bash() {
    ubusly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_subcommand() {
    let output = ubusly_cmd().arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_output_format() {
    let output = ubusly_cmd()
        .args(["--output", "xml", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_uci_set_requires_key_value() {
    let output = ubusly_cmd()
        .args(["uci", "set", "network", "lan", "novalue"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("key=value"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    ubusly_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_set_and_use_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    ubusly_cmd()
        .env("UBUSLY_CONFIG", &config)
        .args(["-p", "lab", "config", "set", "endpoint", "https://10.0.0.1/ubus"])
        .assert()
        .success();

    ubusly_cmd()
        .env("UBUSLY_CONFIG", &config)
        .args(["config", "use", "lab"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("default_profile = \"lab\""));
    assert!(written.contains("https://10.0.0.1/ubus"));
}

#[test]
fn test_config_set_refuses_malformed_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let original = r#"[defaults]
timeout = "oops"

[profiles.home]
endpoint = "https://192.168.1.1/ubus"
password = "hunter2"
"#;
    std::fs::write(&config, original).unwrap();

    let output = ubusly_cmd()
        .env("UBUSLY_CONFIG", &config)
        .args(["config", "set", "username", "admin"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(std::fs::read_to_string(&config).unwrap(), original);
}

#[test]
fn test_malformed_config_fails_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "default_profile = [").unwrap();

    let output = ubusly_cmd()
        .env("UBUSLY_CONFIG", &config)
        .args(["call", "system", "board"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("config"));
}

#[test]
fn test_config_use_unknown_profile() {
    let output = ubusly_cmd()
        .args(["config", "use", "ghost"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("not found"));
}

#[test]
fn test_unknown_profile_flag() {
    let output = ubusly_cmd()
        .args(["-p", "ghost", "call", "system", "board"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("ghost"));
}

// ── Error mapping without a router ──────────────────────────────────

#[test]
fn test_bad_endpoint_scheme_is_usage_error() {
    let output = ubusly_cmd()
        .args(["-e", "ftp://router/ubus", "call", "system", "board"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_socket_is_connection_error() {
    let output = ubusly_cmd()
        .args([
            "-e",
            "/tmp/ubusly-cli-test-nonexistent/ubus.sock",
            "call",
            "system",
            "board",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_session_without_password_needs_credentials() {
    let output = ubusly_cmd()
        .args([
            "-e",
            "/tmp/ubusly-cli-test-nonexistent/ubus.sock",
            "session",
            "show",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("'default'"));
}

#[test]
fn test_call_args_must_be_object() {
    let output = ubusly_cmd()
        .args([
            "-e",
            "/tmp/ubusly-cli-test-nonexistent/ubus.sock",
            "call",
            "system",
            "board",
            "[1, 2]",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Against a fake rpcd ─────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_anonymous_call_prints_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ubus"))
        .and(ubus("system", "board"))
        .respond_with(reply(json!([0, {"hostname": "OpenWrt", "model": "GL.iNet"}])))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = ubusly_cmd();
    cmd.args([
        "-e",
        &format!("{}/ubus", server.uri()),
        "-o",
        "json-compact",
        "call",
        "system",
        "board",
    ]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["hostname"], "OpenWrt");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_call_logout() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(ubus("uci", "configs"))
        .and(|request: &Request| body(request)["params"][0] == "0123456789abcdef0123456789abcdef")
        .respond_with(reply(json!([0, {"configs": ["dhcp", "network"]}])))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = ubusly_cmd();
    cmd.env("UBUSLY_PASSWORD", "secret").args([
        "-e",
        &format!("{}/ubus", server.uri()),
        "-o",
        "plain",
        "uci",
        "configs",
    ]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "dhcp\nnetwork\n");
}

#[test]
fn test_module_command_without_password_needs_credentials() {
    let output = ubusly_cmd()
        .args([
            "-e",
            "/tmp/ubusly-cli-test-nonexistent/ubus.sock",
            "uci",
            "configs",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(ubus("session", "login"))
        .respond_with(reply(json!([6])))
        .mount(&server)
        .await;

    let mut cmd = ubusly_cmd();
    cmd.args([
        "-e",
        &format!("{}/ubus", server.uri()),
        "--password",
        "wrong",
        "call",
        "system",
        "board",
    ]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Login failed for user 'root'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_denied_call_exits_with_permission_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply(json!([6])))
        .mount(&server)
        .await;

    let mut cmd = ubusly_cmd();
    cmd.args([
        "-e",
        &format!("{}/ubus", server.uri()),
        "call",
        "file",
        "read",
        r#"{"path": "/etc/shadow"}"#,
    ]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(5));
    assert!(combined_output(&output).contains("file.read"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_iwinfo_suggests_package() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(ubus("iwinfo", "devices"))
        .respond_with(reply(json!([4])))
        .mount(&server)
        .await;

    let mut cmd = ubusly_cmd();
    cmd.env("UBUSLY_PASSWORD", "secret").args([
        "-e",
        &format!("{}/ubus", server.uri()),
        "wireless",
        "devices",
    ]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("rpcd-mod-iwinfo"));
}

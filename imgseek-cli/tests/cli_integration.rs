//! CLI integration tests for imgseek-cli.
//!
//! These tests run the actual binary against a throwaway session store and
//! check outputs and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the imgseek binary with a clean environment.
fn imgseek(store: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("imgseek").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("IMGSEEK_API_URL")
        .env_remove("IMGSEEK_APP_URL")
        .env_remove("IMGSEEK_SESSION_COOKIE")
        .env_remove("RUST_LOG")
        .arg("--store")
        .arg(store.path().join("session.json"));
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search images from the terminal"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("guest"))
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn test_version_displays_version() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("imgseek"));
}

#[test]
fn test_help_shows_exit_codes() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("69"))
        .stdout(predicate::str::contains("77"));
}

#[test]
fn test_search_help_shows_options() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--pages"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("TERM"));
}

// ============================================================================
// Session Errors
// ============================================================================

#[test]
fn test_search_without_session_exits_77() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .args(["--mock", "search", "cats"])
        .assert()
        .code(77)
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_whoami_without_session_exits_77() {
    let store = TempDir::new().unwrap();
    imgseek(&store).arg("whoami").assert().code(77);
}

#[test]
fn test_unreadable_store_record_means_no_session() {
    let store = TempDir::new().unwrap();
    std::fs::write(
        store.path().join("session.json"),
        r#"{"user": "not json at all", "isLoggedIn": "true"}"#,
    )
    .unwrap();

    imgseek(&store).arg("whoami").assert().code(77);
}

#[test]
fn test_callback_without_handoff_exits_64() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .args(["callback", "http://localhost:5173/?name=Ada"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("No identity handoff"));

    // Nothing was stored.
    imgseek(&store).arg("whoami").assert().code(77);
}

#[test]
fn test_callback_rejects_non_http_address() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .args(["callback", "file:///tmp/?email=a%40b.c&name=A"])
        .assert()
        .code(64);
}

#[test]
fn test_bad_api_url_exits_64() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .args(["--api-url", "ftp://images.example.com", "whoami"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_blank_search_term_exits_64() {
    let store = TempDir::new().unwrap();
    imgseek(&store).args(["guest"]).assert().success();
    imgseek(&store)
        .args(["--mock", "search", "   "])
        .assert()
        .code(64);
}

#[test]
fn test_guest_with_wrong_signal_exits_64() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .args(["guest", "--signal", "hello"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Guest gate not passed"));

    imgseek(&store).arg("whoami").assert().code(77);
}

// ============================================================================
// Login
// ============================================================================

#[test]
fn test_login_prints_provider_address() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .args([
            "--api-url",
            "https://api.example.com",
            "login",
            "--provider",
            "github",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://api.example.com/api/auth/github",
        ))
        .stdout(predicate::str::contains("imgseek callback"));
}

#[test]
fn test_login_rejects_unknown_provider() {
    let store = TempDir::new().unwrap();
    imgseek(&store)
        .args(["login", "--provider", "myspace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown auth provider"));
}

// ============================================================================
// Network Failures
// ============================================================================

#[test]
fn test_search_against_unreachable_server_exits_69() {
    let store = TempDir::new().unwrap();
    imgseek(&store).arg("guest").assert().success();

    imgseek(&store)
        .env("IMGSEEK_TIMEOUT_SECS", "2")
        .args(["--api-url", "http://127.0.0.1:9", "search", "cats"])
        .assert()
        .code(69)
        .stderr(predicate::str::contains("Failed to load initial images."))
        .stderr(predicate::str::contains("Search failed"));
}

mod support;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use support::{MockBackend, spawn_backend};
use tempfile::{TempDir, tempdir};

struct Cli {
    tmp: TempDir,
    backend: MockBackend,
}

impl Cli {
    fn new() -> Self {
        let backend = spawn_backend();
        backend.add_user("alice", "secret123");
        Self { tmp: tempdir().expect("temp dir"), backend }
    }

    fn root(&self) -> &str {
        self.tmp.path().to_str().expect("utf8 temp path")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("linguaflow").expect("binary exists");
        cmd.args(["--root", self.root(), "--api-url", self.backend.url.as_str()]);
        cmd.args(args);
        // Force English output for consistent test assertions
        cmd.env("LINGUAFLOW_LANG", "en");
        cmd.env_remove("LINGUAFLOW_API_URL");
        cmd.env_remove("LINGUAFLOW_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command(args).assert()
    }

    fn login(&self) {
        self.run(&["login", "alice", "--password", "secret123"])
            .success()
            .stdout(predicate::str::contains("Logged in as alice."));
    }
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8")
}

#[test]
fn translate_then_list_history() {
    let cli = Cli::new();
    cli.login();

    cli.run(&["translate", "good", "morning"])
        .success()
        .stdout(predicate::str::contains("[vi] good morning"));

    let listed = cli.run(&["history", "list"]).success();
    let stdout = stdout_of(&listed);
    assert!(stdout.contains("#1  en -> vi  2024-05-01 10:20:30"), "unexpected listing: {stdout}");
    assert!(stdout.contains("  good morning\n"));
    assert!(stdout.contains("  [vi] good morning\n"));
}

#[test]
fn status_reflects_persisted_translate_box() {
    let cli = Cli::new();
    cli.login();
    cli.run(&["translate", "--from", "vi", "xin chào"]).success();
    cli.run(&["like"]).success().stdout(predicate::str::contains("Rating received"));

    let status = cli.run(&["status"]).success();
    let stdout = stdout_of(&status);
    assert!(stdout.contains("xin chào"), "unexpected status: {stdout}");
    assert!(stdout.contains("[en] xin chào"), "unexpected status: {stdout}");
}

#[test]
fn history_without_login_shows_prompt() {
    let cli = Cli::new();
    cli.run(&["history", "list"])
        .success()
        .stdout(predicate::str::contains("Please login to view and save your translation history."));
    assert!(cli.backend.requests().is_empty());
}

#[test]
fn save_without_login_fails() {
    let cli = Cli::new();
    cli.run(&["guest"]).success().stdout(predicate::str::contains("Continuing as guest."));
    cli.run(&["translate", "hello"]).success();
    cli.run(&["save"]).failure().code(1).stderr(predicate::str::contains("Error: Please login to save."));
}

#[test]
fn login_failure_prints_backend_detail() {
    let cli = Cli::new();
    cli.run(&["login", "alice", "--password", "nope"])
        .failure()
        .stderr(predicate::str::contains("Incorrect username or password"));
}

#[test]
fn declined_clear_sends_no_delete() {
    let cli = Cli::new();
    cli.login();
    cli.run(&["translate", "hello"]).success();

    cli.command(&["history", "clear"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Are you sure you want to delete ALL history?"))
        .stdout(predicate::str::contains("Cancelled."));

    assert_eq!(cli.backend.count("DELETE", "/history"), 0);
    assert_eq!(cli.backend.state().history.len(), 1);
}

#[test]
fn confirmed_clear_removes_history() {
    let cli = Cli::new();
    cli.login();
    cli.run(&["translate", "hello"]).success();

    cli.run(&["history", "clear", "--yes"])
        .success()
        .stdout(predicate::str::contains("All history and saved translations cleared"));
    assert!(cli.backend.state().history.is_empty());
}

#[test]
fn html_export_escapes_backend_text() {
    let cli = Cli::new();
    cli.login();
    cli.run(&["translate", "<script>alert(1)</script>"]).success();

    let exported = cli.run(&["history", "list", "--format", "html"]).success();
    let stdout = stdout_of(&exported);
    assert!(!stdout.contains("<script>"), "raw markup leaked: {stdout}");
    assert!(stdout.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(stdout.contains(r#"data-theme="dark""#));
    assert!(stdout.contains("deleteHistoryItem(1)"));
}

#[test]
fn theme_toggle_is_persisted() {
    let cli = Cli::new();
    cli.run(&["theme"]).success().stdout(predicate::str::contains("Theme: dark"));
    cli.run(&["theme", "toggle"]).success().stdout(predicate::str::contains("Theme set to light."));

    let config = fs::read_to_string(cli.tmp.path().join("config.toml")).expect("config written");
    assert!(config.contains(r#"theme = "light""#), "unexpected config: {config}");

    cli.run(&["theme", "show"]).success().stdout(predicate::str::contains("Theme: light"));
}

#[test]
fn non_http_api_url_is_rejected() {
    let cli = Cli::new();
    cli.run(&["config", "set-api-url", "ftp://example.com"])
        .failure()
        .stderr(predicate::str::contains("must use http or https"));
    assert!(!cli.tmp.path().join("config.toml").exists());
}

#[test]
fn translation_failure_is_printed_inline() {
    let cli = Cli::new();
    cli.backend.state().fail_translate = true;
    cli.run(&["translate", "hello"])
        .success()
        .stdout(predicate::str::contains("Error: Model not loaded"));
}

#[test]
fn expired_session_logs_out() {
    let cli = Cli::new();
    cli.login();
    cli.backend.state().expire_tokens = true;

    cli.run(&["history", "list"])
        .failure()
        .stderr(predicate::str::contains("Your session has expired. Please login again."));
    cli.run(&["status"])
        .success()
        .stdout(predicate::str::contains("Session: guest\nView: entry"));
}

#[test]
fn piped_password_logs_in() {
    let cli = Cli::new();
    cli.command(&["login", "alice"])
        .write_stdin("secret123\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as alice."));
    assert!(cli.tmp.path().join("state/session.toml").exists());
}

#[test]
fn config_repairs_invalid_stored_api_url() {
    let cli = Cli::new();
    let config_path = cli.tmp.path().join("config.toml");
    fs::write(&config_path, "[client]\napi_url = \"ftp://old.example.test\"\n").expect("write config");

    cli.run(&["theme"]).failure().stderr(predicate::str::contains("must use http or https"));

    cli.run(&["config", "set-api-url", "http://127.0.0.1:9000"])
        .success()
        .stdout(predicate::str::contains("Backend URL set to http://127.0.0.1:9000/."));
    let config = fs::read_to_string(&config_path).expect("config written");
    assert!(config.contains(r#"api_url = "http://127.0.0.1:9000""#), "unexpected config: {config}");

    cli.run(&["theme"]).success().stdout(predicate::str::contains("Theme: dark"));
}

#[test]
fn logout_clears_translate_box() {
    let cli = Cli::new();
    cli.login();
    cli.run(&["translate", "hello"]).success();
    cli.run(&["save"]).success();
    cli.run(&["logout"]).success().stdout(predicate::str::contains("Logged out."));

    let status = cli.run(&["status"]).success();
    let stdout = stdout_of(&status);
    assert!(!stdout.contains("hello"), "translate box survived logout: {stdout}");
}

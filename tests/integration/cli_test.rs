#![allow(clippy::expect_used)]

use std::path::Path;
use std::process::{Command, Output};

/// Run the binary with an isolated config home so no user config leaks in.
fn watchpost(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_watchpost"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("RUST_LOG")
        .output()
        .expect("run watchpost")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn delta_exit_codes_follow_severity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let counter = dir.path().join("counter");
    let state = dir.path().join("state");
    let counter_arg = counter.to_string_lossy().into_owned();
    let state_arg = state.to_string_lossy().into_owned();
    let args: &[&str] = &[
        "delta",
        "--key",
        "bytes",
        "--counter-file",
        &counter_arg,
        "-w",
        "10",
        "-c",
        "100",
        "--state-dir",
        &state_arg,
    ];

    std::fs::write(&counter, "1000\n").expect("write");
    let first = watchpost(dir.path(), args);
    assert_eq!(first.status.code(), Some(0));
    assert!(stdout(&first).starts_with("OK - bytes: no baseline yet"));

    std::fs::write(&counter, "1050\n").expect("write");
    let second = watchpost(dir.path(), args);
    assert_eq!(second.status.code(), Some(1));
    assert_eq!(
        stdout(&second).trim_end(),
        "WARNING - bytes: 50 since last check (above warning threshold 10) | bytes=50c;10;100;0;"
    );

    std::fs::write(&counter, "2050\n").expect("write");
    let third = watchpost(dir.path(), args);
    assert_eq!(third.status.code(), Some(2));
    assert!(stdout(&third).starts_with("CRITICAL - "));
}

#[test]
fn missing_source_exits_unknown() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = dir.path().join("state").to_string_lossy().into_owned();
    let output = watchpost(
        dir.path(),
        &[
            "delta",
            "--key",
            "swap",
            "--keyed-file",
            "/nonexistent/vmstat",
            "--field",
            "pswpout",
            "--state-dir",
            &state,
        ],
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).starts_with("UNKNOWN - swap: SourceUnavailable"));
    assert_eq!(stdout(&output).lines().count(), 1);
}

#[test]
fn age_with_marker_exits_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lastupdate = dir.path().join("lastupdate");
    std::fs::write(&lastupdate, "0\n").expect("write");
    let marker = dir.path().join(".nopuppetd");

    let lastupdate_arg = lastupdate.to_string_lossy().into_owned();
    let marker_arg = marker.to_string_lossy().into_owned();
    let args: &[&str] = &[
        "age",
        "--epoch-file",
        &lastupdate_arg,
        "-w",
        "8000",
        "--disable-marker",
        &marker_arg,
    ];

    let stale = watchpost(dir.path(), args);
    assert_eq!(stale.status.code(), Some(1));

    std::fs::write(&marker, "").expect("write");
    let skipped = watchpost(dir.path(), args);
    assert_eq!(skipped.status.code(), Some(0));
    assert!(stdout(&skipped).contains("check skipped"));
}

#[test]
fn bad_arguments_exit_unknown_not_critical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = watchpost(dir.path(), &["delta", "--key", "swap"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).starts_with("UNKNOWN"));
}

#[test]
fn run_without_checks_is_unknown() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = watchpost(dir.path(), &["run"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout(&output).trim_end(), "UNKNOWN - no checks configured");
}

#[test]
fn json_output_keeps_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lastupdate = dir.path().join("lastupdate");
    std::fs::write(&lastupdate, "0\n").expect("write");
    let lastupdate_arg = lastupdate.to_string_lossy().into_owned();

    let output = watchpost(
        dir.path(),
        &["age", "--epoch-file", &lastupdate_arg, "-c", "60", "--json"],
    );
    assert_eq!(output.status.code(), Some(2));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["severity"], "critical");
}

#[test]
fn config_init_then_show() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    let path_arg = path.to_string_lossy().into_owned();

    let init = watchpost(dir.path(), &["config", "--init", "--config", &path_arg]);
    assert_eq!(init.status.code(), Some(0));
    assert!(path.exists());

    let show = watchpost(dir.path(), &["config", "--config", &path_arg]);
    assert_eq!(show.status.code(), Some(0));
    assert!(stdout(&show).contains("[state]"));
}

#[test]
fn unusable_state_dir_is_a_write_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let counter = dir.path().join("counter");
    std::fs::write(&counter, "10\n").expect("write");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").expect("write");

    let counter_arg = counter.to_string_lossy().into_owned();
    let state_arg = blocker.join("state").to_string_lossy().into_owned();
    let output = watchpost(
        dir.path(),
        &[
            "delta",
            "--key",
            "k",
            "--counter-file",
            &counter_arg,
            "--state-dir",
            &state_arg,
        ],
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).starts_with("UNKNOWN - k: StateWriteFailed"));
}

#[test]
fn broken_database_still_runs_age_checks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").expect("write");
    let lastupdate = dir.path().join("lastupdate");
    std::fs::write(&lastupdate, format!("{}\n", chrono::Utc::now().timestamp() - 10))
        .expect("write");
    let config = dir.path().join("watchpost.toml");
    std::fs::write(
        &config,
        format!(
            r#"
[state]
backend = "sqlite"
database = "{}"

[[checks]]
name = "puppet"
kind = "age"
warning = 8000
source = {{ type = "epoch-file", path = "{}" }}
"#,
            blocker.join("state.db").display(),
            lastupdate.display()
        ),
    )
    .expect("write config");

    let config_arg = config.to_string_lossy().into_owned();
    let output = watchpost(dir.path(), &["run", "--config", &config_arg]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with("OK - puppet: last update"));
}

#[test]
fn unnamed_age_check_is_named_after_its_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lastupdate = dir.path().join("lastupdate");
    std::fs::write(&lastupdate, "0\n").expect("write");
    let lastupdate_arg = lastupdate.to_string_lossy().into_owned();

    let output = watchpost(dir.path(), &["age", "--epoch-file", &lastupdate_arg]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with(&format!("OK - {lastupdate_arg}: last update")));
}

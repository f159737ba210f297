// tests/cli_exit_codes.rs

use std::process::Command;

fn as_soon() -> Command {
    Command::new(env!("CARGO_BIN_EXE_as-soon"))
}

#[test]
fn no_command_exits_with_usage() {
    let out = as_soon().output().unwrap();
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("please specify a command"), "stderr: {stderr}");
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
}

#[test]
fn unwatchable_target_exits_before_running_anything() {
    let dir = tempfile::tempdir().unwrap();
    let out = as_soon()
        .current_dir(dir.path())
        .args(["-w", "missing/deeper", "echo", "should-not-run"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(!stdout.contains("should-not-run"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("does not exist"), "stderr: {stderr}");
}

#[test]
fn bad_config_file_exits_with_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.toml"), "[watch]\nnope = 1\n").unwrap();

    let out = as_soon()
        .current_dir(dir.path())
        .args(["--config", "bad.toml", "echo", "should-not-run"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&out.stdout).contains("should-not-run"));
}

#[test]
fn usage_errors_exit_with_one_and_run_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cases: [&[&str]; 3] = [
        &["-w"],
        &["--debounce-ms", "abc", "echo", "should-not-run"],
        &["--bogus", "x", "echo", "should-not-run"],
    ];

    for args in cases {
        let out = as_soon()
            .current_dir(dir.path())
            .args(args)
            .output()
            .unwrap();

        assert_eq!(out.status.code(), Some(1), "args: {args:?}");
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(!stdout.contains("should-not-run"), "args: {args:?}, stdout: {stdout}");
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(!stderr.contains("---- run #"), "args: {args:?}, stderr: {stderr}");
    }
}

#[test]
fn help_exits_successfully() {
    let out = as_soon().arg("--help").output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Usage"));
}

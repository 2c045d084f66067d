#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::process::Command;

fn cmdwrap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cmdwrap"))
}

// --- success path ---

#[test]
fn run_echo_hello() {
    let output = cmdwrap().args(["run", "echo", "hello"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn run_relays_stderr_on_success() {
    let output = cmdwrap()
        .args(["run", "sh", "-c", "echo warn >&2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(String::from_utf8_lossy(&output.stderr), "warn\n");
}

#[test]
fn run_silent_suppresses_both_streams() {
    let output = cmdwrap()
        .args(["run", "--silent", "sh", "-c", "echo out; echo err >&2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}

#[test]
fn run_no_stdout_still_relays_stderr() {
    let output = cmdwrap()
        .args(["run", "--no-stdout", "sh", "-c", "echo out; echo err >&2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(String::from_utf8_lossy(&output.stderr), "err\n");
}

#[test]
fn run_flag_parsing_stops_at_command() {
    // "--msg hi" sits after the command token, so it belongs to echo.
    let output = cmdwrap()
        .args(["run", "echo", "--msg", "hi"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "--msg hi\n");
}

// --- failure path ---

#[test]
fn run_failure_exits_one_with_report() {
    let output = cmdwrap()
        .env("NO_COLOR", "1")
        .args([
            "run",
            "--msg",
            "build failed",
            "sh",
            "-c",
            "echo boom >&2; exit 1",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Command failed: build failed"),
        "stderr: {stderr}"
    );
    assert!(stderr.contains("Command line: sh -c"));
    assert!(stderr.contains("stdout: <EMPTY>"));
    assert!(stderr.contains("boom"));
}

#[test]
fn run_failure_keeps_stdout_clean() {
    let output = cmdwrap()
        .args(["run", "sh", "-c", "echo partial; exit 3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    // The captured stdout shows up framed in the report instead.
    assert!(String::from_utf8_lossy(&output.stderr).contains("partial"));
}

#[test]
fn run_failure_names_target_binary() {
    let output = cmdwrap()
        .env("CMDWRAP_TARGET", "solc")
        .args(["run", "false"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Target binary: solc"));
}

#[test]
fn color_escapes_present_by_default() {
    let output = cmdwrap()
        .env_remove("NO_COLOR")
        .args(["run", "false"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr.contains(&0x1b));
}

#[test]
fn no_color_strips_ansi_escapes() {
    let output = cmdwrap()
        .env("NO_COLOR", "1")
        .args(["run", "false"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.contains(&0x1b));
}

// --- usage errors ---

#[test]
fn unknown_flag_exits_two() {
    let output = cmdwrap()
        .args(["run", "--bogus", "echo", "hi"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Assertion failed"), "stderr: {stderr}");
    assert!(stderr.contains("--bogus"));
}

#[test]
fn msg_without_value_exits_two() {
    let output = cmdwrap().args(["run", "--msg"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn flags_without_command_exit_two() {
    let output = cmdwrap().args(["run", "--silent"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// --- capture file lifecycle ---

#[test]
fn capture_files_removed_on_success_and_failure() {
    let tmp = tempfile::TempDir::new().unwrap();

    let ok = cmdwrap()
        .env("TMPDIR", tmp.path())
        .args(["run", "echo", "hi"])
        .output()
        .unwrap();
    assert!(ok.status.success());

    let failed = cmdwrap()
        .env("TMPDIR", tmp.path())
        .args(["run", "false"])
        .output()
        .unwrap();
    assert_eq!(failed.status.code(), Some(1));

    let leftover: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert!(leftover.is_empty(), "leftover capture files: {leftover:?}");
}

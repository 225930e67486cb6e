
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use test_utils::fixture_path;

fn line_status() -> Command {
    let mut cmd = Command::cargo_bin("line-status").unwrap();
    cmd.env_remove("LINE_STATUS_INCREMENTAL")
        .env("LINE_STATUS_DEBUG", "0");
    cmd
}

#[test]
fn test_ranges_prints_hunks() {
    line_status()
        .arg("ranges")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("working.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("@@ -2,1 +2,1 @@ modified"))
        .stdout(predicate::str::contains("-    let name = \"world\";"))
        .stdout(predicate::str::contains("+    let name = \"rust\";"))
        .stdout(predicate::str::contains("@@ -3,0 +4,1 @@ inserted"))
        .stdout(predicate::str::contains(
            "2 range(s): 1 modified, 1 inserted, 0 deleted (+2 -1)",
        ));
}

#[test]
fn test_ranges_json() {
    let output = line_status()
        .arg("ranges")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("working.txt"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ranges = json["ranges"].as_array().unwrap();
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[0]["kind"], "modified");
    assert_eq!(ranges[0]["line1"], 1);
    assert_eq!(ranges[0]["vcs_line2"], 2);
    assert_eq!(ranges[0]["inner_ranges"][0]["kind"], "changed");
    assert_eq!(ranges[1]["kind"], "inserted");
    assert_eq!(json["summary"]["added_lines"], 2);
}

#[test]
fn test_identical_files_have_no_changes() {
    line_status()
        .arg("ranges")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("base.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No changes"));
}

#[test]
fn test_rollback_prints_result() {
    let base = fs::read_to_string(fixture_path("base.txt")).unwrap();
    line_status()
        .arg("rollback")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("working.txt"))
        .args(["--lines", "1-10"])
        .assert()
        .success()
        .stdout(base)
        .stderr(predicate::str::contains("Rolled back 2 range(s), 0 remaining"));
}

#[test]
fn test_rollback_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let working = dir.path().join("working.txt");
    fs::copy(fixture_path("working.txt"), &working).unwrap();

    line_status()
        .arg("rollback")
        .arg(fixture_path("base.txt"))
        .arg(&working)
        .args(["--lines", "4", "--in-place"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Rolled back 1 range(s), 1 remaining"));

    let contents = fs::read_to_string(&working).unwrap();
    assert!(!contents.contains("Goodbye"));
    assert!(contents.contains("\"rust\""));
}

#[test]
fn test_rollback_rejects_bad_selection() {
    line_status()
        .arg("rollback")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("working.txt"))
        .args(["--lines", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid line selection"));

    line_status()
        .arg("rollback")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("working.txt"))
        .args(["--lines", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Line 98 is outside the buffer"));
}

#[test]
fn test_missing_file_fails() {
    line_status()
        .arg("ranges")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("does-not-exist.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_config_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{ "inner_ranges": false }"#).unwrap();

    let output = line_status()
        .arg("ranges")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("working.txt"))
        .arg("--json")
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["ranges"][0].get("inner_ranges").is_none());
}

#[test]
fn test_help_and_unknown_command() {
    line_status()
        .arg("help")
        .assert()
        .success()
        .stderr(predicate::str::contains("Usage: line-status <command>"));

    line_status()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown line-status command: frobnicate"));
}

#[test]
fn test_version() {
    line_status()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_incremental_policy_fails() {
    line_status()
        .arg("ranges")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("working.txt"))
        .args(["--incremental", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown incremental policy: sometimes"));
}

#[test]
fn test_rollback_with_incremental_off() {
    line_status()
        .arg("rollback")
        .arg(fixture_path("base.txt"))
        .arg(fixture_path("working.txt"))
        .args(["--lines", "1-4", "--incremental", "off"])
        .assert()
        .success()
        .stdout(predicate::str::contains("let name = \"world\";"))
        .stderr(predicate::str::contains("Rolled back 2 range(s), 0 remaining"));
}

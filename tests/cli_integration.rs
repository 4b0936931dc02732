//! Binary-level tests: drive the daybook executable against journals in
//! temp directories.

use assert_cmd::Command;
use predicates::prelude::*;

fn daybook(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("daybook").unwrap();
    cmd.arg("--file")
        .arg(dir.join("daybook.md"))
        .arg("--config-dir")
        .arg(dir.join("config"))
        .arg("--no-color");
    cmd
}

#[test]
fn now_then_show() {
    let dir = tempfile::tempdir().unwrap();

    daybook(dir.path())
        .args(["now", "-s", "Work", "write", "the", "cli", "tests"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added \"write the cli tests\" to Work"));

    daybook(dir.path())
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("write the cli tests"))
        .stdout(predicate::str::contains("Work"));

    let written = std::fs::read_to_string(dir.path().join("daybook.md")).unwrap();
    assert!(written.starts_with("Work:\n- "));
    assert!(written.contains("| write the cli tests\n"));
}

#[test]
fn done_records_a_done_tag() {
    let dir = tempfile::tempdir().unwrap();

    daybook(dir.path())
        .args(["done", "-s", "Work", "shipped", "it"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("daybook.md")).unwrap();
    assert!(written.contains("shipped it @done("));
}

#[test]
fn tag_and_untag_latest_entry() {
    let dir = tempfile::tempdir().unwrap();

    daybook(dir.path())
        .args(["now", "needs", "triage"])
        .assert()
        .success();
    daybook(dir.path())
        .args(["tag", "urgent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tagged 1 of 1"));

    let written = std::fs::read_to_string(dir.path().join("daybook.md")).unwrap();
    assert!(written.contains("needs triage @urgent"));

    daybook(dir.path())
        .args(["tag", "--remove", "urgent"])
        .assert()
        .success();
    let written = std::fs::read_to_string(dir.path().join("daybook.md")).unwrap();
    assert!(written.contains("| needs triage\n"));
}

#[test]
fn grep_filters_entries() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("daybook.md"),
        "Work:\n- 2024-01-09 09:00 | fix the parser\n- 2024-01-09 10:00 | water the plants\n",
    )
    .unwrap();

    daybook(dir.path())
        .args(["grep", "parser"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fix the parser"))
        .stdout(predicate::str::contains("water the plants").not());
}

#[test]
fn archive_moves_entries() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("daybook.md"),
        "Work:\n- 2024-01-08 09:00 | old task\n- 2024-01-09 09:00 | newer task\n",
    )
    .unwrap();

    daybook(dir.path())
        .args(["archive", "Work", "--keep", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived 1 items"));

    let written = std::fs::read_to_string(dir.path().join("daybook.md")).unwrap();
    assert!(written.contains("Archive:\n- 2024-01-08 09:00 | old task @from(Work)"));
}

#[test]
fn sections_lists_names() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("daybook.md"),
        "Currently:\n- 2024-01-09 09:00 | a\nLater:\n- 2024-01-09 10:00 | b\n",
    )
    .unwrap();

    daybook(dir.path())
        .args(["sections"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Currently\nLater\n"));
}

#[test]
fn export_json_is_parseable() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("daybook.md"),
        "Work:\n- 2024-01-09 09:00 | task @x\n",
    )
    .unwrap();

    let output = daybook(dir.path())
        .args(["export", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["items"][0]["title"], "task @x");
    assert_eq!(parsed["items"][0]["tags"][0], "x");
}

#[test]
fn invalid_time_expression_is_a_user_error() {
    let dir = tempfile::tempdir().unwrap();

    daybook(dir.path())
        .args(["now", "--back", "whenever", "task"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time expression"));
}

#[test]
fn unknown_view_is_a_user_error() {
    let dir = tempfile::tempdir().unwrap();

    daybook(dir.path())
        .args(["view", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No view named"));
}

#[test]
fn backup_file_written_on_second_save() {
    let dir = tempfile::tempdir().unwrap();

    daybook(dir.path()).args(["now", "first"]).assert().success();
    daybook(dir.path()).args(["now", "second"]).assert().success();

    let backup = std::fs::read_to_string(dir.path().join("daybook.md~")).unwrap();
    assert!(backup.contains("first"));
    assert!(!backup.contains("second"));
}

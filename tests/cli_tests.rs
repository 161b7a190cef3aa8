use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn trimx(storage: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("trimx-batch").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--storage-root")
        .arg(storage.path())
        .arg("--log-level")
        .arg("error");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("trimx-batch")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("trim"))
        .stdout(predicate::str::contains("archive"))
        .stdout(predicate::str::contains("cleanup"));
}

#[test]
fn test_trim_rejects_non_video_upload() {
    let storage = TempDir::new().unwrap();
    let notes = storage.path().join("notes.txt");
    std::fs::write(&notes, b"hello").unwrap();

    trimx(&storage)
        .arg("trim")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid file type"));

    assert!(!storage.path().join("outputs").exists());
}

#[test]
fn test_cleanup_is_idempotent() {
    let storage = TempDir::new().unwrap();
    let session = "6f1c2d4e-8a9b-4c3d-9e8f-0a1b2c3d4e5f";

    for _ in 0..2 {
        trimx(&storage)
            .args(["cleanup", "--session", session])
            .assert()
            .success()
            .stdout(predicate::str::contains(session));
    }
}

#[test]
fn test_cleanup_malformed_session_is_noop() {
    let storage = TempDir::new().unwrap();

    for _ in 0..2 {
        trimx(&storage)
            .args(["cleanup", "--session", "not-a-uuid"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"removed\": false"));
    }
}

#[test]
fn test_archive_unknown_session_fails() {
    let storage = TempDir::new().unwrap();

    trimx(&storage)
        .args(["archive", "--session", "not-a-session"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session not found"));
}

#[test]
fn test_invalid_policy_is_rejected() {
    let storage = TempDir::new().unwrap();

    trimx(&storage)
        .args(["--policy", "hybrid", "cleanup", "--session", "x"])
        .assert()
        .failure();
}

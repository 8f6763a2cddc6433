//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

const KEY: &str = "correct horse battery staple";

fn waypoint() -> Command {
    let mut cmd = Command::cargo_bin("waypoint").unwrap();
    // run where no .env can be picked up
    cmd.current_dir(std::env::temp_dir());
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    waypoint()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("bootstrap"))
        .stdout(predicate::str::contains("seal"));
}

#[test]
fn test_serve_help() {
    waypoint()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keep data in memory"));
}

#[test]
fn test_seal_then_unseal() {
    let sealed = waypoint()
        .env("ENCRYPTION_MASTER_KEY", KEY)
        .args(["seal", "--aad", "applications.phone"])
        .write_stdin("+61 400 123 456")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"n\"").and(predicate::str::contains("\"ct\"")));
    let envelope = String::from_utf8(sealed.get_output().stdout.clone()).unwrap();

    waypoint()
        .env("ENCRYPTION_MASTER_KEY", KEY)
        .args(["unseal", "--aad", "applications.phone"])
        .write_stdin(envelope.clone())
        .assert()
        .success()
        .stdout("+61 400 123 456");

    // wrong associated data
    waypoint()
        .env("ENCRYPTION_MASTER_KEY", KEY)
        .args(["unseal", "--aad", "applications.email"])
        .write_stdin(envelope)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn test_seal_requires_master_key() {
    waypoint()
        .env_remove("ENCRYPTION_MASTER_KEY")
        .args(["seal", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ENCRYPTION_MASTER_KEY"));
}

#[test]
fn test_unseal_rejects_garbage() {
    waypoint()
        .env("ENCRYPTION_MASTER_KEY", KEY)
        .args(["unseal", "not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an envelope"));
}

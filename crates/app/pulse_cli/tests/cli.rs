use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn pulse() -> Command {
    Command::cargo_bin("pulse").unwrap()
}

fn seed_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn version_prints_package_version() {
    pulse()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn hash_password_prints_bcrypt_hash() {
    pulse()
        .args(["hash-password", "--cost", "4", "correct-horse"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$2"));
}

#[test]
fn hash_password_reads_stdin() {
    pulse()
        .args(["hash-password", "--cost", "4"])
        .write_stdin("correct-horse\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$2"));
}

#[test]
fn hash_password_enforces_policy() {
    pulse()
        .args(["hash-password", "--cost", "4", "short"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn hash_password_rejects_low_cost() {
    pulse()
        .args(["hash-password", "--cost", "2", "correct-horse"])
        .assert()
        .failure();
}

#[test]
fn check_seed_accepts_valid_file() {
    let file = seed_file(
        r#"
- email: admin@bdo.co.zw
  passwordHash: "$2b$04$abcdefghijklmnopqrstuu5rY1Ywx4hZ1Gd8R7F2pGJbWcU1yRbC2"
  department: IT
  isAdmin: true
- email: user@bdo.co.zw
  passwordHash: "$2b$04$abcdefghijklmnopqrstuu5rY1Ywx4hZ1Gd8R7F2pGJbWcU1yRbC2"
  department: Tax
"#,
    );

    pulse()
        .arg("check-seed")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 credentials (1 admin)"));
}

#[test]
fn check_seed_rejects_plaintext_password() {
    let file = seed_file(
        r#"
- email: user@bdo.co.zw
  passwordHash: hunter22
  department: Tax
"#,
    );

    pulse()
        .arg("check-seed")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("bcrypt"));
}

#[test]
fn check_seed_reports_missing_file() {
    pulse()
        .args(["check-seed", "/nonexistent/pulse-seed.yaml"])
        .assert()
        .failure();
}

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

fn requests() -> tempfile::NamedTempFile {
    let mut jsonl = tempfile::NamedTempFile::new().unwrap();
    writeln!(jsonl, r#"{{"operation": "get_all_bookings", "payload": {{}}}}"#).unwrap();
    jsonl
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let jsonl = requests();

    let mut cmd = Command::new(cargo_bin!("booking-workflow"));
    cmd.arg(jsonl.path()).arg("--db-path").arg("some_db");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""total_count":0"#))
        .stderr(predicate::str::contains("Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let jsonl = requests();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("booking-workflow"));
    cmd.arg(jsonl.path()).arg("--db-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}

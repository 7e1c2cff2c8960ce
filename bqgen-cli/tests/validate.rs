// bqgen-cli/tests/validate.rs
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(json: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(json.as_bytes())
        .expect("Failed to write to temp file");
    temp_file
}

const SCHEMA: &str = r#"[
    {"name": "id", "type": "INTEGER", "mode": "REQUIRED"},
    {"name": "born", "type": "DATE"},
    {"name": "tags", "type": "STRING", "mode": "REPEATED"}
]"#;

#[test]
fn test_conforming_input_exits_zero() {
    let schema = write_temp(SCHEMA);

    let mut cmd = Command::cargo_bin("bqgen").unwrap();
    cmd.args(["--validate", schema.path().to_str().unwrap()])
        .write_stdin(r#"{"id": 1, "born": "2024-02-29", "tags": ["x"]}"#);
    cmd.assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Processed 1 sample(s)"));
}

#[test]
fn test_mismatches_are_listed_and_exit_one() {
    let schema = write_temp(SCHEMA);

    let mut cmd = Command::cargo_bin("bqgen").unwrap();
    cmd.args(["--validate", schema.path().to_str().unwrap()])
        .write_stdin(r#"{"born": "2023-02-29", "tags": "x", "extra": 1}"#);
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("$.id: required field is missing or null"))
        .stdout(predicate::str::contains("$.born: `2023-02-29` is not a calendar date"))
        .stdout(predicate::str::contains(
            "$.tags: expected an array for a REPEATED field, found string",
        ))
        .stdout(predicate::str::contains("$.extra: field is not declared in the schema"));
}

#[test]
fn test_validate_ndjson() {
    let schema = write_temp(SCHEMA);

    let mut cmd = Command::cargo_bin("bqgen").unwrap();
    cmd.args(["--ndjson", "--validate", schema.path().to_str().unwrap()])
        .write_stdin("{\"id\": 1}\n{\"id\": 1.5}\n");
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("$.id: expected INTEGER, found number"))
        .stderr(predicate::str::contains("Processed 2 sample(s)"));
}

#[test]
fn test_invalid_schema_file() {
    let schema = write_temp(r#"[{"name": "r", "type": "RECORD"}]"#);

    let mut cmd = Command::cargo_bin("bqgen").unwrap();
    cmd.args(["--validate", schema.path().to_str().unwrap()])
        .write_stdin("{}");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("$.r"));
}

#[test]
fn test_inference_flags_conflict_with_validate() {
    let schema = write_temp(SCHEMA);

    let mut cmd = Command::cargo_bin("bqgen").unwrap();
    cmd.args([
        "--validate",
        schema.path().to_str().unwrap(),
        "--required",
        "id",
    ])
    .write_stdin("{}");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

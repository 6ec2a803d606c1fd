//! End-to-end CLI tests exercising the built binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn chunklens() -> Command {
    Command::cargo_bin("chunklens").expect("binary builds")
}

#[test]
fn stats_reports_fixture_counts() {
    chunklens()
        .arg("stats")
        .arg(fixture_path("simple.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Record Log Statistics"))
        .stdout(predicate::str::contains("Messages:"));
}

#[test]
fn stats_json_output_is_machine_readable() {
    let output = chunklens()
        .arg("--output")
        .arg("json")
        .arg("stats")
        .arg(fixture_path("simple.jsonl"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["records"], 5);
    assert_eq!(value["messages"], 3);
}

#[test]
fn stats_missing_file_exits_with_not_found() {
    chunklens()
        .arg("stats")
        .arg("/nonexistent/record.jsonl")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn stats_malformed_log_exits_with_parse_code() {
    chunklens()
        .arg("stats")
        .arg(fixture_path("malformed.jsonl"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn graph_requires_exactly_one_file() {
    chunklens().arg("graph").assert().failure();

    chunklens()
        .arg("graph")
        .arg("a.jsonl")
        .arg("b.jsonl")
        .assert()
        .failure();
}

#[test]
fn graph_emits_digraph() {
    chunklens()
        .arg("graph")
        .arg(fixture_path("simple.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph records {"))
        .stdout(predicate::str::ends_with("}\n"));
}

#[test]
fn index_then_stats_over_index() {
    let dir = tempfile::tempdir().unwrap();
    let idx = dir.path().join("record.idx.json");

    chunklens()
        .arg("index")
        .arg(fixture_path("simple.jsonl"))
        .arg("--out")
        .arg(&idx)
        .assert()
        .success();

    chunklens()
        .arg("stats")
        .arg(&idx)
        .arg("--index")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offset Index Statistics"))
        .stdout(predicate::str::contains("Keys:"));
}

#[test]
fn index_prints_json_to_stdout_by_default() {
    let output = chunklens()
        .arg("index")
        .arg(fixture_path("simple.jsonl"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value.get("C1").is_some());
    assert!(value.get("tC1:1.0").is_some());
}

#[test]
fn rewrite_dry_run_leaves_documents_alone() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("1.json");
    std::fs::write(
        &doc,
        r#"{"name": "pic.png", "url_private": "https://example.com/pic.png"}"#,
    )
    .unwrap();
    let before = std::fs::read_to_string(&doc).unwrap();

    chunklens()
        .arg("rewrite")
        .arg(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(std::fs::read_to_string(&doc).unwrap(), before);
}

//! End-to-end tests for the `rlm-reader` binary.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DOC: &str = "# Overview\n\nThe system reads documents.\n\n\
## Details\n\nLarge inputs are split into chunks before analysis begins.\n\n\
```\nprint(len(context))\n```\n";

fn rlm() -> Command {
    let mut cmd = Command::cargo_bin("rlm-reader").unwrap_or_else(|e| panic!("binary: {e}"));
    // Keep user configuration out of the tests.
    cmd.env_remove("RLM_CHUNK_SIZE")
        .env_remove("RLM_OVERLAP")
        .env_remove("RLM_PROMPT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn fixture(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap_or_else(|e| panic!("write fixture: {e}"));
    path
}

#[test]
fn test_analyze_text_report() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let path = fixture(&dir, "guide.md", DOC);

    rlm()
        .arg("analyze")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Document Structure Analysis"))
        .stdout(predicate::str::contains("## Document: guide"))
        .stdout(predicate::str::contains("- Sections detected: 2"))
        .stdout(predicate::str::contains("- Code blocks detected: 1"))
        .stdout(predicate::str::contains("- Recommended chunking method: size"));
}

#[test]
fn test_analyze_json_report() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let path = fixture(&dir, "guide.md", DOC);

    let output = rlm()
        .args(["--format", "json", "analyze"])
        .arg(&path)
        .output()
        .unwrap_or_else(|e| panic!("run: {e}"));
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("invalid json: {e}"));
    assert_eq!(value["title"], "guide");
    assert_eq!(value["backend"], "plain");
    assert_eq!(value["structure"]["page_count"], 1);
    assert_eq!(value["structure"]["recommended_method"], "size");
}

#[test]
fn test_analyze_missing_file_fails() {
    rlm()
        .args(["analyze", "/no/such/document.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("document not found"));
}

#[test]
fn test_chunks_listing() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let body = "word ".repeat(400);
    let path = fixture(&dir, "plain.txt", &body);

    rlm()
        .arg("chunks")
        .arg(&path)
        .args(["--chunk-size", "500", "--overlap", "50", "--preview", "10"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Chunks for: plain ("))
        .stdout(predicate::str::contains("size"))
        .stdout(predicate::str::contains("word word..."));
}

#[test]
fn test_chunks_rejects_stalling_overlap() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let path = fixture(&dir, "plain.txt", "text");

    rlm()
        .arg("chunks")
        .arg(&path)
        .args(["--chunk-size", "100", "--overlap", "200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlap (200) must be smaller than chunk_size (100)"));
}

#[test]
fn test_init_prompts_writes_templates() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let target = dir.path().join("prompts");

    rlm()
        .arg("init-prompts")
        .arg("--dir")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 prompt template(s)"));

    assert!(target.join("root.md").is_file());
    assert!(target.join("subcall.md").is_file());

    rlm()
        .args(["--format", "json", "init-prompts", "--dir"])
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 0"));
}

#[test]
fn test_query_without_api_key_fails() {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let path = fixture(&dir, "guide.md", DOC);

    rlm()
        .env_remove("OPENAI_API_KEY")
        .env_remove("RLM_API_KEY")
        .env_remove("RLM_PROVIDER")
        .arg("query")
        .arg(&path)
        .arg("What does the system do?")
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not configured"));
}

//! CLI integration tests driving the built `prr` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn prr_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("prr");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let repo_dir = root.join("repo");
    fs::create_dir_all(&repo_dir).unwrap();
    fs::write(repo_dir.join("a.py"), "def add(a,b): return a+b").unwrap();
    fs::write(repo_dir.join("b.md"), "# Notes\n\nUnrelated notes.").unwrap();
    fs::write(repo_dir.join("c.txt"), "plain text file").unwrap();
    fs::write(repo_dir.join("skip.bin"), "not indexable").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/prr.sqlite"
"#,
        root.display()
    );
    let config_path = root.join("prr.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_prr(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = prr_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run prr binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_prr(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("prr.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_prr(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_prr(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_index_dry_run_counts_supported_files() {
    let (tmp, config_path) = setup_test_env();

    run_prr(&config_path, &["init"]);
    let repo = tmp.path().join("repo");
    let (stdout, _, success) = run_prr(
        &config_path,
        &["index", repo.to_str().unwrap(), "--dry-run"],
    );
    assert!(success);
    assert!(stdout.contains("dry-run"));
    // a.py, b.md, c.txt are supported; skip.bin is not
    assert!(stdout.contains("supported files: 3"), "got: {}", stdout);
}

#[test]
fn test_index_with_disabled_provider_degrades() {
    let (tmp, config_path) = setup_test_env();

    run_prr(&config_path, &["init"]);
    let repo = tmp.path().join("repo");
    let (stdout, stderr, success) = run_prr(&config_path, &["index", repo.to_str().unwrap()]);

    // Every embedding call fails, but the run completes
    assert!(success, "index should complete: stderr={}", stderr);
    assert!(stdout.contains("scanned: 3"), "got: {}", stdout);
    assert!(stdout.contains("indexed: 0"), "got: {}", stdout);
    assert!(stdout.contains("failed: 3"), "got: {}", stdout);
    assert!(stderr.contains("Warning"), "expected warnings, got: {}", stderr);
}

#[test]
fn test_index_nonexistent_root_fails() {
    let (_tmp, config_path) = setup_test_env();

    run_prr(&config_path, &["init"]);
    let (_, stderr, success) = run_prr(&config_path, &["index", "/nonexistent/path"]);
    assert!(!success);
    assert!(stderr.contains("does not exist"), "got: {}", stderr);
}

#[test]
fn test_list_empty_store() {
    let (_tmp, config_path) = setup_test_env();

    run_prr(&config_path, &["init"]);
    let (stdout, _, success) = run_prr(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("No documents indexed"));
}

#[test]
fn test_context_degrades_without_provider() {
    let (tmp, config_path) = setup_test_env();

    run_prr(&config_path, &["init"]);

    let diff_path = tmp.path().join("change.diff");
    fs::write(&diff_path, "diff --git a/a.py b/a.py\n+def sub(a,b): return a-b").unwrap();

    let (stdout, _, success) = run_prr(&config_path, &["context", diff_path.to_str().unwrap()]);
    assert!(success, "context should degrade gracefully, not fail");
    assert!(stdout.contains("no context retrieved"), "got: {}", stdout);
}

#[test]
fn test_unknown_embedding_provider_is_startup_error() {
    let (tmp, config_path) = setup_test_env();

    let config_content = format!(
        r#"[db]
path = "{}/data/prr.sqlite"

[embedding]
provider = "quantum"
"#,
        tmp.path().display()
    );
    fs::write(&config_path, config_content).unwrap();

    let (_, stderr, success) = run_prr(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("Unknown embedding provider"), "got: {}", stderr);
}

#[test]
fn test_enabled_provider_requires_model_and_dims() {
    let (tmp, config_path) = setup_test_env();

    let config_content = format!(
        r#"[db]
path = "{}/data/prr.sqlite"

[embedding]
provider = "openai"
"#,
        tmp.path().display()
    );
    fs::write(&config_path, config_content).unwrap();

    let (_, stderr, success) = run_prr(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("embedding.dims"), "got: {}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let (_tmp, config_path) = setup_test_env();
    fs::remove_file(&config_path).unwrap();

    let (_, stderr, success) = run_prr(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"), "got: {}", stderr);
}

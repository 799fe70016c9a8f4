//! CLI integration tests for the `pfab` binary.
//!
//! Each test builds a throwaway project with `pfab init`, drops prefab files
//! under `Assets/`, and drives the registry through populate, lookup and
//! editing commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Get the path to the pfab binary.
fn pfab_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pfab"))
}

/// Run pfab in `dir` and return (stdout, stderr, exit code).
fn run(dir: &Path, args: &[&str]) -> (String, String, i32) {
    run_in(dir, dir, args)
}

/// Run pfab from `cwd` against the project in `dir`.
fn run_in(cwd: &Path, dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(pfab_binary())
        .current_dir(cwd)
        .arg("--config")
        .arg(dir.join("prefabs.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute pfab");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

/// Create an initialized project containing the given prefab files.
fn project(prefabs: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let output = Command::new(pfab_binary())
        .arg("init")
        .arg(temp.path())
        .args(["--name", "test"])
        .output()
        .expect("Failed to execute pfab init");
    assert!(output.status.success(), "init failed: {}", String::from_utf8_lossy(&output.stderr));

    for (path, contents) in prefabs {
        write_asset(temp.path(), path, contents);
    }
    temp
}

fn write_asset(root: &Path, relative: &str, contents: &str) {
    let path = root.join("Assets").join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn list_json(dir: &Path) -> Vec<serde_json::Value> {
    let (stdout, stderr, code) = run(dir, &["list", "--json"]);
    assert_eq!(code, 0, "list failed: {}", stderr);
    serde_json::from_str::<serde_json::Value>(&stdout).unwrap().as_array().unwrap().clone()
}

// ============================================================================
// init
// ============================================================================

#[test]
fn test_init_creates_project() {
    let temp = project(&[]);
    assert!(temp.path().join("prefabs.toml").exists());
    assert!(temp.path().join("prefabs.json").exists());
    assert!(temp.path().join("Assets").is_dir());

    let (stdout, _, code) = run(temp.path(), &["list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Registry is empty"));
}

#[test]
fn test_init_refuses_overwrite() {
    let temp = project(&[]);
    let output = Command::new(pfab_binary()).arg("init").arg(temp.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
}

// ============================================================================
// populate
// ============================================================================

#[test]
fn test_populate_assigns_ids_in_path_order() {
    let temp = project(&[("props/Tree.prefab", "tree"), ("Rock.prefab", "rock")]);
    write_asset(temp.path(), "notes.txt", "ignored");

    let (stdout, stderr, code) = run(temp.path(), &["populate"]);
    assert_eq!(code, 0, "populate failed: {}", stderr);
    assert!(stdout.contains("Added 2 prefab(s)"));

    let entries = list_json(temp.path());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["tag"], "Rock");
    assert_eq!(entries[0]["id"], 0);
    assert_eq!(entries[1]["tag"], "Tree");
    assert_eq!(entries[1]["id"], 1);
    assert_eq!(entries[1]["reference"]["path"], "props/Tree.prefab");
}

#[test]
fn test_populate_twice_is_noop() {
    let temp = project(&[("Tree.prefab", "tree")]);
    run(temp.path(), &["populate"]);
    let before = fs::read_to_string(temp.path().join("prefabs.json")).unwrap();

    let (stdout, _, code) = run(temp.path(), &["populate", "--json"]);
    assert_eq!(code, 0);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["added"].as_array().unwrap().len(), 0);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["saved"], false);

    let after = fs::read_to_string(temp.path().join("prefabs.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_populate_appends_only_new_prefabs() {
    let temp = project(&[("Tree.prefab", "tree")]);
    run(temp.path(), &["populate"]);
    run(temp.path(), &["rename", "0", "Oak"]);

    write_asset(temp.path(), "Bush.prefab", "bush");
    let (_, _, code) = run(temp.path(), &["populate"]);
    assert_eq!(code, 0);

    let entries = list_json(temp.path());
    assert_eq!(entries.len(), 2);
    // Renamed entry is still recognised by path
    assert_eq!(entries[0]["tag"], "Oak");
    assert_eq!(entries[1]["tag"], "Bush");
    assert_eq!(entries[1]["id"], 1);
}

#[test]
fn test_populate_dry_run_does_not_save() {
    let temp = project(&[("Tree.prefab", "tree")]);
    let (stdout, _, code) = run(temp.path(), &["populate", "--dry-run"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("+ [0] Tree (Tree.prefab)"));
    assert!(stdout.contains("Dry run"));
    assert!(list_json(temp.path()).is_empty());
}

#[test]
fn test_populate_content_dedup_ignores_moved_file() {
    let temp = project(&[("old/Tree.prefab", "tree")]);
    run(temp.path(), &["populate"]);
    fs::remove_file(temp.path().join("Assets/old/Tree.prefab")).unwrap();
    write_asset(temp.path(), "new/Tree.prefab", "tree");

    let (stdout, _, _) = run(temp.path(), &["populate", "--dedup", "content", "--dry-run"]);
    assert!(stdout.contains("Added 0 prefab(s)"));

    let (stdout, _, _) = run(temp.path(), &["populate", "--dedup", "path", "--dry-run"]);
    assert!(stdout.contains("Added 1 prefab(s)"));
}

#[test]
fn test_populate_invalid_dedup() {
    let temp = project(&[]);
    let (_, stderr, code) = run(temp.path(), &["populate", "--dedup", "guid"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("--dedup"));
}

#[test]
fn test_populate_missing_assets_dir() {
    let temp = project(&[]);
    let (_, stderr, code) = run(temp.path(), &["populate", "--assets", "nowhere"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("does not exist"));
}

// ============================================================================
// get
// ============================================================================

#[test]
fn test_get_by_tag_and_id() {
    let temp = project(&[("Rock.prefab", "rock"), ("Tree.prefab", "tree")]);
    run(temp.path(), &["populate"]);

    let (stdout, _, code) = run(temp.path(), &["get", "--tag", "Tree"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Tree.prefab");

    let (stdout, _, code) = run(temp.path(), &["get", "--id", "0", "--json"]);
    assert_eq!(code, 0);
    let entry: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(entry["tag"], "Rock");
}

#[test]
fn test_get_missing() {
    let temp = project(&[("Rock.prefab", "rock")]);
    run(temp.path(), &["populate"]);

    let (_, stderr, code) = run(temp.path(), &["get", "--tag", "Missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Tag 'Missing' not found"));

    let (_, stderr, code) = run(temp.path(), &["get", "--id", "-1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Id -1 not found"));
}

// ============================================================================
// editing
// ============================================================================

#[test]
fn test_add_remove_set_id() {
    let temp = project(&[("Rock.prefab", "rock")]);

    let (_, _, code) = run(temp.path(), &["add", "Boulder", "Rock.prefab"]);
    assert_eq!(code, 0);
    let (_, _, code) = run(temp.path(), &["add", "Ghost", "Ghost.prefab", "--id", "9"]);
    assert_eq!(code, 0);

    let entries = list_json(temp.path());
    assert_eq!(entries.len(), 2);
    assert!(entries[0]["reference"]["content_hash"].as_str().unwrap().len() == 64);
    assert!(entries[1]["reference"].get("content_hash").is_none());
    assert_eq!(entries[1]["id"], 9);

    let (stdout, _, code) = run(temp.path(), &["remove", "0"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Removed [0] Boulder"));

    let (_, _, code) = run(temp.path(), &["set-id", "0", "3"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run(temp.path(), &["get", "--id", "3"]);
    assert_eq!(stdout.trim(), "Ghost.prefab");
}

#[test]
fn test_add_then_populate_registers_once() {
    let temp = project(&[("Tree.prefab", "tree"), ("rocks/Rock.prefab", "rock")]);
    let absolute = temp.path().join("Assets/rocks/Rock.prefab");

    let (_, stderr, code) = run(temp.path(), &["add", "Tree", "./Tree.prefab"]);
    assert_eq!(code, 0, "add failed: {}", stderr);
    let (_, stderr, code) = run(temp.path(), &["add", "Rock", absolute.to_str().unwrap()]);
    assert_eq!(code, 0, "add failed: {}", stderr);

    let (stdout, _, code) = run(temp.path(), &["populate"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Added 0"), "unexpected output: {}", stdout);

    let entries = list_json(temp.path());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["reference"]["path"], "Tree.prefab");
    assert_eq!(entries[1]["reference"]["path"], "rocks/Rock.prefab");

    let (_, _, code) = run(temp.path(), &["check"]);
    assert_eq!(code, 0);
}

#[test]
fn test_add_rejects_path_outside_assets() {
    let temp = project(&[]);
    fs::write(temp.path().join("Loose.prefab"), "loose").unwrap();

    let (_, stderr, code) = run(temp.path(), &["add", "Loose", "../Loose.prefab"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("outside the asset directory"));

    let outside = temp.path().join("Loose.prefab");
    let (_, _, code) = run(temp.path(), &["add", "Loose", outside.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(list_json(temp.path()).is_empty());
}

#[test]
fn test_remove_out_of_range() {
    let temp = project(&[]);
    let (_, stderr, code) = run(temp.path(), &["remove", "4"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("out of range"));
}

#[test]
fn test_add_strict_and_check() {
    let temp = project(&[]);
    run(temp.path(), &["add", "Tree", "Tree.prefab"]);

    let (_, stderr, code) = run(temp.path(), &["add", "Tree", "Other.prefab", "--strict"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Tag 'Tree' is already registered"));

    let (_, _, code) = run(temp.path(), &["check"]);
    assert_eq!(code, 0);

    run(temp.path(), &["add", "Tree", "Other.prefab"]);
    let (stdout, _, code) = run(temp.path(), &["check"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Tag 'Tree' is used by entries 0, 1"));
}

#[test]
fn test_list_detail_reports_missing_and_modified() {
    let temp = project(&[("Tree.prefab", "tree"), ("Rock.prefab", "rock")]);
    run(temp.path(), &["populate"]);
    fs::remove_file(temp.path().join("Assets/Rock.prefab")).unwrap();
    write_asset(temp.path(), "Tree.prefab", "taller tree");

    let (stdout, _, code) = run(temp.path(), &["list", "--json", "--detail"]);
    assert_eq!(code, 0);
    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rows[0]["tag"], "Rock");
    assert_eq!(rows[0]["status"], "missing");
    assert_eq!(rows[1]["status"], "modified");
}

#[test]
fn test_missing_registry_file() {
    let temp = project(&[]);
    fs::remove_file(temp.path().join("prefabs.json")).unwrap();
    let (_, stderr, code) = run(temp.path(), &["list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_error_collection() {
    let temp = project(&[]);
    let config = fs::read_to_string(temp.path().join("prefabs.toml")).unwrap();
    fs::write(
        temp.path().join("prefabs.toml"),
        config.replace("collect_errors = false", "collect_errors = true"),
    )
    .unwrap();

    run(temp.path(), &["remove", "0"]);

    let log = fs::read_to_string(temp.path().join(".prefab-errors.jsonl")).unwrap();
    let entry: serde_json::Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(entry["command"], "remove");
    assert_eq!(entry["error_type"], "registry_error");
}

#[test]
fn test_collect_errors_flag_records_suggestion() {
    let temp = project(&[]);
    fs::remove_file(temp.path().join("prefabs.json")).unwrap();

    let (_, stderr, code) = run(temp.path(), &["list", "--collect-errors"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("pfab init"));

    let log = fs::read_to_string(temp.path().join(".prefab-errors.jsonl")).unwrap();
    let entry: serde_json::Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(entry["command"], "list");
    assert_eq!(entry["error_type"], "store_error");
    assert_eq!(entry["suggestion"], "Run 'pfab init' to create a registry");
}

// ============================================================================
// paths given on the command line
// ============================================================================

#[test]
fn test_assets_override_is_relative_to_working_directory() {
    let temp = project(&[("Tree.prefab", "tree"), ("rocks/Rock.prefab", "rock")]);
    let rocks = temp.path().join("Assets/rocks");

    let (stdout, stderr, code) = run_in(&rocks, temp.path(), &["populate", "--assets", "."]);
    assert_eq!(code, 0, "populate failed: {}", stderr);
    assert!(stdout.contains("Added 1"), "unexpected output: {}", stdout);

    let entries = list_json(temp.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["tag"], "Rock");
    assert_eq!(entries[0]["reference"]["path"], "Rock.prefab");
}

#[test]
fn test_registry_override_is_relative_to_working_directory() {
    let temp = project(&[("Tree.prefab", "tree")]);
    let work = temp.path().join("work");
    fs::create_dir_all(&work).unwrap();
    fs::copy(temp.path().join("prefabs.json"), work.join("scratch.json")).unwrap();

    let (_, stderr, code) = run_in(&work, temp.path(), &["populate", "--registry", "scratch.json"]);
    assert_eq!(code, 0, "populate failed: {}", stderr);

    let scratch = fs::read_to_string(work.join("scratch.json")).unwrap();
    assert!(scratch.contains("Tree.prefab"));
    assert!(list_json(temp.path()).is_empty());
    assert!(!temp.path().join("scratch.json").exists());
}

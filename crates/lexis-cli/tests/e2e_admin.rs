//! E2E tests for admin-gated commands: sessions, moderation, categories,
//! import, backup and restore.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const ADMIN: &str = "admin@example.com";
const PASSWORD: &str = "correct horse";

fn lx_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lx"));
    cmd.current_dir(dir);
    cmd.env("LEXIS_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn json_ok(dir: &Path, args: &[&str]) -> Value {
    let output = lx_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("lx should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

/// Initialize with an admin account, without signing in.
fn init_with_admin(dir: &Path) {
    lx_cmd(dir)
        .args(["init", "--admin-email", ADMIN, "--admin-password", PASSWORD])
        .assert()
        .success();
}

fn login(dir: &Path) {
    let identity = json_ok(dir, &["login", "-e", ADMIN, "-p", PASSWORD]);
    assert_eq!(identity["admin"], true);
}

fn add_word(dir: &Path, word: &str, meaning: &str) -> i64 {
    json_ok(dir, &["add", word, meaning])["id"]
        .as_i64()
        .expect("id field")
}

#[test]
fn admin_commands_require_a_session() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    let id = add_word(dir.path(), "cat", "a small feline").to_string();

    for args in [
        vec!["delete", id.as_str()],
        vec!["edit", id.as_str(), "-m", "changed"],
        vec!["reports"],
        vec!["category", "add", "Nouns"],
        vec!["backup"],
    ] {
        lx_cmd(dir.path())
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("E3001"));
    }
}

#[test]
fn wrong_password_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    lx_cmd(dir.path())
        .args(["login", "-e", ADMIN, "-p", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3001"));

    let me = json_ok(dir.path(), &["whoami"]);
    assert_eq!(me["signed_in"], false);
    assert_eq!(me["email"], "anonymous");
}

#[test]
fn login_attributes_words_and_logout_forgets() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    login(dir.path());

    let id = add_word(dir.path(), "cat", "a small feline").to_string();
    assert_eq!(json_ok(dir.path(), &["show", &id])["created_by"], ADMIN);

    lx_cmd(dir.path()).args(["logout"]).assert().success();
    assert_eq!(json_ok(dir.path(), &["whoami"])["signed_in"], false);
}

#[test]
fn edit_and_soft_delete() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    login(dir.path());
    let id = add_word(dir.path(), "cat", "a small feline").to_string();

    let edited = json_ok(dir.path(), &["edit", &id, "-m", "a feline pet", "-d", "2"]);
    assert_eq!(edited["meaning"], "a feline pet");
    assert_eq!(edited["difficulty"], 2);

    json_ok(dir.path(), &["delete", &id]);
    lx_cmd(dir.path())
        .args(["show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
    assert_eq!(json_ok(dir.path(), &["list"])["total_items"], 0);
}

#[test]
fn categories_scope_list_and_export() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    login(dir.path());

    json_ok(dir.path(), &["category", "add", "Nouns", "-d", "things"]);
    lx_cmd(dir.path())
        .args(["category", "add", "nouns"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2006"));

    json_ok(dir.path(), &["add", "cat", "a small feline", "-c", "nouns"]);
    add_word(dir.path(), "run", "move fast");

    let page = json_ok(dir.path(), &["list", "-c", "Nouns"]);
    assert_eq!(page["total_items"], 1);

    let out = dir.path().join("out");
    let report = json_ok(
        dir.path(),
        &["export", "--as", "markdown", "-c", "Nouns", "-o", out.to_str().unwrap()],
    );
    assert_eq!(report["scope"], "Nouns");
    let path = report["path"].as_str().unwrap();
    assert!(path.contains("vocabulary_Nouns_"), "{path}");

    json_ok(dir.path(), &["category", "delete", "Nouns"]);
    let page = json_ok(dir.path(), &["list"]);
    assert_eq!(page["total_items"], 2, "words survive their category");
}

#[test]
fn reports_flow_from_pending_to_resolved() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    let id = add_word(dir.path(), "teh", "the").to_string();

    let filed = json_ok(dir.path(), &["report", &id, "-r", "misspelled"]);
    assert_eq!(filed["status"], "pending");
    assert_eq!(filed["reported_by"], "anonymous");
    let report_id = filed["id"].as_i64().unwrap().to_string();

    login(dir.path());
    let pending = json_ok(dir.path(), &["reports", "-s", "pending"]);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let resolved = json_ok(dir.path(), &["review", &report_id, "--approve"]);
    assert_eq!(resolved["status"], "resolved");

    lx_cmd(dir.path())
        .args(["review", &report_id, "--dismiss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2007"));
}

#[test]
fn import_validates_then_writes() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    login(dir.path());
    json_ok(dir.path(), &["category", "add", "Nouns"]);

    let file = dir.path().join("words.csv");
    std::fs::write(
        &file,
        "word,meaning,category,difficulty\n\
         zephyr,a gentle breeze,Nouns,2\n\
         quell,put an end to,Missing,1\n",
    )
    .unwrap();
    let file = file.to_str().unwrap();

    let dry = json_ok(dir.path(), &["import", file, "--dry-run"]);
    assert_eq!(dry["rows"], 2);
    assert_eq!(dry["valid"], 1);
    assert!(dry.get("result").is_none());
    assert_eq!(json_ok(dir.path(), &["list"])["total_items"], 0);

    let real = json_ok(dir.path(), &["import", file]);
    assert_eq!(real["result"]["imported"], 1);
    assert_eq!(real["invalid"][0]["row"], 2);
    assert_eq!(json_ok(dir.path(), &["list"])["total_items"], 1);
}

#[test]
fn import_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    login(dir.path());
    let file = dir.path().join("words.txt");
    std::fs::write(&file, "word\n").unwrap();

    lx_cmd(dir.path())
        .args(["import", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E6002"));
}

#[test]
fn backup_then_restore_into_a_fresh_project() {
    let source = TempDir::new().unwrap();
    init_with_admin(source.path());
    login(source.path());
    json_ok(source.path(), &["category", "add", "Nouns"]);
    json_ok(source.path(), &["add", "cat", "a small feline", "-c", "Nouns"]);
    add_word(source.path(), "run", "move fast");

    let out = source.path().join("backups");
    let written = json_ok(source.path(), &["backup", "-o", out.to_str().unwrap()]);
    assert_eq!(written["words"], 2);
    assert_eq!(written["categories"], 1);
    let path = written["path"].as_str().unwrap().to_string();
    assert!(path.contains("vocabulary-backup_all_"), "{path}");

    let history = json_ok(source.path(), &["backup", "--history"]);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let target = TempDir::new().unwrap();
    init_with_admin(target.path());
    login(target.path());
    let restored = json_ok(target.path(), &["restore", &path]);
    assert_eq!(restored["imported_words"], 2);
    assert_eq!(restored["imported_categories"], 1);

    let page = json_ok(target.path(), &["list", "-c", "Nouns"]);
    assert_eq!(page["items"][0]["word"], "cat");
}

#[test]
fn prefs_clear_signs_out() {
    let dir = TempDir::new().unwrap();
    init_with_admin(dir.path());
    login(dir.path());
    let id = add_word(dir.path(), "cat", "a small feline").to_string();
    json_ok(dir.path(), &["favorite", &id]);

    let cleared = json_ok(dir.path(), &["prefs", "clear"]);
    assert!(cleared["removed"].as_u64().unwrap() >= 2);
    assert_eq!(json_ok(dir.path(), &["whoami"])["signed_in"], false);
    assert_eq!(json_ok(dir.path(), &["show", &id])["favorite"], false);
}

// End-to-end runs of the `credfile` binary against a temporary file.
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn credfile(path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_credfile"))
        .arg("--file")
        .arg(path)
        .args(args)
        .env_remove("CREDFILE_PATH")
        .env("RUST_LOG", "warn")
        .output()
        .expect("spawn credfile")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

fn create(path: &Path, name: &str, email: &str) {
    let output = credfile(
        path,
        &[
            "create",
            "--name",
            name,
            "--username",
            "mario",
            "--email",
            email,
            "--password",
            "pa,ss",
        ],
    );
    assert!(output.status.success(), "create failed: {output:?}");
    assert_eq!(stdout(&output), "Password created successfully\n");
}

#[test]
fn create_all_search_delete_flow() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join(".pwds.csv");

    create(&path, "Google", "Mario.Rossi@Google.com");
    create(&path, "Bank", "mario@bank.example");

    let all = credfile(&path, &["all"]);
    assert!(all.status.success());
    assert_eq!(
        stdout(&all),
        "[0] Name: Google Username: mario Email: Mario.Rossi@Google.com Password: pa,ss\n\
         [1] Name: Bank Username: mario Email: mario@bank.example Password: pa,ss\n"
    );

    let search = credfile(&path, &["search", "--query", "GOOGLE"]);
    assert!(search.status.success());
    assert!(stdout(&search).starts_with("[0] Name: Google"));
    assert_eq!(stdout(&search).lines().count(), 1);

    let delete = credfile(&path, &["delete", "--index", "0"]);
    assert!(delete.status.success());
    assert!(stdout(&delete).starts_with("Deleted: [0] Name: Google"));

    let all = credfile(&path, &["--json", "all"]);
    assert!(all.status.success());
    let entries: Value = serde_json::from_str(&stdout(&all)).expect("valid json");
    let entries = entries.as_array().expect("json array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["index"], 0);
    assert_eq!(entries[0]["name"], "Bank");
    assert_eq!(entries[0]["password"], "pa,ss");
}

#[test]
fn bad_delete_index_fails_without_touching_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("creds.csv");
    create(&path, "Only", "only@example.com");
    let before = std::fs::read(&path).expect("read file");

    for index in ["1", "-1"] {
        let output = credfile(&path, &["delete", "--index", index]);
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("out of range"), "stderr: {stderr}");
    }
    assert_eq!(std::fs::read(&path).expect("read file"), before);
}

#[test]
fn create_rejects_empty_field() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("creds.csv");

    let output = credfile(
        &path,
        &[
            "create", "--name", "", "--username", "u", "--email", "e", "--password", "p",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--name"));
}

#[test]
fn malformed_rows_are_skipped_with_a_warning() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("creds.csv");
    std::fs::write(&path, "ok,u,e,p\nbroken,row\n").expect("seed file");

    let output = credfile(&path, &["all"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "[0] Name: ok Username: u Email: e Password: p\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("skipping malformed row"));
}

#[test]
fn purge_removes_the_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("creds.csv");
    create(&path, "Gone", "gone@example.com");

    assert!(!credfile(&path, &["purge"]).status.success());
    assert!(path.exists());
    assert!(credfile(&path, &["purge", "--yes"]).status.success());
    assert!(!path.exists());
}

use assert_cmd::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn chatrelay(workdir: &Path) -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("chatrelay");
    let mut cmd = Command::new(bin);
    cmd.current_dir(workdir)
        .env("CHATRELAY_LOG_DIR", workdir.join("logs"))
        .env("XDG_CONFIG_HOME", workdir.join("xdg"))
        .env_remove("RUST_LOG");
    cmd
}

fn conversation(first: &str, answer: &str) -> Value {
    json!({
        "title": first,
        "mapping": {
            "client-created-root": { "message": null, "children": ["u"] },
            "u": {
                "message": { "author": { "role": "user" }, "content": { "parts": [first] } },
                "children": ["a"]
            },
            "a": {
                "message": { "author": { "role": "assistant" }, "content": { "parts": [answer] } },
                "children": []
            }
        }
    })
}

#[test]
fn export_writes_filtered_messages() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("conversations.json");
    let payload = json!([
        conversation("row_id,text\n1,hello", "1,bonjour"),
        conversation("what time is it", "noon"),
    ]);
    fs::write(&archive, serde_json::to_vec(&payload).unwrap()).unwrap();

    let assert = chatrelay(dir.path())
        .args(["export", archive.to_str().unwrap(), "--prefix", "row_id"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    assert!(stdout.contains("num of conversations: 1"), "stdout: {stdout}");

    let written = dir.path().join("conversations_messages.json");
    let value: Value = serde_json::from_slice(&fs::read(written).unwrap()).expect("valid json");
    let conversations = value.as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0][1]["role"].as_str(), Some("assistant"));
    assert_eq!(conversations[0][1]["content"].as_str(), Some("1,bonjour"));
}

#[test]
fn submit_rejects_missing_table_before_touching_browser() {
    let dir = TempDir::new().unwrap();

    chatrelay(dir.path())
        .args(["submit", "absent.csv", "--thread-url", "https://x/thread"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn submit_rejects_non_http_thread_url() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("prompts.csv");
    fs::write(&csv, "messages\nhello\n").unwrap();

    let assert = chatrelay(dir.path())
        .args(["submit", csv.to_str().unwrap(), "--thread-url", "file:///tmp/x"])
        .assert()
        .failure();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("http"), "stderr: {stderr}");
}

#[test]
fn local_env_problems_are_logged_once_logging_is_up() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("config")).unwrap();
    fs::write(
        dir.path().join("config/local.env"),
        "CHATRELAY_HEADLESS=true\nnot an assignment\n",
    )
    .unwrap();
    let archive = dir.path().join("conversations.json");
    fs::write(&archive, "[]").unwrap();

    let assert = chatrelay(dir.path())
        .args(["export", archive.to_str().unwrap()])
        .assert()
        .success();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("invalid local.env entry"), "stderr: {stderr}");
}

#[test]
fn debug_run_emits_metrics_exposition() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("conversations.json");
    fs::write(&archive, "[]").unwrap();

    let assert = chatrelay(dir.path())
        .args(["--debug", "export", archive.to_str().unwrap()])
        .assert()
        .success();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(
        stderr.contains("chatrelay_replies_collected_total"),
        "stderr: {stderr}"
    );
}

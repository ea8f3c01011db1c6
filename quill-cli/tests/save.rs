//! End-to-end tests for the save command, using a stub in place of tidy.

#![cfg(unix)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

fn write_stub_tidy(dir: &TempDir) -> PathBuf {
    let script_path = dir.path().join("fake-tidy.sh");
    // Ignores the tidy flags and passes the document through.
    fs::write(&script_path, "#!/bin/sh\ncat\n").unwrap();
    let mut perms = fs::metadata(&script_path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script_path, perms).unwrap();
    script_path
}

#[test]
fn save_prints_note_markup() {
    let dir = tempdir().unwrap();
    let stub = write_stub_tidy(&dir);
    let input = dir.path().join("note.html");
    fs::write(
        &input,
        "<html><head></head><body><div>Hello</div>\
         <input type=\"checkbox\" checked=\"checked\"/>task</body></html>",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.env("QUILL_TIDY_BIN", &stub)
        .current_dir(dir.path())
        .arg("save")
        .arg(input.as_os_str());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"))
        .stdout(predicate::str::contains("<en-note style="))
        .stdout(predicate::str::contains("<div>Hello</div>"))
        .stdout(predicate::str::contains("<en-todo checked=\"true\"/>task"));
}

#[test]
fn save_writes_to_output_file() {
    let dir = tempdir().unwrap();
    let stub = write_stub_tidy(&dir);
    let input = dir.path().join("note.html");
    let output = dir.path().join("note.enml");
    fs::write(&input, "<html><body><p>saved</p></body></html>").unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.env("QUILL_TIDY_BIN", &stub)
        .current_dir(dir.path())
        .arg("save")
        .arg(input.as_os_str())
        .arg("-o")
        .arg(output.as_os_str());

    cmd.assert().success();
    let enml = fs::read_to_string(&output).unwrap();
    assert!(enml.contains("<p>saved</p>"));
}

#[test]
fn save_report_emits_json_with_resources() {
    let dir = tempdir().unwrap();
    let stub = write_stub_tidy(&dir);
    let input = dir.path().join("note.html");
    fs::write(
        &input,
        "<html><body><img en-tag=\"en-media\" lid=\"7\" hash=\"ab\" type=\"image/png\"/></body></html>",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.env("QUILL_TIDY_BIN", &stub)
        .current_dir(dir.path())
        .arg("save")
        .arg(input.as_os_str())
        .arg("--report");

    let output = cmd.assert().success().get_output().stdout.clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["resources"], serde_json::json!([7]));
    assert!(report["enml"].as_str().unwrap().contains("<en-media"));
    assert_eq!(report["unresolved_slots"], serde_json::json!([]));
}

#[test]
fn save_warns_about_unresolved_encryption_slots() {
    let dir = tempdir().unwrap();
    let stub = write_stub_tidy(&dir);
    let input = dir.path().join("note.html");
    fs::write(
        &input,
        "<html><body><table class=\"en-crypt-temp\" slot=\"3\">\
         <tbody><tr><td>secret</td></tr></tbody></table></body></html>",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.env("QUILL_TIDY_BIN", &stub)
        .current_dir(dir.path())
        .arg("save")
        .arg(input.as_os_str());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("slot \"3\""));
}

#[test]
fn save_fails_when_the_repair_binary_is_missing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("note.html");
    fs::write(&input, "<html><body><p>x</p></body></html>").unwrap();
    let config_path = dir.path().join("quill.toml");
    fs::write(
        &config_path,
        "[normalize]\ncommand = \"/nonexistent/tidy-stub\"\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("quill");
    cmd.current_dir(dir.path())
        .arg("save")
        .arg(input.as_os_str())
        .arg("--config")
        .arg(config_path.as_os_str());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Conversion error"));
}

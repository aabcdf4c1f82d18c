//! Tests for the `devagent` binary's offline commands.

use std::io::Write;
use std::process::{Command, Stdio};

fn devagent(config: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_devagent"));
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn tools_prints_ordered_descriptors() {
    let dir = tempfile::tempdir().unwrap();
    let output = devagent(&dir.path().join("config.toml"))
        .arg("tools")
        .output()
        .unwrap();
    assert!(output.status.success());

    let tools: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = tools
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 8);
    assert_eq!(names[0], "read_file");
    assert_eq!(names[7], "create_pull_request");
}

#[test]
fn config_default_is_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let output = devagent(&dir.path().join("config.toml"))
        .args(["config", "--default"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    let parsed: toml::Value = toml::from_str(&text).unwrap();
    assert_eq!(parsed["agent"]["max_steps"].as_integer(), Some(25));
    assert_eq!(parsed["trigger"]["batch_mode"].as_str(), Some("first"));
}

#[test]
fn config_show_redacts_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "api_key = \"sk-very-secret\"\nmodel = \"gpt-4o-mini\"\n").unwrap();

    let output = devagent(&path).arg("config").output().unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(!text.contains("sk-very-secret"));
    assert!(text.contains("gpt-4o-mini"));
}

#[test]
fn handle_event_rejects_malformed_event() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = devagent(&dir.path().join("config.toml"))
        .arg("handle-event")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"{\"NotRecords\": []}")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid queue event"));
}

//! Integration tests for jsontree
//!
//! These tests verify that the CLI and the crates work together.

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

use jsontree_core::{GraphUpdate, Session};
use jsontree_server::ServerState;
use jsontree_watcher::{ReloadOutcome, reload_file};
use serde_json::Value;
use tempfile::TempDir;

const USER_DOC: &str = r#"{
  "user": {
    "id": 1,
    "name": "John Doe",
    "address": {"city": "New York", "country": "USA"},
    "items": [{"name": "item1"}, {"name": "item2"}]
  }
}"#;

fn jsontree(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jsontree"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

fn write_doc(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("doc.json");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = jsontree(&["--help"], dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Explore JSON documents as an interactive node graph"));
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    let output = jsontree(&["version"], dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("jsontree v"));
}

#[test]
fn test_cli_build_prints_graph() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, USER_DOC);
    let output = jsontree(&["build", &doc], dir.path());
    assert!(output.status.success());

    let graph: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 12);
    assert_eq!(graph["edges"].as_array().unwrap().len(), 11);
    assert_eq!(graph["nodes"][0]["label"], "$");
}

#[test]
fn test_cli_search() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, USER_DOC);

    let output = jsontree(&["search", &doc, "$.user.items.1.name"], dir.path());
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["matched"], "user.items[1].name");
    assert_eq!(result["strategy"], "loose");

    let output = jsontree(&["search", &doc, "user.missing"], dir.path());
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["had_match"], false);
}

#[test]
fn test_cli_export() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, r#"{"z":1,"a":[true]}"#);

    let output = jsontree(&["export", &doc], dir.path());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "{\n  \"z\": 1,\n  \"a\": [\n    true\n  ]\n}\n"
    );

    let output = jsontree(&["export", &doc, "--paths"], dir.path());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "$\nz\na\na[0]\n");
}

#[test]
fn test_cli_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "{\"a\": ");
    let output = jsontree(&["build", &doc], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid JSON"));
}

#[test]
fn test_cli_reads_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("jsontree.toml"), "[limits]\nmax_depth = 1\n").unwrap();
    let doc = write_doc(&dir, r#"{"a": {"b": 1}}"#);
    let output = jsontree(&["build", &doc], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Graph too large"));
}

/// A file change flows through the watcher into the shared server session
/// and reaches subscribed clients as a full rebuild.
#[tokio::test]
async fn test_file_change_reaches_clients() {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("doc.json");
    std::fs::write(&doc, USER_DOC).unwrap();

    let state = Arc::new(ServerState::new(Session::default()));
    let mut rx = state.subscribe();

    let outcome = reload_file(&doc, &state.session, Some(&state.update_tx)).await;
    assert!(matches!(outcome, ReloadOutcome::Rebuilt(_)));

    std::fs::write(&doc, r#"{"user": {"id": 2}}"#).unwrap();
    reload_file(&doc, &state.session, Some(&state.update_tx)).await;

    let first: GraphUpdate = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    let second: GraphUpdate = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert!(matches!(first, GraphUpdate::GraphRebuilt { generation: 1, .. }));
    match second {
        GraphUpdate::GraphRebuilt { generation, graph } => {
            assert_eq!(generation, 2);
            assert_eq!(graph.nodes.len(), 3);
        }
        other => panic!("unexpected update {other:?}"),
    }

    let mut session = state.session.write().await;
    assert!(!session.search("user.name").had_match());
    assert_eq!(session.search("user.id").node_id(), Some("user.id"));
}

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use tempfile::tempdir;

fn trigger_only_flow() -> serde_json::Value {
    serde_json::json!({
        "display_name": "f",
        "state": "DRAFT",
        "valid": true,
        "trigger": {
            "type": "TRIGGER_EMPTY",
            "name": "trigger",
            "display_name": "Trigger",
            "valid": true,
            "settings": {},
            "next": null
        }
    })
}

fn add_action_op() -> serde_json::Value {
    serde_json::json!({
        "type": "ADD_ACTION",
        "parent": "trigger",
        "relative": "AFTER",
        "action": {
            "display_name": "Do thing",
            "kind": "ACTION_CODE",
            "settings": {}
        }
    })
}

#[test]
fn apply_writes_the_resulting_flow_to_stdout() {
    let dir = tempdir().unwrap();
    let flow_path = dir.path().join("flow.json");
    let op_path = dir.path().join("op.json");
    fs::write(&flow_path, serde_json::to_string(&trigger_only_flow()).unwrap()).unwrap();
    fs::write(&op_path, serde_json::to_string(&add_action_op()).unwrap()).unwrap();

    Command::cargo_bin("flowgraph")
        .unwrap()
        .args(["apply", flow_path.to_str().unwrap(), op_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("step_1"));
}

#[test]
fn steps_lists_every_step_in_traversal_order() {
    let dir = tempdir().unwrap();
    let flow_path = dir.path().join("flow.json");
    fs::write(&flow_path, serde_json::to_string(&trigger_only_flow()).unwrap()).unwrap();

    Command::cargo_bin("flowgraph")
        .unwrap()
        .args(["steps", flow_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("trigger"));
}

#[test]
fn apply_on_a_missing_flow_file_fails_without_panicking() {
    Command::cargo_bin("flowgraph")
        .unwrap()
        .args(["apply", "/no/such/flow.json", "/no/such/op.json"])
        .assert()
        .failure();
}

#[test]
fn normalize_strips_credentials() {
    let dir = tempdir().unwrap();
    let flow_path = dir.path().join("flow.json");
    let mut flow = trigger_only_flow();
    flow["trigger"]["next"] = serde_json::json!({
        "type": "ACTION_PIECE",
        "name": "step_1",
        "display_name": "Slack",
        "valid": true,
        "settings": {
            "piece_name": "slack",
            "piece_version": "1.0.0",
            "input": { "auth": "secret-token" },
            "input_ui_info": {}
        },
        "next": null
    });
    fs::write(&flow_path, serde_json::to_string(&flow).unwrap()).unwrap();

    Command::cargo_bin("flowgraph")
        .unwrap()
        .args(["normalize", flow_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("secret-token").not());
}

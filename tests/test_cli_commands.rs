mod common;

use common::{Workspace, stderr, stdout};

#[test]
fn apply_walks_phases_to_terminal() {
    let ws = Workspace::with_resource("rollout", &["prepare", "ready", "running"]);
    assert_eq!(ws.apply_and_read("rollout"), "prepare");
    assert_eq!(ws.apply_and_read("rollout"), "ready");
    assert_eq!(ws.apply_and_read("rollout"), "running");
    assert_eq!(ws.apply_and_read("rollout"), "running");
}

#[test]
fn plan_does_not_write_state() {
    let ws = Workspace::with_resource("rollout", &["prepare", "ready"]);
    let output = ws.run(&["plan"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("+ phaser_sequential.rollout"));
    assert!(!ws.state_path().exists());
}

#[test]
fn plan_reports_no_changes_at_terminal() {
    let ws = Workspace::with_resource("rollout", &["running"]);
    ws.apply_and_read("rollout");
    let output = ws.run(&["plan"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No changes"));
}

#[test]
fn plan_json_lists_update() {
    let ws = Workspace::with_resource("rollout", &["prepare", "ready"]);
    ws.apply_and_read("rollout");

    let output = ws.run(&["plan", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["changes"][0]["action"], "update");
    assert_eq!(value["changes"][0]["from"], "prepare");
    assert_eq!(value["changes"][0]["to"], "ready");
}

#[test]
fn removed_phase_blocks_with_phase_exit_code() {
    let ws = Workspace::with_resource("rollout", &["prepare", "ready"]);
    ws.apply_and_read("rollout");
    ws.declare(&[("rollout", &["ready", "running"])]);

    let output = ws.run(&["apply"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains(r#"phase "prepare" not found in phases=[ready running]"#));
    assert_eq!(ws.stored_phase("rollout").as_deref(), Some("prepare"));
}

#[test]
fn blocked_instance_does_not_stop_others() {
    let ws = Workspace::new();
    ws.declare(&[("a", &["one", "two"]), ("b", &["x", "y"])]);
    ws.apply_and_read("a");
    ws.declare(&[("a", &["one", "two"]), ("b", &["z"])]);

    let output = ws.run(&["apply"]);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(ws.stored_phase("a").as_deref(), Some("two"));
    assert_eq!(ws.stored_phase("b").as_deref(), Some("x"));
}

#[test]
fn import_then_apply() {
    let ws = Workspace::with_resource("rollout", &["prepare", "ready", "running"]);
    let output = ws.run(&["import", "rollout", "prepare"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(ws.stored_phase("rollout").as_deref(), Some("prepare"));

    assert_eq!(ws.apply_and_read("rollout"), "ready");
    assert_eq!(ws.apply_and_read("rollout"), "running");
    assert_eq!(ws.apply_and_read("rollout"), "running");
}

#[test]
fn import_undeclared_suggests_name() {
    let ws = Workspace::with_resource("rollout", &["prepare"]);
    let output = ws.run(&["import", "rolout", "prepare"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("did you mean 'rollout'"));
}

#[test]
fn undeclared_resource_is_destroyed() {
    let ws = Workspace::new();
    ws.declare(&[("a", &["one"]), ("b", &["one"])]);
    ws.apply_and_read("a");
    ws.declare(&[("a", &["one"])]);

    let output = ws.run(&["apply"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("1 destroyed"));
    assert_eq!(ws.stored_phase("b"), None);
}

#[test]
fn state_show_and_rm() {
    let ws = Workspace::with_resource("rollout", &["prepare"]);
    ws.apply_and_read("rollout");

    let output = ws.run(&["state", "show", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["resources"]["rollout"]["phase"], "prepare");

    let output = ws.run(&["state", "rm", "rollout"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(ws.stored_phase("rollout"), None);

    let output = ws.run(&["state", "rm", "rollout"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn validate_reports_every_issue() {
    let ws = Workspace::new();
    ws.write_manifest("resources:\n  a:\n    phases: []\n  b:\n    phases: [x, x]\n");

    let output = ws.run(&["validate"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("resources.a.phases"), "{err}");
    assert!(err.contains("resources.b.phases[1]"), "{err}");
}

#[test]
fn validate_json_output() {
    let ws = Workspace::with_resource("rollout", &["prepare", "ready"]);
    let output = ws.run(&["validate", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["valid"], true);
    assert_eq!(value["resources"][0], "rollout");
}

#[test]
fn missing_manifest_is_config_error() {
    let ws = Workspace::new();
    let output = ws.run(&["plan"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn next_sequential_and_cyclic() {
    let ws = Workspace::new();
    let output = ws.run(&["next", "--phases", "a,b,c", "--current", "c"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "c");

    let output = ws.run(&["next", "--phases", "a,b,c", "--current", "c", "--cyclic"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "a");

    let output = ws.run(&["next", "--phases", "a,b", "--current", "z"]);
    assert_eq!(output.status.code(), Some(5));

    let output = ws.run(&["next", "--phases", "a,a", "--current", "a"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn events_stream_records_transitions() {
    let ws = Workspace::with_resource("rollout", &["prepare", "ready"]);
    ws.apply_and_read("rollout");

    let events = ws.path().join("events.jsonl");
    let output = ws.run(&["apply", "--events", events.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));

    let raw = std::fs::read_to_string(&events).unwrap();
    let kinds: Vec<String> = raw
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["type"]
            .as_str()
            .unwrap()
            .to_string())
        .collect();
    assert_eq!(kinds, vec!["PlanComputed", "PhaseAdvanced"]);
}

#[test]
fn version_json() {
    let ws = Workspace::new();
    let output = ws.run(&["version", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["name"], "phaser");
}

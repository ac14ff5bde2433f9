// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

// Loading link policies from rtflow.yaml.

mod common;

use std::fs;

use common::read_i32;
use rtflow::{ConnPolicy, FlowError, FlowStatus, InputPort, LinkPolicyTable, LockPolicy, OutputPort};
use tempfile::TempDir;

const TABLE: &str = r#"
default:
  kind: data
policies:
  telemetry:
    kind: buffer
    capacity: 3
    lock_policy: lock_free
  setpoint:
    kind: data
    init: true
"#;

#[test]
fn test_load_from_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(LinkPolicyTable::FILE_NAME), TABLE).unwrap();

    let table = LinkPolicyTable::load(dir.path()).unwrap();
    let telemetry = table.require("telemetry").unwrap();
    assert_eq!(telemetry.capacity(), 3);
    assert_eq!(telemetry.lock_policy(), LockPolicy::LockFree);
    assert_eq!(table.policy_for("unknown"), ConnPolicy::data());
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        LinkPolicyTable::load(dir.path()),
        Err(FlowError::Configuration(_))
    ));
    assert_eq!(LinkPolicyTable::load_or_default(dir.path()), LinkPolicyTable::default());
}

#[test]
fn test_unparseable_file_falls_back() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(LinkPolicyTable::FILE_NAME),
        "policies:\n  bad:\n    kind: data\n    capacity: 5\n",
    )
    .unwrap();

    let err = LinkPolicyTable::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("rtflow.yaml"));
    assert!(LinkPolicyTable::load_or_default(dir.path()).policies.is_empty());
}

#[test]
fn test_configured_policies_drive_links() {
    let table = LinkPolicyTable::from_yaml_str(TABLE).unwrap();

    let w = OutputPort::<i32>::new("telemetry");
    let r = InputPort::<i32>::with_policy("telemetry", table.policy_for("telemetry"));
    w.connect_to(&r).unwrap();
    for v in 0..5 {
        w.write(v);
    }
    assert_eq!(w.dropped_samples(), 2);
    assert_eq!(read_i32(&r), (FlowStatus::NewData, 0));

    let sw = OutputPort::<i32>::new("setpoint");
    let sr = InputPort::<i32>::new("setpoint");
    sw.write(42);
    sw.connect_to_with(&sr, table.policy_for("setpoint")).unwrap();
    assert_eq!(read_i32(&sr), (FlowStatus::NewData, 42));
}

#[test]
fn test_table_round_trips_through_yaml() {
    let mut table = LinkPolicyTable::default();
    table.insert("a", ConnPolicy::buffer(5).lock_free().with_pull(true));
    let yaml = serde_yaml::to_string(&table).unwrap();
    assert_eq!(LinkPolicyTable::from_yaml_str(&yaml).unwrap(), table);
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Named connection policies via `rtflow.yaml`.
//!
//! ```yaml
//! default:
//!   kind: data
//! policies:
//!   camera_frames:
//!     kind: buffer
//!     capacity: 8
//!     lock_policy: lock_free
//!   setpoint:
//!     kind: data
//!     init: true
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::links::graph::ConnPolicy;
use crate::core::{FlowError, Result};

/// Table of connection policies keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkPolicyTable {
    /// Policy for names that are not listed.
    #[serde(default)]
    pub default: Option<ConnPolicy>,

    #[serde(default)]
    pub policies: BTreeMap<String, ConnPolicy>,
}

impl LinkPolicyTable {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "rtflow.yaml";

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| FlowError::Configuration(format!("Failed to parse link policies: {}", e)))
    }

    /// Load the table from a directory. Returns error if the file is missing
    /// or cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            FlowError::Configuration(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let table: Self = serde_yaml::from_str(&content).map_err(|e| {
            FlowError::Configuration(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;

        tracing::info!(
            "Loaded {} link policies from {}",
            table.policies.len(),
            config_path.display()
        );
        Ok(table)
    }

    /// Load the table from a directory, returning an empty table if the file
    /// is missing or unparseable.
    pub fn load_or_default(dir: &Path) -> Self {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!(
                "No {} found in {}, using defaults",
                Self::FILE_NAME,
                dir.display()
            );
            return Self::default();
        }

        match Self::load(dir) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<ConnPolicy> {
        self.policies.get(name).copied()
    }

    /// Policy for unlisted names: the table default, else `data`.
    pub fn default_policy(&self) -> ConnPolicy {
        self.default.unwrap_or_default()
    }

    /// Policy for `name`, falling back to [`default_policy`](Self::default_policy).
    pub fn policy_for(&self, name: &str) -> ConnPolicy {
        self.get(name).unwrap_or_else(|| self.default_policy())
    }

    /// Policy for `name`; an unlisted name is an error.
    pub fn require(&self, name: &str) -> Result<ConnPolicy> {
        self.get(name).ok_or_else(|| {
            FlowError::Configuration(format!("No link policy named '{}'", name))
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, policy: ConnPolicy) -> Option<ConnPolicy> {
        self.policies.insert(name.into(), policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::links::graph::{BufferPolicy, LockPolicy};

    const SAMPLE: &str = r#"
default:
  kind: buffer
  capacity: 2
policies:
  frames:
    kind: buffer
    capacity: 8
    lock_policy: lock_free
  setpoint:
    kind: data
    init: true
"#;

    #[test]
    fn test_parse_table() {
        let table = LinkPolicyTable::from_yaml_str(SAMPLE).unwrap();

        let frames = table.require("frames").unwrap();
        assert_eq!(frames.kind(), BufferPolicy::Buffer);
        assert_eq!(frames.capacity(), 8);
        assert_eq!(frames.lock_policy(), LockPolicy::LockFree);

        let setpoint = table.get("setpoint").unwrap();
        assert!(setpoint.init_sample());
        assert_eq!(setpoint.capacity(), 1);

        assert_eq!(table.policy_for("other"), ConnPolicy::buffer(2));
    }

    #[test]
    fn test_empty_table_defaults_to_data() {
        let table = LinkPolicyTable::from_yaml_str("{}").unwrap();
        assert_eq!(table.default_policy(), ConnPolicy::data());
        assert!(matches!(
            table.require("x"),
            Err(FlowError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_policy() {
        let err = LinkPolicyTable::from_yaml_str(
            "policies:\n  bad:\n    kind: buffer\n    capacity: 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::Configuration(_)));

        assert!(LinkPolicyTable::from_yaml_str("unknown_key: 1\n").is_err());
    }

    #[test]
    fn test_insert() {
        let mut table = LinkPolicyTable::default();
        assert!(table.insert("a", ConnPolicy::buffer(3)).is_none());
        assert_eq!(table.policy_for("a"), ConnPolicy::buffer(3));
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Unique identifier of one port object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(String);

impl PortId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self(format!("P{}", cuid2::create_id()))
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Identity of a port: unique id, user-facing name and direction.
///
/// Names are not unique; two ports may share a name (that is how
/// [`PortInterface::connect_ports`](super::PortInterface::connect_ports)
/// pairs them up). The id is what tells port objects apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortIdentity {
    pub id: PortId,
    pub name: Arc<str>,
    pub direction: PortDirection,
}

impl PortIdentity {
    pub fn new(name: &str, direction: PortDirection) -> Self {
        Self {
            id: PortId::new(),
            name: Arc::from(name),
            direction,
        }
    }
}

impl fmt::Display for PortIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.direction, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_distinct_ids() {
        let a = PortIdentity::new("x", PortDirection::Output);
        let b = PortIdentity::new("x", PortDirection::Output);
        assert_ne!(a, b);
        assert_eq!(a.name, b.name);
        assert!(a.id.as_str().starts_with('P'));
    }

    #[test]
    fn test_display() {
        let id = PortIdentity::new("setpoint", PortDirection::Input);
        assert_eq!(id.to_string(), "input:setpoint");
        assert_eq!(PortDirection::Input.opposite(), PortDirection::Output);
    }
}

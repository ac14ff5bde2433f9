// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::core::{FlowError, Result};

/// Capacity used by [`ConnPolicy::buffer_default`](super::ConnPolicy::buffer_default).
pub const DEFAULT_BUFFER_CAPACITY: usize = 4;

/// Number of samples a link can hold. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct LinkCapacity(usize);

impl LinkCapacity {
    /// Capacity of every data link.
    pub const ONE: LinkCapacity = LinkCapacity(1);

    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(FlowError::InvalidPolicy(
                "link capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self(capacity))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for LinkCapacity {
    fn default() -> Self {
        LinkCapacity(DEFAULT_BUFFER_CAPACITY)
    }
}

impl TryFrom<usize> for LinkCapacity {
    type Error = FlowError;

    fn try_from(value: usize) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LinkCapacity> for usize {
    fn from(capacity: LinkCapacity) -> Self {
        capacity.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rejected() {
        assert!(matches!(LinkCapacity::new(0), Err(FlowError::InvalidPolicy(_))));
        assert_eq!(LinkCapacity::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_default() {
        assert_eq!(LinkCapacity::default().get(), DEFAULT_BUFFER_CAPACITY);
        assert_eq!(LinkCapacity::ONE.get(), 1);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_yaml::from_str::<LinkCapacity>("0").is_err());
        assert_eq!(serde_yaml::from_str::<LinkCapacity>("8").unwrap().get(), 8);
    }
}

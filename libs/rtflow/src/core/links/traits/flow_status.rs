// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Tri-state outcome of every read.

use serde::{Deserialize, Serialize};

/// Result of reading a port or a single link.
///
/// Ordered so that `NoData < OldData < NewData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    /// Nothing has been delivered on this read path (or it has no links).
    NoData,
    /// No fresh sample; the previously delivered value was returned again.
    OldData,
    /// A sample not seen before was returned.
    NewData,
}

impl FlowStatus {
    /// `true` for `OldData` and `NewData`: the output value is meaningful.
    #[inline]
    pub fn has_data(self) -> bool {
        self != FlowStatus::NoData
    }

    #[inline]
    pub fn is_new(self) -> bool {
        self == FlowStatus::NewData
    }
}

impl From<FlowStatus> for bool {
    fn from(status: FlowStatus) -> Self {
        status.has_data()
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData => write!(f, "NoData"),
            Self::OldData => write!(f, "OldData"),
            Self::NewData => write!(f, "NewData"),
        }
    }
}

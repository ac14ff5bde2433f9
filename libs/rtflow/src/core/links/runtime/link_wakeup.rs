// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Wakeup events handed to an external scheduler.

use crate::core::ports::PortIdentity;

/// Event queued for the scheduler when a link of an input port goes from
/// empty to non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkWakeupEvent {
    /// New data is available on the named input port.
    DataAvailable(PortIdentity),
}

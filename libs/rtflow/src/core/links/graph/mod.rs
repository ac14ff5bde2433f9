// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link blueprint types: identity and connection policy.

pub mod conn_policy;
pub mod link_capacity;
pub mod link_id;

pub use conn_policy::{BufferPolicy, ConnPolicy, LockPolicy};
pub use link_capacity::{LinkCapacity, DEFAULT_BUFFER_CAPACITY};
pub use link_id::LinkId;

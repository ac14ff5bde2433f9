// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Typed links between ports.
//!
//! - `graph`: link identity and connection policy
//! - `runtime`: link storage and the port types
//! - `traits`: sample bound and read status

pub mod graph;
pub mod link_factory;
pub mod runtime;
pub mod traits;

pub use graph::{BufferPolicy, ConnPolicy, LinkCapacity, LinkId, LockPolicy, DEFAULT_BUFFER_CAPACITY};
pub use link_factory::{connect_any, create_connection};
pub use runtime::{
    LinkInput, LinkOutput, LinkStats, LinkWakeupEvent, NewDataCallback, NewDataHook,
};
pub use traits::{FlowStatus, LinkPortMessage};

/// Input port carrying samples of type `T`.
pub type InputPort<T> = LinkInput<T>;

/// Output port carrying samples of type `T`.
pub type OutputPort<T> = LinkOutput<T>;

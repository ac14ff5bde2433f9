// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Real-time data-flow ports.
//!
//! Components exchange typed samples through [`OutputPort`]s and
//! [`InputPort`]s. Every writer/reader pair is joined by its own link
//! channel, configured by a [`ConnPolicy`]:
//!
//! - **data** links hold a single slot that each write overwrites;
//! - **buffer** links hold a bounded FIFO that drops the newest sample
//!   when full;
//! - either kind is backed by a mutex (`locked`) or by a wait-free
//!   single-producer/single-consumer structure (`lock_free`).
//!
//! Reads never block and report a [`FlowStatus`]. An input port with
//! several links drains the current link until it is empty before moving
//! on to the next one in connection order.
//!
//! ```
//! use rtflow::{ConnPolicy, FlowStatus, InputPort, OutputPort};
//!
//! let writer = OutputPort::<i32>::new("setpoint");
//! let reader = InputPort::<i32>::new("setpoint");
//! writer.connect_to_with(&reader, ConnPolicy::buffer(4)).unwrap();
//!
//! writer.write(10);
//! writer.write(20);
//!
//! let mut value = 0;
//! assert_eq!(reader.read(&mut value), FlowStatus::NewData);
//! assert_eq!(value, 10);
//! assert_eq!(reader.read(&mut value), FlowStatus::NewData);
//! assert_eq!(value, 20);
//! assert_eq!(reader.read(&mut value), FlowStatus::OldData);
//! ```

#![allow(clippy::type_complexity)] // Complex types are clear in context

pub mod core;

pub use core::{
    connect_any, create_connection, AnyPort, BufferPolicy, ConnPolicy, FlowError, FlowStatus,
    InputPort, LinkCapacity, LinkId, LinkInput, LinkOutput, LinkPolicyTable, LinkPortMessage,
    LinkStats, LinkWakeupEvent, LockPolicy, NewDataHook, OutputPort, PortDirection, PortHandle,
    PortId, PortIdentity, PortInterface, Result,
};

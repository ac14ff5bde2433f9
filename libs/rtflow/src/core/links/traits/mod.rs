// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Shared traits and value types for link ports.

mod flow_status;
mod link_port_message;

pub use flow_status::FlowStatus;
pub use link_port_message::LinkPortMessage;

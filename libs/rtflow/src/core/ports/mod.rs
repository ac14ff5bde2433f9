// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Port identity, type-erased port access and interface membership.

pub mod any_port;
pub mod port_id;
pub mod port_interface;
pub mod port_membership;

pub use any_port::{AnyPort, PortHandle};
pub use port_id::{PortDirection, PortId, PortIdentity};
pub use port_interface::PortInterface;
pub use port_membership::PortMembership;

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Type-erased port capabilities.

use std::any::{Any, TypeId};
use std::sync::Arc;

use super::port_id::{PortId, PortIdentity};
use super::port_membership::PortMembership;
use crate::core::error::Result;
use crate::core::links::graph::{ConnPolicy, LinkId};
use crate::core::links::runtime::{LinkStats, NewDataHook};

/// Non-generic view of a port, used for bookkeeping that must not care
/// about the sample type: interface tables, peer lists, run-time checked
/// connection.
pub trait AnyPort: Send + Sync + 'static {
    fn identity(&self) -> &PortIdentity;

    fn value_type_id(&self) -> TypeId;

    fn value_type_name(&self) -> &'static str;

    fn connected(&self) -> bool;

    fn link_count(&self) -> usize;

    /// Identities of the ports at the other end of each link.
    fn peers(&self) -> Vec<PortIdentity>;

    fn has_peer(&self, peer: &PortId) -> bool;

    fn link_stats(&self) -> Vec<LinkStats>;

    /// Remove every link of this port. Returns `false` if there was none.
    fn disconnect(&self) -> bool;

    /// Remove the links to one peer. Returns `false` if there was none.
    fn disconnect_peer(&self, peer: &PortId) -> bool;

    /// Policy used when a connection to this port names none. Only input
    /// ports carry one.
    fn default_policy(&self) -> Option<ConnPolicy>;

    /// Name of the interface that currently owns this port.
    fn owner(&self) -> Option<String> {
        self.membership().owner_name()
    }

    #[doc(hidden)]
    fn membership(&self) -> &PortMembership;

    /// Install or clear the new-data hook. Returns `false` for ports that
    /// cannot carry one (outputs).
    #[doc(hidden)]
    fn replace_hook(&self, hook: Option<NewDataHook>) -> bool;

    /// Drop one link end after the peer closed it.
    #[doc(hidden)]
    fn detach_link(&self, link_id: &LinkId) -> bool;

    /// Connect this port (the writer) to `reader`, checking direction and
    /// value type at run time.
    #[doc(hidden)]
    fn connect_erased(
        self: Arc<Self>,
        reader: Arc<dyn AnyPort>,
        policy: Option<ConnPolicy>,
    ) -> Result<LinkId>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Anything that can hand out its type-erased port.
pub trait PortHandle {
    fn any_port(&self) -> Arc<dyn AnyPort>;
}

impl PortHandle for Arc<dyn AnyPort> {
    fn any_port(&self) -> Arc<dyn AnyPort> {
        Arc::clone(self)
    }
}

/// Pointer identity of two type-erased ports.
pub(crate) fn same_port(a: &Arc<dyn AnyPort>, b: &Arc<dyn AnyPort>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkInput - Input port.

use std::any::{Any, TypeId};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::link_input_data_reader::LinkInputDataReader;
use super::link_input_router::{LinkInputFromUpstream, LinkInputRouter};
use super::link_instance::LinkStats;
use super::link_notifier::NewDataHook;
use crate::core::error::{FlowError, Result};
use crate::core::links::graph::{ConnPolicy, LinkId};
use crate::core::links::traits::{FlowStatus, LinkPortMessage};
use crate::core::ports::{AnyPort, PortDirection, PortHandle, PortId, PortIdentity, PortMembership};

struct LinkInputState<T: LinkPortMessage> {
    router: LinkInputRouter<T>,
    hook: Option<NewDataHook>,
}

/// Shared state behind every [`LinkInput`] handle.
pub struct LinkInputInner<T: LinkPortMessage> {
    identity: PortIdentity,
    default_policy: ConnPolicy,
    state: Mutex<LinkInputState<T>>,
    membership: PortMembership,
}

impl<T: LinkPortMessage> LinkInputInner<T> {
    fn new(port_name: &str, default_policy: ConnPolicy) -> Self {
        Self {
            identity: PortIdentity::new(port_name, PortDirection::Input),
            default_policy,
            state: Mutex::new(LinkInputState {
                router: LinkInputRouter::default(),
                hook: None,
            }),
            membership: PortMembership::default(),
        }
    }

    pub(crate) fn default_link_policy(&self) -> ConnPolicy {
        self.default_policy
    }

    /// Add the reader end of a freshly created link. The link inherits this
    /// port's notification hook.
    pub(crate) fn attach_upstream(
        &self,
        data_reader: LinkInputDataReader<T>,
        peer: Weak<dyn AnyPort>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let writer = data_reader.link().writer();
        if state.router.has_peer(&writer.id) {
            return Err(FlowError::LinkAlreadyExists(format!(
                "{} -> {}",
                writer, self.identity
            )));
        }
        data_reader.link().set_hook(state.hook.clone());
        state
            .router
            .attach(LinkInputFromUpstream::new(data_reader, peer));
        Ok(())
    }

    fn release(&self, removed: Vec<LinkInputFromUpstream<T>>) {
        for u in removed {
            let link = u.data_reader.link();
            link.close();
            if let Some(peer) = u.peer.upgrade() {
                peer.detach_link(link.link_id());
            }
            tracing::debug!("[{}] -> [{}] disconnected ({})", link.writer(), self.identity, link.link_id());
        }
    }
}

impl<T: LinkPortMessage> AnyPort for LinkInputInner<T> {
    fn identity(&self) -> &PortIdentity {
        &self.identity
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn connected(&self) -> bool {
        self.state
            .lock()
            .router
            .upstream()
            .iter()
            .any(|u| u.data_reader.is_connected())
    }

    fn link_count(&self) -> usize {
        self.state
            .lock()
            .router
            .upstream()
            .iter()
            .filter(|u| u.data_reader.is_connected())
            .count()
    }

    fn peers(&self) -> Vec<PortIdentity> {
        self.state
            .lock()
            .router
            .upstream()
            .iter()
            .map(|u| u.data_reader.link().writer().clone())
            .collect()
    }

    fn has_peer(&self, peer: &PortId) -> bool {
        self.state.lock().router.has_peer(peer)
    }

    fn link_stats(&self) -> Vec<LinkStats> {
        self.state
            .lock()
            .router
            .upstream()
            .iter()
            .map(|u| u.data_reader.link().stats())
            .collect()
    }

    fn disconnect(&self) -> bool {
        let removed = self.state.lock().router.detach_all();
        let any = !removed.is_empty();
        self.release(removed);
        any
    }

    fn disconnect_peer(&self, peer: &PortId) -> bool {
        let removed = self.state.lock().router.detach_peer(peer);
        let any = !removed.is_empty();
        self.release(removed);
        any
    }

    fn default_policy(&self) -> Option<ConnPolicy> {
        Some(self.default_policy)
    }

    fn membership(&self) -> &PortMembership {
        &self.membership
    }

    fn replace_hook(&self, hook: Option<NewDataHook>) -> bool {
        let mut state = self.state.lock();
        for u in state.router.upstream() {
            u.data_reader.link().set_hook(hook.clone());
        }
        state.hook = hook;
        true
    }

    fn detach_link(&self, link_id: &LinkId) -> bool {
        let removed = self.state.lock().router.detach(link_id);
        removed.is_some()
    }

    fn connect_erased(
        self: Arc<Self>,
        reader: Arc<dyn AnyPort>,
        _policy: Option<ConnPolicy>,
    ) -> Result<LinkId> {
        Err(FlowError::DirectionMismatch(format!(
            "{} is an input and cannot write to {}",
            self.identity,
            reader.identity()
        )))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: LinkPortMessage> Drop for LinkInputInner<T> {
    fn drop(&mut self) {
        self.disconnect();
        self.membership.release();
    }
}

/// Input port.
///
/// Supports fan-in: each connected writer has its own link, and reads scan
/// them in connection order (see [`read`](Self::read)).
pub struct LinkInput<T: LinkPortMessage> {
    inner: Arc<LinkInputInner<T>>,
}

impl<T: LinkPortMessage> Clone for LinkInput<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: LinkPortMessage> LinkInput<T> {
    /// Create a new input port whose default link policy is `data`.
    pub fn new(port_name: &str) -> Self {
        Self::with_policy(port_name, ConnPolicy::default())
    }

    /// Create a new input port with the policy used when a connection does
    /// not name one.
    pub fn with_policy(port_name: &str, default_policy: ConnPolicy) -> Self {
        Self {
            inner: Arc::new(LinkInputInner::new(port_name, default_policy)),
        }
    }

    pub(crate) fn from_any(port: Arc<dyn AnyPort>) -> Option<Self> {
        port.into_any()
            .downcast::<LinkInputInner<T>>()
            .ok()
            .map(|inner| Self { inner })
    }

    pub(crate) fn inner(&self) -> &Arc<LinkInputInner<T>> {
        &self.inner
    }

    /// Read the next sample into `out`.
    ///
    /// Links are probed from the one that last produced data onward,
    /// wrapping around. `NewData` means `out` holds an unseen sample;
    /// `OldData` means nothing new arrived and `out` holds the last sample
    /// this port delivered; `NoData` leaves `out` untouched. With no links
    /// the result is always `NoData`.
    pub fn read(&self, out: &mut T) -> FlowStatus {
        self.inner.state.lock().router.read(out)
    }

    /// Like [`read`](Self::read), returning the sample instead.
    pub fn read_with_status(&self) -> (FlowStatus, Option<T>) {
        self.inner.state.lock().router.read_sample()
    }

    /// Read one link directly, outside the scan order.
    ///
    /// A drained buffer link reports `NoData`; a data link reports
    /// `OldData` with the value it already delivered. The scan cursor and
    /// the port's `OldData` cache are not touched. `None` if no link of
    /// this port has `link_id`.
    pub fn read_link(&self, link_id: &LinkId, out: &mut T) -> Option<FlowStatus> {
        self.inner.state.lock().router.read_link(link_id, out)
    }

    /// Discard everything buffered or cached without disconnecting.
    pub fn clear(&self) {
        self.inner.state.lock().router.clear();
    }

    /// Install or remove the hook fired when one of this port's links goes
    /// from empty to non-empty. Applies to existing and future links.
    pub fn set_new_data_hook(&self, hook: Option<NewDataHook>) {
        self.inner.replace_hook(hook);
    }

    pub fn default_policy(&self) -> ConnPolicy {
        self.inner.default_policy
    }

    pub fn disconnect(&self) -> bool {
        self.inner.disconnect()
    }

    /// Remove only the links from `peer`.
    pub fn disconnect_peer(&self, peer: &impl PortHandle) -> bool {
        self.inner.disconnect_peer(&peer.any_port().identity().id)
    }

    pub fn connected(&self) -> bool {
        self.inner.connected()
    }

    pub fn link_count(&self) -> usize {
        self.inner.link_count()
    }

    pub fn peers(&self) -> Vec<PortIdentity> {
        self.inner.peers()
    }

    pub fn link_stats(&self) -> Vec<LinkStats> {
        self.inner.link_stats()
    }

    /// Samples discarded on full buffers across all current links.
    pub fn dropped_samples(&self) -> u64 {
        self.inner
            .state
            .lock()
            .router
            .upstream()
            .iter()
            .map(|u| u.data_reader.link().dropped())
            .sum()
    }

    pub fn identity(&self) -> &PortIdentity {
        &self.inner.identity
    }

    pub fn port_name(&self) -> &str {
        &self.inner.identity.name
    }

    pub fn owner(&self) -> Option<String> {
        self.inner.owner()
    }
}

impl<T: LinkPortMessage> PortHandle for LinkInput<T> {
    fn any_port(&self) -> Arc<dyn AnyPort> {
        Arc::clone(&self.inner) as Arc<dyn AnyPort>
    }
}

impl<T: LinkPortMessage> std::fmt::Debug for LinkInput<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkInput")
            .field("identity", &self.inner.identity)
            .field("default_policy", &self.inner.default_policy)
            .field("links", &self.link_count())
            .finish()
    }
}

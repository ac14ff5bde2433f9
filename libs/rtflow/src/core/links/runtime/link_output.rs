// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkOutput - Output port.

use std::any::{Any, TypeId};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::link_input::LinkInputInner;
use super::link_instance::{LinkInstance, LinkStats};
use super::link_notifier::NewDataHook;
use super::link_output_data_writer::LinkOutputDataWriter;
use crate::core::error::{FlowError, Result};
use crate::core::links::graph::{ConnPolicy, LinkId};
use crate::core::links::link_factory;
use crate::core::links::traits::LinkPortMessage;
use crate::core::ports::{AnyPort, PortDirection, PortHandle, PortId, PortIdentity, PortMembership};

/// Binding between a LinkOutput and one downstream LinkInput.
struct LinkOutputToDownstream<T: LinkPortMessage> {
    data_writer: LinkOutputDataWriter<T>,
    peer: Weak<dyn AnyPort>,
}

impl<T: LinkPortMessage> LinkOutputToDownstream<T> {
    fn peer_id(&self) -> &PortId {
        &self.data_writer.link().reader().id
    }

    /// Close the link and tell the reader side to let go of it.
    fn release(self, from: &PortIdentity) {
        let link = self.data_writer.link();
        link.close();
        if let Some(peer) = self.peer.upgrade() {
            peer.detach_link(link.link_id());
        }
        tracing::debug!("[{}] -> [{}] disconnected ({})", from, link.reader(), link.link_id());
    }
}

struct LinkOutputState<T: LinkPortMessage> {
    downstream: Vec<LinkOutputToDownstream<T>>,
    last_written: Option<T>,
}

/// Shared state behind every [`LinkOutput`] handle.
pub struct LinkOutputInner<T: LinkPortMessage> {
    identity: PortIdentity,
    state: Mutex<LinkOutputState<T>>,
    membership: PortMembership,
}

impl<T: LinkPortMessage> LinkOutputInner<T> {
    fn new(port_name: &str) -> Self {
        Self {
            identity: PortIdentity::new(port_name, PortDirection::Output),
            state: Mutex::new(LinkOutputState {
                downstream: Vec::new(),
                last_written: None,
            }),
            membership: PortMembership::default(),
        }
    }

    /// Add the writer end of a freshly created link. With `init_sample` the
    /// last written value, if any, is delivered into it right away.
    pub(crate) fn attach_downstream(
        &self,
        mut data_writer: LinkOutputDataWriter<T>,
        peer: Weak<dyn AnyPort>,
        init_sample: bool,
    ) -> Result<()> {
        let due = {
            let mut state = self.state.lock();
            let reader = data_writer.link().reader();

            if state.downstream.iter().any(|d| d.peer_id() == &reader.id) {
                return Err(FlowError::LinkAlreadyExists(format!(
                    "{} -> {}",
                    self.identity, reader
                )));
            }
            if !data_writer.is_connected() {
                return Err(FlowError::LinkNotFound(format!(
                    "{} closed while connecting",
                    data_writer.link_id()
                )));
            }

            let mut due = None;
            if init_sample {
                if let Some(value) = &state.last_written {
                    if data_writer.write(value.clone()).notify {
                        due = Some(Arc::clone(data_writer.link()));
                    }
                }
            }
            state
                .downstream
                .push(LinkOutputToDownstream { data_writer, peer });
            due
        };
        if let Some(link) = due {
            link.notify_new_data();
        }
        Ok(())
    }

    /// Fan `value` out to every link. Hooks fire after the port lock is
    /// released so a callback may reconnect either end.
    fn write(&self, value: T) {
        let due: Vec<Arc<LinkInstance>> = {
            let mut state = self.state.lock();
            let state = &mut *state;
            let mut due = Vec::new();
            for d in state.downstream.iter_mut() {
                if d.data_writer.write(value.clone()).notify {
                    due.push(Arc::clone(d.data_writer.link()));
                }
            }
            state.last_written = Some(value);
            due
        };
        for link in due {
            link.notify_new_data();
        }
    }

    fn last_written_value(&self) -> Option<T> {
        self.state.lock().last_written.clone()
    }
}

impl<T: LinkPortMessage> AnyPort for LinkOutputInner<T> {
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
            .downstream
            .iter()
            .any(|d| d.data_writer.is_connected())
    }

    fn link_count(&self) -> usize {
        self.state
            .lock()
            .downstream
            .iter()
            .filter(|d| d.data_writer.is_connected())
            .count()
    }

    fn peers(&self) -> Vec<PortIdentity> {
        self.state
            .lock()
            .downstream
            .iter()
            .map(|d| d.data_writer.link().reader().clone())
            .collect()
    }

    fn has_peer(&self, peer: &PortId) -> bool {
        self.state.lock().downstream.iter().any(|d| d.peer_id() == peer)
    }

    fn link_stats(&self) -> Vec<LinkStats> {
        self.state
            .lock()
            .downstream
            .iter()
            .map(|d| d.data_writer.link().stats())
            .collect()
    }

    fn disconnect(&self) -> bool {
        let removed = std::mem::take(&mut self.state.lock().downstream);
        let any = !removed.is_empty();
        for d in removed {
            d.release(&self.identity);
        }
        any
    }

    fn disconnect_peer(&self, peer: &PortId) -> bool {
        let removed: Vec<_> = {
            let mut state = self.state.lock();
            let (removed, kept) = std::mem::take(&mut state.downstream)
                .into_iter()
                .partition(|d| d.peer_id() == peer);
            state.downstream = kept;
            removed
        };
        let any = !removed.is_empty();
        for d in removed {
            d.release(&self.identity);
        }
        any
    }

    fn default_policy(&self) -> Option<ConnPolicy> {
        None
    }

    fn membership(&self) -> &PortMembership {
        &self.membership
    }

    fn replace_hook(&self, _hook: Option<NewDataHook>) -> bool {
        false
    }

    fn detach_link(&self, link_id: &LinkId) -> bool {
        let removed = {
            let mut state = self.state.lock();
            let idx = state
                .downstream
                .iter()
                .position(|d| d.data_writer.link_id() == link_id);
            idx.map(|idx| state.downstream.remove(idx))
        };
        removed.is_some()
    }

    fn connect_erased(
        self: Arc<Self>,
        reader: Arc<dyn AnyPort>,
        policy: Option<ConnPolicy>,
    ) -> Result<LinkId> {
        let reader_identity = reader.identity().clone();
        if reader_identity.direction != self.identity.direction.opposite() {
            return Err(FlowError::DirectionMismatch(format!(
                "{} cannot be read from by {}",
                self.identity, reader_identity
            )));
        }
        let reader_type = reader.value_type_name();
        let reader = reader
            .into_any()
            .downcast::<LinkInputInner<T>>()
            .map_err(|_| {
                FlowError::TypeMismatch(format!(
                    "{} carries {} but {} carries {}",
                    self.identity,
                    std::any::type_name::<T>(),
                    reader_identity,
                    reader_type
                ))
            })?;
        link_factory::connect_inner(&self, &reader, policy)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: LinkPortMessage> Drop for LinkOutputInner<T> {
    fn drop(&mut self) {
        self.disconnect();
        self.membership.release();
    }
}

/// Output port.
///
/// Supports fan-out: every connected reader gets its own link. Writes with
/// no connection still update the last written value.
pub struct LinkOutput<T: LinkPortMessage> {
    inner: Arc<LinkOutputInner<T>>,
}

impl<T: LinkPortMessage> Clone for LinkOutput<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: LinkPortMessage> LinkOutput<T> {
    /// Create a new output port.
    pub fn new(port_name: &str) -> Self {
        Self {
            inner: Arc::new(LinkOutputInner::new(port_name)),
        }
    }

    pub(crate) fn from_any(port: Arc<dyn AnyPort>) -> Option<Self> {
        port.into_any()
            .downcast::<LinkOutputInner<T>>()
            .ok()
            .map(|inner| Self { inner })
    }

    pub(crate) fn inner(&self) -> &Arc<LinkOutputInner<T>> {
        &self.inner
    }

    /// Write data to all downstream links (fan-out).
    pub fn write(&self, value: T) {
        self.inner.write(value);
    }

    /// Most recent value passed to [`write`](Self::write), connected or not.
    pub fn last_written_value(&self) -> Option<T> {
        self.inner.last_written_value()
    }

    /// Connect to `reader` using the reader's default policy.
    pub fn connect_to(&self, reader: &super::LinkInput<T>) -> Result<LinkId> {
        link_factory::create_connection(self, reader, None)
    }

    pub fn connect_to_with(&self, reader: &super::LinkInput<T>, policy: ConnPolicy) -> Result<LinkId> {
        link_factory::create_connection(self, reader, Some(policy))
    }

    pub fn disconnect(&self) -> bool {
        self.inner.disconnect()
    }

    /// Remove only the links to `peer`.
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
            .downstream
            .iter()
            .map(|d| d.data_writer.link().dropped())
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

impl<T: LinkPortMessage> PortHandle for LinkOutput<T> {
    fn any_port(&self) -> Arc<dyn AnyPort> {
        Arc::clone(&self.inner) as Arc<dyn AnyPort>
    }
}

impl<T: LinkPortMessage> std::fmt::Debug for LinkOutput<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkOutput")
            .field("identity", &self.inner.identity)
            .field("links", &self.link_count())
            .finish()
    }
}

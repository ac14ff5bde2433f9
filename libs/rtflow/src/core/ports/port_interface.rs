// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! PortInterface - named table of the ports a component exposes.
//!
//! The interface never owns port lifetimes. It keeps weak references, and
//! each port records which interface lists it so a port can belong to at
//! most one interface at a time. Membership and connectivity are separate:
//! adding, removing or dropping an interface never touches links.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::any_port::{same_port, AnyPort, PortHandle};
use super::port_id::PortDirection;
use super::port_membership::MembershipRecord;
use crate::core::error::{FlowError, Result};
use crate::core::links::runtime::{LinkInput, LinkOutput, NewDataHook};
use crate::core::links::traits::LinkPortMessage;

struct PortEntry {
    port: Weak<dyn AnyPort>,
    /// Added through `add_event_port`: the interface installed the port's
    /// hook and takes it away again on removal.
    event: bool,
}

pub(crate) struct PortInterfaceInner {
    name: Arc<str>,
    ports: Mutex<BTreeMap<String, PortEntry>>,
}

impl PortInterfaceInner {
    /// Remove `port_name` if the port registered under it is gone.
    pub(crate) fn forget_dropped(&self, port_name: &str) {
        let mut ports = self.ports.lock();
        if ports
            .get(port_name)
            .is_some_and(|entry| entry.port.strong_count() == 0)
        {
            ports.remove(port_name);
            tracing::debug!("[{}] dropped port '{}' removed", self.name, port_name);
        }
    }

    /// Remove `port_name` if it is registered to exactly `port`.
    fn forget_port(&self, port_name: &str, port: &Arc<dyn AnyPort>) {
        let mut ports = self.ports.lock();
        let registered = ports
            .get(port_name)
            .and_then(|entry| entry.port.upgrade())
            .is_some_and(|existing| same_port(&existing, port));
        if registered {
            ports.remove(port_name);
        }
    }

    fn live_ports(&self) -> Vec<(String, Arc<dyn AnyPort>)> {
        self.ports
            .lock()
            .iter()
            .filter_map(|(name, entry)| entry.port.upgrade().map(|port| (name.clone(), port)))
            .collect()
    }
}

impl Drop for PortInterfaceInner {
    fn drop(&mut self) {
        let this: *const PortInterfaceInner = self;
        for entry in self.ports.get_mut().values() {
            if let Some(port) = entry.port.upgrade() {
                port.membership().clear_if(this);
            }
        }
    }
}

/// Named, single-owner registry of ports.
#[derive(Clone)]
pub struct PortInterface {
    inner: Arc<PortInterfaceInner>,
}

impl PortInterface {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Arc::new(PortInterfaceInner {
                name: Arc::from(name),
                ports: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Register `port` under `name`.
    ///
    /// Re-adding the same port under the same name is a no-op. A name held
    /// by a different live port is a [`FlowError::PortNameCollision`]. A
    /// port owned by another interface is taken over from it.
    pub fn add_port(&self, name: &str, port: &impl PortHandle) -> Result<()> {
        self.register(name, port.any_port(), false)
    }

    /// Register an input port that signals: `hook` is installed on the port
    /// and fires for every empty to non-empty transition of its links.
    /// [`remove_port`](Self::remove_port) takes the hook away again. Ports
    /// added with [`add_port`](Self::add_port) keep whatever hook they have.
    pub fn add_event_port<T: LinkPortMessage>(
        &self,
        name: &str,
        port: &LinkInput<T>,
        hook: NewDataHook,
    ) -> Result<()> {
        self.register(name, port.any_port(), true)?;
        port.set_new_data_hook(Some(hook));
        Ok(())
    }

    fn register(&self, name: &str, port: Arc<dyn AnyPort>, event: bool) -> Result<()> {
        {
            let mut ports = self.inner.ports.lock();
            if let Some(entry) = ports.get_mut(name) {
                if let Some(existing) = entry.port.upgrade() {
                    if same_port(&existing, &port) {
                        entry.event |= event;
                        return Ok(());
                    }
                    return Err(FlowError::PortNameCollision(format!(
                        "'{}' already holds a different port in interface '{}'",
                        name, self.inner.name
                    )));
                }
            }
            ports.insert(
                name.to_string(),
                PortEntry {
                    port: Arc::downgrade(&port),
                    event,
                },
            );
        }

        let previous = port.membership().set(MembershipRecord {
            interface: Arc::downgrade(&self.inner),
            interface_name: Arc::clone(&self.inner.name),
            port_name: name.to_string(),
        });

        if let Some(previous) = previous {
            if previous.is_interface(Arc::as_ptr(&self.inner)) {
                self.inner.forget_port(&previous.port_name, &port);
            } else {
                tracing::warn!(
                    "[{}] port {} taken over from interface '{}'",
                    self.inner.name,
                    port.identity(),
                    previous.interface_name
                );
                if let Some(old) = previous.interface.upgrade() {
                    old.forget_port(&previous.port_name, &port);
                }
            }
        }

        tracing::info!("[{}] added port '{}' ({})", self.inner.name, name, port.identity());
        Ok(())
    }

    /// Unregister `name`. Links of the port are left intact; an event
    /// port loses the hook it was added with.
    pub fn remove_port(&self, name: &str) -> bool {
        let removed = self.inner.ports.lock().remove(name);
        let Some(entry) = removed else {
            return false;
        };
        if let Some(port) = entry.port.upgrade() {
            port.membership().clear_if(Arc::as_ptr(&self.inner));
            if entry.event {
                port.replace_hook(None);
            }
        }
        tracing::info!("[{}] removed port '{}'", self.inner.name, name);
        true
    }

    pub fn port(&self, name: &str) -> Option<Arc<dyn AnyPort>> {
        self.inner
            .ports
            .lock()
            .get(name)
            .and_then(|entry| entry.port.upgrade())
    }

    /// Typed lookup of an output port. `None` if absent or of another type.
    pub fn output<T: LinkPortMessage>(&self, name: &str) -> Option<LinkOutput<T>> {
        LinkOutput::from_any(self.port(name)?)
    }

    /// Typed lookup of an input port. `None` if absent or of another type.
    pub fn input<T: LinkPortMessage>(&self, name: &str) -> Option<LinkInput<T>> {
        LinkInput::from_any(self.port(name)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.port(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.inner
            .live_ports()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.live_ports().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Connect every pair of same-named ports with opposite directions
    /// between `self` and `other`, output to input, using the input's
    /// default policy. Pairs that are already linked are skipped.
    ///
    /// Every pair is type-checked before any link is made, so a
    /// [`FlowError::TypeMismatch`] leaves both interfaces unconnected.
    ///
    /// Returns the number of links created.
    pub fn connect_ports(&self, other: &PortInterface) -> Result<usize> {
        let theirs: BTreeMap<String, Arc<dyn AnyPort>> =
            other.inner.live_ports().into_iter().collect();

        let mut pairs = Vec::new();
        for (name, ours) in self.inner.live_ports() {
            let Some(their) = theirs.get(&name) else {
                continue;
            };
            let direction = ours.identity().direction;
            if their.identity().direction != direction.opposite() {
                tracing::debug!(
                    "[{}] '{}' is {} on both sides, not connecting",
                    self.inner.name,
                    name,
                    direction
                );
                continue;
            }
            let (writer, reader) = match direction {
                PortDirection::Output => (ours, Arc::clone(their)),
                PortDirection::Input => (Arc::clone(their), ours),
            };
            if writer.value_type_id() != reader.value_type_id() {
                return Err(FlowError::TypeMismatch(format!(
                    "'{}': {} carries {} but {} carries {}",
                    name,
                    writer.identity(),
                    writer.value_type_name(),
                    reader.identity(),
                    reader.value_type_name()
                )));
            }
            if writer.has_peer(&reader.identity().id) {
                tracing::debug!("[{}] '{}' already connected", self.inner.name, name);
                continue;
            }
            pairs.push((writer, reader));
        }

        let mut created = 0;
        for (writer, reader) in pairs {
            writer.connect_erased(reader, None)?;
            created += 1;
        }

        tracing::debug!(
            "[{}] <-> [{}] connected {} port(s)",
            self.inner.name,
            other.inner.name,
            created
        );
        Ok(created)
    }
}

impl std::fmt::Debug for PortInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortInterface")
            .field("name", &self.inner.name)
            .field("ports", &self.names())
            .finish()
    }
}

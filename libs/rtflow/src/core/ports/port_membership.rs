// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::port_interface::PortInterfaceInner;

pub(crate) struct MembershipRecord {
    pub(crate) interface: Weak<PortInterfaceInner>,
    pub(crate) interface_name: Arc<str>,
    /// Name the port is registered under in that interface.
    pub(crate) port_name: String,
}

impl MembershipRecord {
    pub(crate) fn is_interface(&self, interface: *const PortInterfaceInner) -> bool {
        std::ptr::eq(self.interface.as_ptr(), interface)
    }
}

/// Which interface, if any, currently lists a port.
///
/// The interface only holds a weak reference to the port, and the port only
/// a weak reference to the interface; either can be dropped first.
#[derive(Default)]
pub struct PortMembership {
    owner: Mutex<Option<MembershipRecord>>,
}

impl PortMembership {
    pub(crate) fn owner_name(&self) -> Option<String> {
        self.owner
            .lock()
            .as_ref()
            .map(|record| record.interface_name.to_string())
    }

    /// Replace the membership, returning the previous one.
    pub(crate) fn set(&self, record: MembershipRecord) -> Option<MembershipRecord> {
        self.owner.lock().replace(record)
    }

    /// Clear the membership if it points at `interface`.
    pub(crate) fn clear_if(&self, interface: *const PortInterfaceInner) -> bool {
        let mut owner = self.owner.lock();
        match owner.as_ref() {
            Some(record) if record.is_interface(interface) => {
                *owner = None;
                true
            }
            _ => false,
        }
    }

    /// Remove the port from its interface while the port is being dropped.
    pub(crate) fn release(&self) {
        let record = self.owner.lock().take();
        if let Some(record) = record {
            if let Some(interface) = record.interface.upgrade() {
                interface.forget_dropped(&record.port_name);
            }
        }
    }
}

impl std::fmt::Debug for PortMembership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortMembership")
            .field("owner", &self.owner_name())
            .finish()
    }
}

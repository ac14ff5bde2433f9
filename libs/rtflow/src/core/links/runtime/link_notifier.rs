// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! New-data notification hooks.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};

use super::link_wakeup::LinkWakeupEvent;
use crate::core::ports::PortIdentity;

/// Callback invoked with the input port that received new data.
pub type NewDataCallback = Arc<dyn Fn(&PortIdentity) + Send + Sync>;

/// Handler fired on the writer's thread when a link of an input port goes
/// from empty to non-empty.
///
/// A `Callback` runs synchronously inside the writer's `write` call, after
/// the writing port has released its lock, so it may connect or disconnect
/// either port. It should return quickly: the writer waits on it. A `Wakeup`
/// queue never blocks the writer: when the queue is full the wakeup is
/// dropped and counted on the link.
#[derive(Clone)]
pub enum NewDataHook {
    Callback(NewDataCallback),
    Wakeup(Sender<LinkWakeupEvent>),
}

impl NewDataHook {
    pub fn callback(f: impl Fn(&PortIdentity) + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }

    pub fn wakeup(sender: Sender<LinkWakeupEvent>) -> Self {
        Self::Wakeup(sender)
    }

    /// Fire the hook. Returns `false` if a wakeup could not be queued.
    pub(crate) fn fire(&self, port: &PortIdentity) -> bool {
        match self {
            Self::Callback(f) => {
                f(port);
                true
            }
            Self::Wakeup(sender) => {
                match sender.try_send(LinkWakeupEvent::DataAvailable(port.clone())) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("[{}] wakeup queue full, dropping wakeup", port);
                        false
                    }
                    // Scheduler went away; nothing left to wake.
                    Err(TrySendError::Disconnected(_)) => true,
                }
            }
        }
    }
}

impl fmt::Debug for NewDataHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("NewDataHook::Callback"),
            Self::Wakeup(_) => f.write_str("NewDataHook::Wakeup"),
        }
    }
}

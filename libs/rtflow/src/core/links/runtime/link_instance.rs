// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkInstance - Runtime materialization of one writer/reader connection.
//!
//! The typed storage halves live inside the two ports. What both ends share
//! is this untyped record: identity, policy, liveness, the reader's
//! notification hook and the link counters.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::link_input_data_reader::LinkInputDataReader;
use super::link_notifier::NewDataHook;
use super::link_output_data_writer::LinkOutputDataWriter;
use super::link_storage::split_storage;
use crate::core::links::graph::{ConnPolicy, LinkId};
use crate::core::links::traits::LinkPortMessage;
use crate::core::ports::PortIdentity;

/// Counters for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub link_id: LinkId,
    pub writer: PortIdentity,
    pub reader: PortIdentity,
    pub policy: ConnPolicy,
    /// Samples stored into the link.
    pub accepted: u64,
    /// Samples discarded because the buffer was full.
    pub dropped: u64,
    /// Wakeups that could not be queued.
    pub missed_wakeups: u64,
}

/// State shared by both endpoints of a link.
pub(crate) struct LinkInstance {
    link_id: LinkId,
    policy: ConnPolicy,
    writer: PortIdentity,
    reader: PortIdentity,
    alive: AtomicBool,
    hook: RwLock<Option<NewDataHook>>,
    accepted: AtomicU64,
    dropped: AtomicU64,
    missed_wakeups: AtomicU64,
}

impl LinkInstance {
    fn new(link_id: LinkId, policy: ConnPolicy, writer: PortIdentity, reader: PortIdentity) -> Self {
        Self {
            link_id,
            policy,
            writer,
            reader,
            alive: AtomicBool::new(true),
            hook: RwLock::new(None),
            accepted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            missed_wakeups: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn link_id(&self) -> &LinkId {
        &self.link_id
    }

    #[inline]
    pub fn writer(&self) -> &PortIdentity {
        &self.writer
    }

    #[inline]
    pub fn reader(&self) -> &PortIdentity {
        &self.reader
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark the link dead. Returns `true` for the call that closed it.
    pub(crate) fn close(&self) -> bool {
        self.alive.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn set_hook(&self, hook: Option<NewDataHook>) {
        *self.hook.write() = hook;
    }

    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Fire the reader's hook for an empty to non-empty transition. A link
    /// closed since the write stays quiet.
    pub(crate) fn notify_new_data(&self) {
        if self.policy.is_pull() || !self.is_alive() {
            return;
        }
        let hook = self.hook.read().clone();
        if let Some(hook) = hook {
            if !hook.fire(&self.reader) {
                self.missed_wakeups.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> LinkStats {
        LinkStats {
            link_id: self.link_id.clone(),
            writer: self.writer.clone(),
            reader: self.reader.clone(),
            policy: self.policy,
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            missed_wakeups: self.missed_wakeups.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for LinkInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkInstance")
            .field("link_id", &self.link_id)
            .field("writer", &self.writer)
            .field("reader", &self.reader)
            .field("policy", &self.policy)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Allocate a link for `policy` and hand out its two endpoints.
pub(crate) fn create_link_channel<T: LinkPortMessage>(
    policy: ConnPolicy,
    writer: PortIdentity,
    reader: PortIdentity,
) -> (
    Arc<LinkInstance>,
    LinkOutputDataWriter<T>,
    LinkInputDataReader<T>,
) {
    let link = Arc::new(LinkInstance::new(LinkId::new(), policy, writer, reader));
    let (write_half, read_half) = split_storage::<T>(&policy);
    (
        Arc::clone(&link),
        LinkOutputDataWriter::new(Arc::clone(&link), write_half),
        LinkInputDataReader::new(link, read_half),
    )
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkOutputDataWriter - Writer endpoint of a link, owned by a LinkOutput.

use std::sync::Arc;

use super::link_instance::LinkInstance;
use super::link_storage::{LinkWriteHalf, WriteOutcome};
use crate::core::links::graph::LinkId;
use crate::core::links::traits::LinkPortMessage;

/// Result of [`LinkOutputDataWriter::write`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StoreResult {
    pub accepted: bool,
    /// The link went from empty to non-empty; the reader's hook is due.
    pub notify: bool,
}

/// Writes samples into one link.
///
/// Once the link is closed from either side, writes are dropped.
pub(crate) struct LinkOutputDataWriter<T: LinkPortMessage> {
    link: Arc<LinkInstance>,
    half: LinkWriteHalf<T>,
}

impl<T: LinkPortMessage> LinkOutputDataWriter<T> {
    pub(super) fn new(link: Arc<LinkInstance>, half: LinkWriteHalf<T>) -> Self {
        Self { link, half }
    }

    /// Write to the link.
    ///
    /// Nothing is stored if the link is closed or the buffer is full
    /// (drop-newest). The reader's hook is not fired here: ports write under
    /// their own lock and call [`LinkInstance::notify_new_data`] for links
    /// flagged `notify` once that lock is released.
    pub(crate) fn write(&mut self, value: T) -> StoreResult {
        if !self.link.is_alive() {
            return StoreResult::default();
        }
        match self.half.write(value) {
            WriteOutcome::Stored { became_non_empty } => {
                self.link.record_accepted();
                StoreResult {
                    accepted: true,
                    notify: became_non_empty,
                }
            }
            WriteOutcome::Dropped => {
                self.link.record_dropped();
                tracing::trace!("Link {}: buffer full, dropping sample", self.link.link_id());
                StoreResult::default()
            }
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.link.is_alive()
    }

    #[inline]
    pub fn link_id(&self) -> &LinkId {
        self.link.link_id()
    }

    #[inline]
    pub fn link(&self) -> &Arc<LinkInstance> {
        &self.link
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkInputDataReader - Reader endpoint of a link, owned by a LinkInput.

use std::sync::Arc;

use super::link_instance::LinkInstance;
use super::link_storage::LinkReadHalf;
use crate::core::links::graph::LinkId;
use crate::core::links::traits::{FlowStatus, LinkPortMessage};

/// Reads samples out of one link.
pub(crate) struct LinkInputDataReader<T: LinkPortMessage> {
    link: Arc<LinkInstance>,
    half: LinkReadHalf<T>,
}

impl<T: LinkPortMessage> LinkInputDataReader<T> {
    pub(super) fn new(link: Arc<LinkInstance>, half: LinkReadHalf<T>) -> Self {
        Self { link, half }
    }

    /// Take the next unseen sample, if any.
    #[inline]
    pub fn take_new(&mut self) -> Option<T> {
        self.half.take_new()
    }

    /// Link-level read. A drained buffer reports `NoData`; a data slot
    /// reports `OldData` for a value it already delivered.
    pub fn read(&mut self, out: &mut T) -> FlowStatus {
        self.half.read(out)
    }

    pub fn clear(&mut self) {
        self.half.clear();
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

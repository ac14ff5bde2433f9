// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Fan-in routing for a LinkInput.
//!
//! Upstream links are kept in connection order. A read probes them starting
//! at the scan cursor and parks the cursor on the link that produced data,
//! so one source is drained before the next one is looked at.

use std::sync::Weak;

use super::link_input_data_reader::LinkInputDataReader;
use crate::core::links::graph::LinkId;
use crate::core::links::traits::{FlowStatus, LinkPortMessage};
use crate::core::ports::{AnyPort, PortId};

/// Binding between a LinkInput and one upstream LinkOutput.
pub(crate) struct LinkInputFromUpstream<T: LinkPortMessage> {
    pub(crate) data_reader: LinkInputDataReader<T>,
    pub(crate) peer: Weak<dyn AnyPort>,
}

impl<T: LinkPortMessage> LinkInputFromUpstream<T> {
    pub(crate) fn new(data_reader: LinkInputDataReader<T>, peer: Weak<dyn AnyPort>) -> Self {
        Self { data_reader, peer }
    }

    pub(crate) fn link_id(&self) -> &LinkId {
        self.data_reader.link_id()
    }

    pub(crate) fn peer_id(&self) -> &PortId {
        &self.data_reader.link().writer().id
    }
}

pub(crate) struct LinkInputRouter<T: LinkPortMessage> {
    upstream: Vec<LinkInputFromUpstream<T>>,
    cursor: usize,
    last_value: Option<T>,
}

impl<T: LinkPortMessage> Default for LinkInputRouter<T> {
    fn default() -> Self {
        Self {
            upstream: Vec::new(),
            cursor: 0,
            last_value: None,
        }
    }
}

impl<T: LinkPortMessage> LinkInputRouter<T> {
    pub(crate) fn upstream(&self) -> &[LinkInputFromUpstream<T>] {
        &self.upstream
    }

    pub(crate) fn attach(&mut self, entry: LinkInputFromUpstream<T>) {
        self.upstream.push(entry);
    }

    pub(crate) fn has_peer(&self, peer: &PortId) -> bool {
        self.upstream.iter().any(|u| u.peer_id() == peer)
    }

    /// Remove one link. The cursor keeps pointing at the same link where
    /// that link survives.
    pub(crate) fn detach(&mut self, link_id: &LinkId) -> Option<LinkInputFromUpstream<T>> {
        let idx = self.upstream.iter().position(|u| u.link_id() == link_id)?;
        let entry = self.upstream.remove(idx);
        if idx < self.cursor {
            self.cursor -= 1;
        }
        self.settle();
        Some(entry)
    }

    /// Remove every link coming from `peer`.
    pub(crate) fn detach_peer(&mut self, peer: &PortId) -> Vec<LinkInputFromUpstream<T>> {
        let ids: Vec<LinkId> = self
            .upstream
            .iter()
            .filter(|u| u.peer_id() == peer)
            .map(|u| u.link_id().clone())
            .collect();
        ids.iter().filter_map(|id| self.detach(id)).collect()
    }

    pub(crate) fn detach_all(&mut self) -> Vec<LinkInputFromUpstream<T>> {
        let removed = std::mem::take(&mut self.upstream);
        self.settle();
        removed
    }

    fn settle(&mut self) {
        if self.upstream.is_empty() {
            self.cursor = 0;
            self.last_value = None;
        } else if self.cursor >= self.upstream.len() {
            self.cursor = 0;
        }
    }

    /// Fetch the next sample for this port together with its status.
    pub(crate) fn read_sample(&mut self) -> (FlowStatus, Option<T>) {
        let count = self.upstream.len();
        if count == 0 {
            return (FlowStatus::NoData, None);
        }

        for step in 0..count {
            let idx = (self.cursor + step) % count;
            if let Some(value) = self.upstream[idx].data_reader.take_new() {
                self.cursor = idx;
                self.last_value = Some(value.clone());
                return (FlowStatus::NewData, Some(value));
            }
        }

        match &self.last_value {
            Some(value) => (FlowStatus::OldData, Some(value.clone())),
            None => (FlowStatus::NoData, None),
        }
    }

    pub(crate) fn read(&mut self, out: &mut T) -> FlowStatus {
        let (status, value) = self.read_sample();
        if let Some(value) = value {
            *out = value;
        }
        status
    }

    /// Link-level read of one upstream link, leaving the cursor and the
    /// port cache alone.
    pub(crate) fn read_link(&mut self, link_id: &LinkId, out: &mut T) -> Option<FlowStatus> {
        let entry = self.upstream.iter_mut().find(|u| u.link_id() == link_id)?;
        Some(entry.data_reader.read(out))
    }

    pub(crate) fn clear(&mut self) {
        for u in &mut self.upstream {
            u.data_reader.clear();
        }
        self.cursor = 0;
        self.last_value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::link_instance::create_link_channel;
    use super::super::link_output::LinkOutputInner;
    use super::super::link_output_data_writer::LinkOutputDataWriter;
    use super::*;
    use crate::core::links::graph::ConnPolicy;
    use crate::core::ports::{PortDirection, PortIdentity};

    fn dangling() -> Weak<dyn AnyPort> {
        Weak::<LinkOutputInner<i32>>::new()
    }

    fn link(
        router: &mut LinkInputRouter<i32>,
        reader: &PortIdentity,
        name: &str,
    ) -> LinkOutputDataWriter<i32> {
        let writer = PortIdentity::new(name, PortDirection::Output);
        let (_link, w, r) = create_link_channel::<i32>(ConnPolicy::buffer(4), writer, reader.clone());
        router.attach(LinkInputFromUpstream::new(r, dangling()));
        w
    }

    fn read(router: &mut LinkInputRouter<i32>) -> (FlowStatus, i32) {
        let mut out = 0;
        let status = router.read(&mut out);
        (status, out)
    }

    #[test]
    fn test_sticky_cursor_drains_current_link() {
        let reader = PortIdentity::new("r", PortDirection::Input);
        let mut router = LinkInputRouter::default();
        let mut a = link(&mut router, &reader, "a");
        let mut b = link(&mut router, &reader, "b");

        b.write(100);
        a.write(1);
        a.write(2);

        assert_eq!(read(&mut router), (FlowStatus::NewData, 1));
        assert_eq!(read(&mut router), (FlowStatus::NewData, 2));
        assert_eq!(read(&mut router), (FlowStatus::NewData, 100));

        // Parked on b; a's new sample is only seen once b is empty.
        a.write(3);
        b.write(101);
        assert_eq!(read(&mut router), (FlowStatus::NewData, 101));
        assert_eq!(read(&mut router), (FlowStatus::NewData, 3));
        assert_eq!(read(&mut router), (FlowStatus::OldData, 3));
    }

    #[test]
    fn test_detach_adjusts_cursor() {
        let reader = PortIdentity::new("r", PortDirection::Input);
        let mut router = LinkInputRouter::default();
        let _a = link(&mut router, &reader, "a");
        let _b = link(&mut router, &reader, "b");
        let mut c = link(&mut router, &reader, "c");

        c.write(5);
        c.write(6);
        assert_eq!(read(&mut router), (FlowStatus::NewData, 5));
        assert_eq!(router.cursor, 2);

        let a_id = router.upstream()[0].link_id().clone();
        assert!(router.detach(&a_id).is_some());
        assert_eq!(router.cursor, 1);
        assert_eq!(read(&mut router), (FlowStatus::NewData, 6));

        let c_id = router.upstream()[1].link_id().clone();
        assert!(router.detach(&c_id).is_some());
        assert_eq!(router.cursor, 0);
        assert!(router.detach(&c_id).is_none());
    }

    #[test]
    fn test_no_links_forgets_history() {
        let reader = PortIdentity::new("r", PortDirection::Input);
        let mut router = LinkInputRouter::default();
        let mut a = link(&mut router, &reader, "a");
        a.write(9);
        assert_eq!(read(&mut router), (FlowStatus::NewData, 9));
        assert_eq!(read(&mut router), (FlowStatus::OldData, 9));

        assert_eq!(router.detach_all().len(), 1);
        assert_eq!(read(&mut router).0, FlowStatus::NoData);
    }

    #[test]
    fn test_clear_resets_cache() {
        let reader = PortIdentity::new("r", PortDirection::Input);
        let mut router = LinkInputRouter::default();
        let mut a = link(&mut router, &reader, "a");
        a.write(1);
        a.write(2);
        assert_eq!(read(&mut router), (FlowStatus::NewData, 1));
        router.clear();
        assert_eq!(read(&mut router).0, FlowStatus::NoData);
    }
}

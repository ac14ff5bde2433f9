// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link storage and the two endpoint halves that access it.
//!
//! A link's storage is split into a write half (owned by the output port)
//! and a read half (owned by the input port). Locked links share one
//! mutex-guarded store; lock-free links use an `rtrb` ring (buffer kind)
//! or an `arc_swap` slot (data kind), each touched by exactly one producer
//! and one consumer.

use std::collections::VecDeque;
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::core::links::graph::{BufferPolicy, ConnPolicy, LockPolicy};
use crate::core::links::traits::{FlowStatus, LinkPortMessage};

/// Outcome of writing one sample into a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    /// Sample stored. `became_non_empty` is set when the reader had nothing
    /// unread before this write.
    Stored { became_non_empty: bool },
    /// Buffer full; the sample was discarded.
    Dropped,
}

/// Mutex-guarded storage shared by both halves of a locked link.
pub(crate) enum LockedStore<T> {
    Data { value: Option<T>, fresh: bool },
    Buffer { queue: VecDeque<T>, capacity: usize },
}

impl<T: LinkPortMessage> LockedStore<T> {
    fn new(policy: &ConnPolicy) -> Self {
        match policy.kind() {
            BufferPolicy::Data => Self::Data {
                value: None,
                fresh: false,
            },
            BufferPolicy::Buffer => Self::Buffer {
                queue: VecDeque::with_capacity(policy.capacity()),
                capacity: policy.capacity(),
            },
        }
    }

    fn push(&mut self, sample: T) -> WriteOutcome {
        match self {
            Self::Data { value, fresh } => {
                let became_non_empty = !*fresh;
                *value = Some(sample);
                *fresh = true;
                WriteOutcome::Stored { became_non_empty }
            }
            Self::Buffer { queue, capacity } => {
                if queue.len() >= *capacity {
                    return WriteOutcome::Dropped;
                }
                queue.push_back(sample);
                WriteOutcome::Stored {
                    became_non_empty: queue.len() == 1,
                }
            }
        }
    }

    fn take_new(&mut self) -> Option<T> {
        match self {
            Self::Data { value, fresh } => {
                if !*fresh {
                    return None;
                }
                *fresh = false;
                value.clone()
            }
            Self::Buffer { queue, .. } => queue.pop_front(),
        }
    }

    fn peek_old(&self) -> Option<T> {
        match self {
            Self::Data { value, .. } => value.clone(),
            Self::Buffer { .. } => None,
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Data { value, fresh } => {
                *value = None;
                *fresh = false;
            }
            Self::Buffer { queue, .. } => queue.clear(),
        }
    }
}

struct StampedSample<T> {
    seq: u64,
    value: T,
}

/// Lock-free single slot. The writer publishes stamped samples; the reader
/// records the stamp it last delivered so the writer can tell whether the
/// reader was caught up.
pub(crate) struct LockFreeSlot<T> {
    current: ArcSwapOption<StampedSample<T>>,
    delivered: AtomicU64,
}

impl<T> LockFreeSlot<T> {
    fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            delivered: AtomicU64::new(0),
        }
    }
}

/// Writer-side access to a link's storage.
pub(crate) enum LinkWriteHalf<T> {
    Locked(Arc<Mutex<LockedStore<T>>>),
    LockFreeData { slot: Arc<LockFreeSlot<T>>, seq: u64 },
    LockFreeBuffer(Producer<T>),
}

impl<T: LinkPortMessage> LinkWriteHalf<T> {
    pub(crate) fn write(&mut self, value: T) -> WriteOutcome {
        match self {
            Self::Locked(store) => store.lock().push(value),
            Self::LockFreeData { slot, seq } => {
                let previous = *seq;
                *seq += 1;
                slot.current.store(Some(Arc::new(StampedSample { seq: *seq, value })));
                // Checked after publishing: if the reader already took the
                // previous sample it may be waiting for this one. The fence
                // pairs with the one in `take_new`.
                fence(Ordering::SeqCst);
                let became_non_empty =
                    previous == 0 || slot.delivered.load(Ordering::SeqCst) >= previous;
                WriteOutcome::Stored { became_non_empty }
            }
            Self::LockFreeBuffer(producer) => match producer.push(value) {
                Ok(()) => {
                    // Tail published before the head is sampled; pairs with
                    // the fence in `take_new`.
                    fence(Ordering::SeqCst);
                    let queued = producer.buffer().capacity() - producer.slots();
                    WriteOutcome::Stored {
                        became_non_empty: queued == 1,
                    }
                }
                Err(rtrb::PushError::Full(_)) => WriteOutcome::Dropped,
            },
        }
    }
}

/// Reader-side access to a link's storage.
pub(crate) enum LinkReadHalf<T> {
    Locked(Arc<Mutex<LockedStore<T>>>),
    LockFreeData { slot: Arc<LockFreeSlot<T>>, cleared: bool },
    LockFreeBuffer(Consumer<T>),
}

impl<T: LinkPortMessage> LinkReadHalf<T> {
    /// Take a sample this reader has not seen yet.
    ///
    /// On lock-free links the previous take's release of its slot must be
    /// ordered before this take looks for new data, otherwise reader and
    /// writer can both miss each other and the wakeup is lost.
    pub(crate) fn take_new(&mut self) -> Option<T> {
        match self {
            Self::Locked(store) => store.lock().take_new(),
            Self::LockFreeData { slot, cleared } => {
                fence(Ordering::SeqCst);
                let current = slot.current.load();
                let sample = (*current).as_ref()?;
                if sample.seq == slot.delivered.load(Ordering::Relaxed) {
                    return None;
                }
                slot.delivered.store(sample.seq, Ordering::SeqCst);
                *cleared = false;
                Some(sample.value.clone())
            }
            Self::LockFreeBuffer(consumer) => {
                fence(Ordering::SeqCst);
                consumer.pop().ok()
            }
        }
    }

    /// Link-level read: buffers report `NoData` once drained, data slots
    /// report `OldData` for an already delivered value.
    pub(crate) fn read(&mut self, out: &mut T) -> FlowStatus {
        if let Some(value) = self.take_new() {
            *out = value;
            return FlowStatus::NewData;
        }
        let old = match self {
            Self::Locked(store) => store.lock().peek_old(),
            Self::LockFreeData { slot, cleared } => {
                if *cleared {
                    None
                } else {
                    (*slot.current.load()).as_ref().map(|s| s.value.clone())
                }
            }
            Self::LockFreeBuffer(_) => None,
        };
        match old {
            Some(value) => {
                *out = value;
                FlowStatus::OldData
            }
            None => FlowStatus::NoData,
        }
    }

    /// Discard everything buffered for this reader.
    pub(crate) fn clear(&mut self) {
        match self {
            Self::Locked(store) => store.lock().clear(),
            Self::LockFreeData { slot, cleared } => {
                if let Some(sample) = (*slot.current.load()).as_ref() {
                    slot.delivered.store(sample.seq, Ordering::SeqCst);
                }
                *cleared = true;
            }
            Self::LockFreeBuffer(consumer) => while consumer.pop().is_ok() {},
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Locked(store) => match &*store.lock() {
                LockedStore::Data { fresh, .. } => usize::from(*fresh),
                LockedStore::Buffer { queue, .. } => queue.len(),
            },
            Self::LockFreeData { slot, .. } => {
                let current = slot.current.load();
                match (*current).as_ref() {
                    Some(s) if s.seq != slot.delivered.load(Ordering::Relaxed) => 1,
                    _ => 0,
                }
            }
            Self::LockFreeBuffer(consumer) => consumer.slots(),
        }
    }
}

/// Allocate storage for `policy` and split it into its two halves.
pub(crate) fn split_storage<T: LinkPortMessage>(
    policy: &ConnPolicy,
) -> (LinkWriteHalf<T>, LinkReadHalf<T>) {
    match (policy.lock_policy(), policy.kind()) {
        (LockPolicy::Locked, _) => {
            let store = Arc::new(Mutex::new(LockedStore::new(policy)));
            (
                LinkWriteHalf::Locked(Arc::clone(&store)),
                LinkReadHalf::Locked(store),
            )
        }
        (LockPolicy::LockFree, BufferPolicy::Data) => {
            let slot = Arc::new(LockFreeSlot::new());
            (
                LinkWriteHalf::LockFreeData {
                    slot: Arc::clone(&slot),
                    seq: 0,
                },
                LinkReadHalf::LockFreeData {
                    slot,
                    cleared: false,
                },
            )
        }
        (LockPolicy::LockFree, BufferPolicy::Buffer) => {
            let (producer, consumer) = RingBuffer::new(policy.capacity());
            (
                LinkWriteHalf::LockFreeBuffer(producer),
                LinkReadHalf::LockFreeBuffer(consumer),
            )
        }
    }
}

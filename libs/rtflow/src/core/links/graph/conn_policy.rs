// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Connection policy: how one writer/reader link stores and guards samples.

use serde::{Deserialize, Serialize};

use super::link_capacity::LinkCapacity;
use crate::core::{FlowError, Result};

/// Storage kind of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferPolicy {
    /// Single slot, overwritten by every write. Only the latest sample is observable.
    #[default]
    Data,
    /// Bounded FIFO. A write to a full buffer is discarded (drop-newest).
    Buffer,
}

/// Concurrency discipline guarding a link's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPolicy {
    /// Mutex held for the copy in/out only.
    #[default]
    Locked,
    /// Wait-free single-producer/single-consumer storage.
    LockFree,
}

/// Immutable description of how a link between one writer and one reader behaves.
///
/// Invariants: `capacity >= 1`, and a `Data` link always has capacity 1.
/// Both are enforced by the constructors and by deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ConnPolicyFields")]
pub struct ConnPolicy {
    kind: BufferPolicy,
    capacity: LinkCapacity,
    lock_policy: LockPolicy,
    pull: bool,
    init: bool,
}

/// Unvalidated field set accepted from configuration files.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConnPolicyFields {
    #[serde(default)]
    kind: BufferPolicy,
    #[serde(default)]
    capacity: Option<usize>,
    #[serde(default)]
    lock_policy: LockPolicy,
    #[serde(default)]
    pull: bool,
    #[serde(default)]
    init: bool,
}

impl TryFrom<ConnPolicyFields> for ConnPolicy {
    type Error = FlowError;

    fn try_from(fields: ConnPolicyFields) -> Result<Self> {
        let capacity = match (fields.kind, fields.capacity) {
            (BufferPolicy::Data, None) => LinkCapacity::ONE,
            (BufferPolicy::Buffer, None) => LinkCapacity::default(),
            (_, Some(n)) => LinkCapacity::new(n)?,
        };
        let policy = Self {
            kind: fields.kind,
            capacity,
            lock_policy: fields.lock_policy,
            pull: fields.pull,
            init: fields.init,
        };
        policy.validate()?;
        Ok(policy)
    }
}

impl ConnPolicy {
    /// Single-slot, locked, push, no initial sample.
    pub const fn data() -> Self {
        Self {
            kind: BufferPolicy::Data,
            capacity: LinkCapacity::ONE,
            lock_policy: LockPolicy::Locked,
            pull: false,
            init: false,
        }
    }

    /// Bounded FIFO of `capacity` samples. A capacity of zero is raised to one;
    /// use [`ConnPolicy::try_buffer`] to reject it instead.
    pub fn buffer(capacity: usize) -> Self {
        Self::try_buffer(capacity).unwrap_or_else(|_| {
            tracing::warn!("ConnPolicy::buffer(0) requested, using capacity 1");
            Self::buffer_with(LinkCapacity::ONE)
        })
    }

    pub fn try_buffer(capacity: usize) -> Result<Self> {
        Ok(Self::buffer_with(LinkCapacity::new(capacity)?))
    }

    /// Bounded FIFO with [`DEFAULT_BUFFER_CAPACITY`](super::DEFAULT_BUFFER_CAPACITY) slots.
    pub fn buffer_default() -> Self {
        Self::buffer_with(LinkCapacity::default())
    }

    fn buffer_with(capacity: LinkCapacity) -> Self {
        Self {
            kind: BufferPolicy::Buffer,
            capacity,
            ..Self::data()
        }
    }

    pub const fn with_lock_policy(mut self, lock_policy: LockPolicy) -> Self {
        self.lock_policy = lock_policy;
        self
    }

    pub const fn lock_free(self) -> Self {
        self.with_lock_policy(LockPolicy::LockFree)
    }

    pub const fn locked(self) -> Self {
        self.with_lock_policy(LockPolicy::Locked)
    }

    /// Reader pulls on demand; the link never fires new-data notifications.
    pub const fn with_pull(mut self, pull: bool) -> Self {
        self.pull = pull;
        self
    }

    /// Deliver the writer's last written value as soon as the link is created.
    pub const fn with_init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    #[inline]
    pub fn kind(&self) -> BufferPolicy {
        self.kind
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    #[inline]
    pub fn lock_policy(&self) -> LockPolicy {
        self.lock_policy
    }

    #[inline]
    pub fn is_pull(&self) -> bool {
        self.pull
    }

    #[inline]
    pub fn init_sample(&self) -> bool {
        self.init
    }

    /// Check the policy invariants.
    pub fn validate(&self) -> Result<()> {
        if self.kind == BufferPolicy::Data && self.capacity != LinkCapacity::ONE {
            return Err(FlowError::InvalidPolicy(format!(
                "data links hold exactly one sample, got capacity {}",
                self.capacity.get()
            )));
        }
        Ok(())
    }
}

impl Default for ConnPolicy {
    fn default() -> Self {
        Self::data()
    }
}

impl std::fmt::Display for ConnPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            BufferPolicy::Data => write!(f, "data")?,
            BufferPolicy::Buffer => write!(f, "buffer[{}]", self.capacity.get())?,
        }
        match self.lock_policy {
            LockPolicy::Locked => write!(f, "(locked")?,
            LockPolicy::LockFree => write!(f, "(lock_free")?,
        }
        if self.pull {
            write!(f, ",pull")?;
        }
        if self.init {
            write!(f, ",init")?;
        }
        write!(f, ")")
    }
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Connection establishment between an output and an input port.

use std::sync::{Arc, Weak};

use super::graph::{ConnPolicy, LinkId};
use super::runtime::link_instance::create_link_channel;
use super::runtime::{LinkInput, LinkInputInner, LinkOutput, LinkOutputInner};
use super::traits::LinkPortMessage;
use crate::core::error::{FlowError, Result};
use crate::core::ports::{AnyPort, PortHandle};

/// Create one link from `writer` to `reader`.
///
/// Without a policy the reader's default policy is used. With
/// `init_sample` set and a value already written, that value is delivered
/// into the new link before this returns. A second link between the same
/// pair is rejected with [`FlowError::LinkAlreadyExists`].
pub fn create_connection<T: LinkPortMessage>(
    writer: &LinkOutput<T>,
    reader: &LinkInput<T>,
    policy: Option<ConnPolicy>,
) -> Result<LinkId> {
    connect_inner(writer.inner(), reader.inner(), policy)
}

/// Connect two type-erased ports, checking direction and value type at run
/// time.
pub fn connect_any(
    writer: &impl PortHandle,
    reader: &impl PortHandle,
    policy: Option<ConnPolicy>,
) -> Result<LinkId> {
    writer.any_port().connect_erased(reader.any_port(), policy)
}

pub(crate) fn connect_inner<T: LinkPortMessage>(
    writer: &Arc<LinkOutputInner<T>>,
    reader: &Arc<LinkInputInner<T>>,
    policy: Option<ConnPolicy>,
) -> Result<LinkId> {
    let policy = policy.unwrap_or_else(|| reader.default_link_policy());
    policy.validate()?;

    if writer.has_peer(&reader.identity().id) {
        return Err(FlowError::LinkAlreadyExists(format!(
            "{} -> {}",
            writer.identity(),
            reader.identity()
        )));
    }

    let (link, data_writer, data_reader) =
        create_link_channel::<T>(policy, writer.identity().clone(), reader.identity().clone());

    let writer_peer: Weak<dyn AnyPort> = Arc::downgrade(writer) as Weak<dyn AnyPort>;
    reader.attach_upstream(data_reader, writer_peer)?;

    let reader_peer: Weak<dyn AnyPort> = Arc::downgrade(reader) as Weak<dyn AnyPort>;
    if let Err(e) = writer.attach_downstream(data_writer, reader_peer, policy.init_sample()) {
        link.close();
        reader.detach_link(link.link_id());
        return Err(e);
    }

    tracing::debug!(
        "[{}] -> [{}] connected via {} ({})",
        writer.identity(),
        reader.identity(),
        link.link_id(),
        policy
    );
    Ok(link.link_id().clone())
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkPortMessage trait for types that can be sent through link ports.

/// Trait for types that can be sent through link ports.
///
/// Samples are copied into each link on write and out of it on read, so
/// the only requirements are `Clone` plus the bounds needed to hand a
/// sample from the writer's thread to the reader's thread.
pub trait LinkPortMessage: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> LinkPortMessage for T {}

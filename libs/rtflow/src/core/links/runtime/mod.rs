// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Runtime link infrastructure for actual data flow.
//!
//! - `LinkInstance`: state shared by both ends of one link
//! - `LinkOutputDataWriter`/`LinkInputDataReader`: typed link endpoints
//! - `LinkOutput`/`LinkInput`: port API
//! - `NewDataHook`: empty to non-empty notification

pub mod link_input;
pub(crate) mod link_input_data_reader;
mod link_input_router;
pub(crate) mod link_instance;
pub mod link_notifier;
pub mod link_output;
pub(crate) mod link_output_data_writer;
mod link_storage;
pub mod link_wakeup;

pub use link_input::{LinkInput, LinkInputInner};
pub use link_instance::LinkStats;
pub use link_notifier::{NewDataCallback, NewDataHook};
pub use link_output::{LinkOutput, LinkOutputInner};
pub use link_wakeup::LinkWakeupEvent;

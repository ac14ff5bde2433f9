// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod config;
pub mod error;
pub mod links;
pub mod ports;

pub use config::LinkPolicyTable;
pub use error::*;
pub use links::*;
pub use ports::*;

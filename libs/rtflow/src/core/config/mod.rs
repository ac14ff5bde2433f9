// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link configuration.

mod link_policy_table;

pub use link_policy_table::LinkPolicyTable;

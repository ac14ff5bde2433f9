// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

#![allow(dead_code)]

use rtflow::{FlowStatus, InputPort};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Read once and return the status with the value left in the output slot.
pub fn read_i32(port: &InputPort<i32>) -> (FlowStatus, i32) {
    let mut value = 0;
    let status = port.read(&mut value);
    (status, value)
}

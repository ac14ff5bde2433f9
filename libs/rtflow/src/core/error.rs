// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

/// Errors reported by administrative port/link operations.
///
/// The real-time path (`write`, `read`, `clear`) never produces these;
/// absence of data is a [`FlowStatus`](crate::core::links::FlowStatus).
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Port direction mismatch: {0}")]
    DirectionMismatch(String),

    #[error("Port name collision: {0}")]
    PortNameCollision(String),

    #[error("Port not found: {0}")]
    PortNotFound(String),

    #[error("Link already exists: {0}")]
    LinkAlreadyExists(String),

    #[error("Link not found: {0}")]
    LinkNotFound(String),

    #[error("Invalid connection policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

use neuraedge_memory::MemoryError;
use neuraedge_npu_tile::TileError;
use neuraedge_power::PowerError;
use neuraedge_routing::RoutingError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid compute mode '{0}' (expected snn, dense or hybrid)")]
    InvalidMode(String),

    #[error("Unknown {kind} policy '{value}'")]
    UnknownPolicy { kind: &'static str, value: String },

    #[error("Invalid layer {index}: {reason}")]
    InvalidLayer { index: usize, reason: String },

    #[error("Task {0} not found")]
    TaskNotFound(usize),

    #[error(transparent)]
    Tile(#[from] TileError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Power(#[from] PowerError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

use neuraedge_config::ConfigError;
use neuraedge_memory::MemoryError;
use neuraedge_npu_device::DeviceError;
use neuraedge_npu_engine::EngineError;
use neuraedge_npu_tile::TileError;
use neuraedge_routing::RoutingError;
use thiserror::Error;

/// Errors raised while assembling a simulator from configuration
#[derive(Debug, Error)]
pub enum NeuraEdgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Tile(#[from] TileError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, NeuraEdgeError>;

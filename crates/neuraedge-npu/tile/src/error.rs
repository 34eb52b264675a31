// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

use neuraedge_npu_device::DeviceError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TileError {
    #[error("Tile {tile_id} out of range (num_tiles={num_tiles})")]
    TileOutOfRange { tile_id: usize, num_tiles: usize },

    #[error("Weight matrix must be {expected}x{expected}, got {rows}x{cols}")]
    MatrixShapeMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Vector length mismatch: expected {expected}, got {actual}")]
    VectorLengthMismatch { expected: usize, actual: usize },

    #[error("A tile manager needs at least one tile")]
    NoTiles,

    #[error("Invalid tile size {0} (must be at least 1)")]
    InvalidSize(usize),

    #[error("Invalid neuron parameter {name}: {reason}")]
    InvalidNeuronParameter { name: &'static str, reason: String },

    #[error("Invalid crossbar parameter {name}: {reason}")]
    InvalidCrossbarParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

pub type Result<T> = std::result::Result<T, TileError>;

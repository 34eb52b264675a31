// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Tile buffer overflow: {requested} bytes requested, {available} available")]
    BufferOverflow { requested: usize, available: usize },

    #[error("Not enough SRAM for region '{name}': {requested} bytes requested, {available} available")]
    OutOfMemory {
        name: String,
        requested: usize,
        available: usize,
    },

    #[error("SRAM region '{0}' already allocated")]
    RegionExists(String),

    #[error("Unknown SRAM region '{0}'")]
    UnknownRegion(String),

    #[error("Access of {len} bytes at address {address} exceeds capacity {capacity}")]
    OutOfBounds {
        address: usize,
        len: usize,
        capacity: usize,
    },

    #[error("Unsupported quantization width: {0} bits (expected 4, 8 or 16)")]
    UnsupportedBits(u32),

    #[error("Must quantize before dequantize")]
    NotQuantized,

    #[error("Weight matrix must be {expected}x{expected}, got {rows}x{cols}")]
    ShapeMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Tile {tile_id} out of range (num_tiles={num_tiles})")]
    InvalidTile { tile_id: usize, num_tiles: usize },
}

pub type Result<T> = std::result::Result<T, MemoryError>;

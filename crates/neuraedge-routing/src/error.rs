// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Destination tile {tile_id} out of range (num_tiles={num_tiles})")]
    InvalidDestination { tile_id: usize, num_tiles: usize },

    #[error("Tile {tile_id} out of range (num_tiles={num_tiles})")]
    InvalidTile { tile_id: usize, num_tiles: usize },

    #[error("Packet field '{field}' value {value} does not fit in {bits} bits")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        bits: u32,
    },

    #[error("Queue for tile {tile_id} is full ({capacity} packets)")]
    QueueFull { tile_id: usize, capacity: usize },

    #[error("Invalid mesh dimensions {rows}x{cols}")]
    InvalidMesh { rows: usize, cols: usize },

    #[error("Unknown arbitration policy '{0}'")]
    UnknownPolicy(String),
}

pub type Result<T> = std::result::Result<T, RoutingError>;

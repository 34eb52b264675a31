// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PowerError {
    #[error("Supply voltage {voltage} V is below the minimum of {min} V")]
    VoltageTooLow { voltage: f64, min: f64 },

    #[error("Tile {tile_id} out of range (num_tiles={num_tiles})")]
    InvalidTile { tile_id: usize, num_tiles: usize },

    #[error("Invalid power parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, PowerError>;

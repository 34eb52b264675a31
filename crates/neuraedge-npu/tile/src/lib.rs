// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # NeuraEdge Compute Tile
//!
//! - **crossbar**: N x N device grid performing the analog matrix-vector product
//! - **lif** / **cluster**: leaky integrate-and-fire neurons, one per column
//! - **tile**: crossbar + neurons + power monitor, stepped once per call
//! - **manager**: fixed set of tiles addressed by id
//!
//! Within a step the crossbar read always precedes neuron integration.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cluster;
pub mod crossbar;
pub mod error;
pub mod lif;
pub mod manager;
pub mod tile;

pub use cluster::NeuronCluster;
pub use crossbar::{quantize_adc, CrossbarArray, CrossbarConfig};
pub use error::{Result, TileError};
pub use lif::{LifNeuron, LifParameters, NeuronState};
pub use manager::{PowerSummary, TileManager};
pub use tile::{Tile, TileConfig, TileStatistics};

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # NeuraEdge Memory Hierarchy
//!
//! - **tile_buffer**: per-tile ring buffer for incoming spike traffic
//! - **global_sram**: shared SRAM with named regions for activations
//! - **quantization**: reduced-precision weight storage
//! - **weight_loader**: weight staging and verification before programming
//!
//! Capacity is never exceeded silently; every overflow is a `MemoryError`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod global_sram;
pub mod quantization;
pub mod tile_buffer;
pub mod weight_loader;

pub use error::{MemoryError, Result};
pub use global_sram::{GlobalSram, Region, SramStats};
pub use quantization::{QuantizationBits, Quantizer};
pub use tile_buffer::TileBuffer;
pub use weight_loader::WeightLoader;

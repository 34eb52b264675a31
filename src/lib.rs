// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # NeuraEdge
//!
//! Cycle-stepped functional simulator of a tiled memristive-crossbar
//! neuromorphic accelerator. Each tile pairs an analog crossbar of
//! programmable resistive devices with a cluster of leaky integrate-and-fire
//! neurons; tiles exchange spikes as packets over a 2-D mesh.
//!
//! This crate re-exports every workspace member and adds the `build_*`
//! helpers that turn a [`NeuraEdgeConfig`] into ready-to-run simulators.
//!
//! ```rust,no_run
//! use neuraedge::prelude::*;
//!
//! let config = NeuraEdgeConfig::default();
//! let mut engine = neuraedge::build_engine(&config)?;
//! let input = LayerInput::from(ndarray::Array1::from_elem(64, 0.5));
//! let result = engine.execute_layer(0, &input, None, 20)?;
//! println!("{} spikes", result.statistics.total_spikes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! config ─┐
//!         ├─> device ─> tile (crossbar + LIF cluster) ─> engine (scheduler, modes)
//! power ──┘                                              │
//! memory (buffers, SRAM, quantization) ──────────────────┤
//! routing (packets, mesh, arbitration) ──────────────────┘
//! ```

pub mod builder;
pub mod error;

pub use neuraedge_config as config;
pub use neuraedge_memory as memory;
pub use neuraedge_npu_device as device;
pub use neuraedge_npu_engine as engine;
pub use neuraedge_npu_tile as tile;
pub use neuraedge_observability as observability;
pub use neuraedge_power as power;
pub use neuraedge_routing as routing;

pub use builder::{
    build_engine, build_full_system, build_mode_controller, build_multi_tile, build_router,
    build_system_options, build_tile_config, build_tile_manager,
};
pub use error::{NeuraEdgeError, Result};

pub use neuraedge_config::NeuraEdgeConfig;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
    pub use crate::config::{load_config, validate_config, NeuraEdgeConfig};
    pub use crate::device::{DeviceConfig, DeviceKind};
    pub use crate::engine::{
        ComputeMode, DeliveryPolicy, ExecutionEngine, FullSystemSimulator, LayerConfig,
        LayerInput, LayerResult, ModeController, MultiTileSimulator, SchedulingPolicy,
    };
    pub use crate::memory::{GlobalSram, Quantizer, TileBuffer};
    pub use crate::routing::{ArbitrationPolicy, SpikePacket, SpikeRouter};
    pub use crate::tile::{Tile, TileConfig, TileManager};
    pub use crate::{NeuraEdgeError, Result};
}

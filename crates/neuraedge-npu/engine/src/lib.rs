// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # NeuraEdge Execution Engine
//!
//! Drives the tile pipeline over time:
//! - **scheduler**: FIFO / priority task queue per tile
//! - **engine**: multi-timestep layer execution and power reporting
//! - **modes**: dense, SNN and hybrid compute paths
//! - **multi_tile**: lock-step tiles exchanging spikes over the mesh
//! - **full_system**: layer-pipelined inference with routing, buffering,
//!   activity, power and thermal tracking
//! - **runtime**: task records around caller-supplied executors
//!
//! Everything runs synchronously on the caller's thread; only batched dense
//! products fan out with rayon.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod engine;
pub mod error;
pub mod full_system;
pub mod layer;
pub mod modes;
pub mod multi_tile;
pub mod runtime;
pub mod scheduler;

pub use engine::{ExecutionEngine, NetworkResult, PowerReport};
pub use error::{EngineError, Result};
pub use full_system::{FullSystemSimulator, InferenceResult, SystemOptions, SystemStatistics};
pub use layer::{LayerConfig, LayerInput, LayerResult, LayerStatistics};
pub use modes::{AnalogMac, ComputeMode, DenseMode, ModeController, ModeStatistics, SnnMode};
pub use multi_tile::{DeliveryPolicy, MultiTileSimulator};
pub use runtime::{ExecutionStats, RuntimeManager, TaskRecord, TaskStatus};
pub use scheduler::{SchedulingPolicy, Task, TileScheduler};

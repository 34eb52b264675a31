// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # NeuraEdge Device Layer
//!
//! Programmable resistive elements used as crossbar cells:
//! - **model**: `Device` value type and the `DeviceModel` operation set
//! - **noise**: Gaussian, log-normal and random-telegraph samplers
//! - **drift**: time and temperature degradation
//! - **config**: `DeviceConfig` and `DeviceFactory`
//!
//! Stochastic operations take an explicit RNG; seed it for reproducible runs.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod drift;
pub mod error;
pub mod model;
pub mod noise;

pub use config::{DeviceConfig, DeviceFactory, TelegraphNoiseConfig};
pub use error::{DeviceError, Result};
pub use model::{Device, DeviceKind, DeviceModel, StuckAt};

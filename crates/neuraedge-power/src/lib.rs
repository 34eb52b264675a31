// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # NeuraEdge Power Engine
//!
//! Energy accounting derived from operation counts:
//! - **monitor**: per-tile `PowerMonitor` updated by every execution step
//! - **energy_model**: parametric what-if formulas
//! - **estimator**: instantaneous power (mW) with history
//! - **activity**: per-tile switching counters
//! - **voltage** / **thermal**: supply scaling and junction temperature
//!
//! All counters are additive and owned by their enclosing tile or simulator;
//! they only return to zero on an explicit `reset`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod activity;
pub mod energy_model;
pub mod error;
pub mod estimator;
pub mod monitor;
pub mod thermal;
pub mod voltage;

pub use activity::{ActivityTracker, GlobalActivity, TileActivity};
pub use energy_model::{EnergyCoefficients, EnergyModel, OperationActivity};
pub use error::{PowerError, Result};
pub use estimator::PowerEstimator;
pub use monitor::{EnergyBreakdown, MonitorCoefficients, PowerMonitor};
pub use thermal::{TemperatureParameter, ThermalModel};
pub use voltage::{VoltageModel, MIN_SUPPLY_VOLTAGE};

/// Picojoules to millijoules
pub const PJ_TO_MJ: f64 = 1e-9;

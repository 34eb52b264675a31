// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # neuraedge-observability
//!
//! Logging initialisation for the NeuraEdge simulator.
//!
//! Every simulator crate logs through the `tracing` facade; this crate wires
//! those events to a subscriber and lets the user raise individual crates to
//! `debug` with `--debug-<crate>` flags or the `NEURAEDGE_DEBUG` variable.
//!
//! ## Features
//! - `file-logging`: timestamped run folders with rolling log files

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known NeuraEdge crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "neuraedge",
    "neuraedge-config",
    "neuraedge-npu-device",
    "neuraedge-npu-tile",
    "neuraedge-npu-engine",
    "neuraedge-power",
    "neuraedge-memory",
    "neuraedge-routing",
];

/// Convert a crate name to the module-path prefix `tracing` uses as target.
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}

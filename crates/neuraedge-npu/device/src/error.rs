// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for device construction

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("Unknown device type: {0} (expected reram, pcm or sram)")]
    UnknownDeviceType(String),

    #[error("Invalid conductance bounds: min={min}, max={max} (need 0 < min < max)")]
    InvalidConductanceBounds { min: f64, max: f64 },

    #[error("Invalid device parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, DeviceError>;

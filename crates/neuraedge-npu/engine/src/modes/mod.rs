// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Compute modes: dense (conventional ANN), SNN (tile-executed spiking) and
//! hybrid dispatch between them.

pub mod analog_mac;
pub mod controller;
pub mod dense;
pub mod snn;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub use analog_mac::AnalogMac;
pub use controller::{ModeController, ModeStatistics, HYBRID_SPARSITY_THRESHOLD};
pub use dense::DenseMode;
pub use snn::SnnMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeMode {
    Dense,
    #[default]
    Snn,
    Hybrid,
}

impl ComputeMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Snn => "snn",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for ComputeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComputeMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dense" => Ok(Self::Dense),
            "snn" => Ok(Self::Snn),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(EngineError::InvalidMode(other.to_string())),
        }
    }
}

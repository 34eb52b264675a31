// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Mode selection and dispatch.
//!
//! In `Hybrid` mode inputs whose nonzero fraction is below
//! [`HYBRID_SPARSITY_THRESHOLD`] go to the spiking path; denser inputs go to
//! the dense path using their rate-coded vector.

use ndarray::Array1;
use neuraedge_npu_tile::TileManager;
use serde::Serialize;
use tracing::{debug, info};

use super::{ComputeMode, DenseMode, SnnMode};
use crate::error::Result;
use crate::layer::LayerInput;

pub const HYBRID_SPARSITY_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeStatistics {
    pub current_mode: ComputeMode,
    pub mode_switches: u64,
    /// Path taken by the most recent forward pass
    pub last_dispatch: Option<ComputeMode>,
}

#[derive(Debug, Clone)]
pub struct ModeController {
    dense: DenseMode,
    snn: SnnMode,
    current: ComputeMode,
    mode_switches: u64,
    last_dispatch: Option<ComputeMode>,
}

impl ModeController {
    pub fn new(dense: DenseMode, snn: SnnMode) -> Self {
        Self {
            dense,
            snn,
            current: ComputeMode::default(),
            mode_switches: 0,
            last_dispatch: None,
        }
    }

    pub fn current_mode(&self) -> ComputeMode {
        self.current
    }

    pub fn switch_mode(&mut self, mode: ComputeMode) {
        info!("compute mode {} -> {}", self.current, mode);
        self.current = mode;
        self.mode_switches += 1;
    }

    pub fn dense_mut(&mut self) -> &mut DenseMode {
        &mut self.dense
    }

    pub fn snn_mut(&mut self) -> &mut SnnMode {
        &mut self.snn
    }

    /// Path `inputs` would take under the current mode.
    pub fn select(&self, inputs: &LayerInput) -> ComputeMode {
        match self.current {
            ComputeMode::Hybrid if inputs.nonzero_fraction() < HYBRID_SPARSITY_THRESHOLD => {
                ComputeMode::Snn
            }
            ComputeMode::Hybrid => ComputeMode::Dense,
            mode => mode,
        }
    }

    /// Dense outputs are activations; SNN outputs are per-neuron spike counts.
    pub fn forward(
        &mut self,
        tiles: &mut TileManager,
        inputs: &LayerInput,
        tile_id: usize,
    ) -> Result<Array1<f64>> {
        let path = self.select(inputs);
        debug!("dispatching forward pass to {} path", path);
        let out = match path {
            ComputeMode::Dense => self.dense.forward(inputs.rate_vector().view())?,
            _ => self.snn.forward(tiles, inputs, tile_id, None)?,
        };
        self.last_dispatch = Some(path);
        Ok(out)
    }

    pub fn statistics(&self) -> ModeStatistics {
        ModeStatistics {
            current_mode: self.current,
            mode_switches: self.mode_switches,
            last_dispatch: self.last_dispatch,
        }
    }
}

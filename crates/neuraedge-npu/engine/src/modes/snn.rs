// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Spiking inference on a tile: spike counts over a fixed number of steps.

use ndarray::Array1;
use neuraedge_npu_tile::TileManager;
use tracing::debug;

use crate::error::Result;
use crate::layer::LayerInput;

pub const DEFAULT_SNN_TIMESTEPS: usize = 100;

#[derive(Debug, Clone)]
pub struct SnnMode {
    timesteps: usize,
    dt: f64,
}

impl Default for SnnMode {
    fn default() -> Self {
        Self {
            timesteps: DEFAULT_SNN_TIMESTEPS,
            dt: 1.0,
        }
    }
}

impl SnnMode {
    pub fn new(timesteps: usize, dt: f64) -> Self {
        Self { timesteps, dt }
    }

    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    pub fn set_timesteps(&mut self, timesteps: usize) {
        self.timesteps = timesteps;
    }

    /// Run `timesteps` steps (default when `None`) on `tile_id` and return
    /// spikes per neuron. A vector input is held constant; a train is
    /// truncated or zero-padded to the step count.
    pub fn forward(
        &self,
        tiles: &mut TileManager,
        inputs: &LayerInput,
        tile_id: usize,
        timesteps: Option<usize>,
    ) -> Result<Array1<f64>> {
        let steps = timesteps.unwrap_or(self.timesteps);
        let mut counts = Array1::zeros(tiles.tile_size());
        for t in 0..steps {
            for n in tiles.execute(tile_id, &inputs.step(t), self.dt)? {
                counts[n] += 1.0;
            }
        }
        debug!(
            "SNN forward on tile {}: {} steps, {} spikes",
            tile_id,
            steps,
            counts.sum()
        );
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use neuraedge_npu_tile::TileConfig;

    fn manager() -> TileManager {
        let mut config = TileConfig::with_size(2);
        config.crossbar.seed = Some(1);
        config.crossbar.device.noise_enabled = false;
        config.crossbar.device.drift_enabled = false;
        let mut tiles = TileManager::new(1, &config).unwrap();
        tiles.program_tile(0, &Array2::eye(2)).unwrap();
        tiles
    }

    #[test]
    fn test_zero_input_never_spikes() {
        let mut tiles = manager();
        let snn = SnnMode::new(20, 1.0);
        let counts = snn
            .forward(&mut tiles, &LayerInput::Vector(array![0.0, 0.0]), 0, None)
            .unwrap();
        assert!(counts.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_short_train_is_padded() {
        let mut tiles = manager();
        let snn = SnnMode::default();
        let train = LayerInput::Train(array![[1.0, 1.0]]);
        let counts = snn.forward(&mut tiles, &train, 0, Some(5)).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(tiles.tile(0).unwrap().statistics().steps, 5);
    }

    #[test]
    fn test_invalid_tile() {
        let mut tiles = manager();
        let snn = SnnMode::default();
        assert!(snn
            .forward(&mut tiles, &LayerInput::Vector(array![1.0, 1.0]), 3, Some(1))
            .is_err());
    }
}

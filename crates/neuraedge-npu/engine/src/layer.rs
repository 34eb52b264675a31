// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Layer inputs, configurations and per-layer results.

use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

/// Input to one layer: a constant vector or a `(timesteps, size)` spike train.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerInput {
    Vector(Array1<f64>),
    Train(Array2<f64>),
}

impl LayerInput {
    /// Input row for step `t`. Train rows past the end are zeros.
    pub fn step(&self, t: usize) -> Vec<f64> {
        match self {
            Self::Vector(v) => v.to_vec(),
            Self::Train(train) if t < train.nrows() => train.row(t).to_vec(),
            Self::Train(train) => vec![0.0; train.ncols()],
        }
    }

    /// Width of one input row
    pub fn width(&self) -> usize {
        match self {
            Self::Vector(v) => v.len(),
            Self::Train(train) => train.ncols(),
        }
    }

    /// Expand to exactly `timesteps` rows, repeating a vector and truncating
    /// or zero-padding a train.
    pub fn to_train(&self, timesteps: usize) -> Array2<f64> {
        let width = self.width();
        Array2::from_shape_fn((timesteps, width), |(t, i)| match self {
            Self::Vector(v) => v[i],
            Self::Train(train) if t < train.nrows() => train[[t, i]],
            Self::Train(_) => 0.0,
        })
    }

    /// Per-line mean over time; the rate-coded view used by dense execution.
    pub fn rate_vector(&self) -> Array1<f64> {
        match self {
            Self::Vector(v) => v.clone(),
            Self::Train(train) => train
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(train.ncols())),
        }
    }

    /// Fraction of nonzero entries, 0 for an empty input.
    pub fn nonzero_fraction(&self) -> f64 {
        let (nonzero, total) = match self {
            Self::Vector(v) => (v.iter().filter(|x| **x != 0.0).count(), v.len()),
            Self::Train(t) => (t.iter().filter(|x| **x != 0.0).count(), t.len()),
        };
        if total == 0 {
            0.0
        } else {
            nonzero as f64 / total as f64
        }
    }
}

impl From<Array1<f64>> for LayerInput {
    fn from(v: Array1<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<Array2<f64>> for LayerInput {
    fn from(train: Array2<f64>) -> Self {
        Self::Train(train)
    }
}

#[derive(Debug, Clone)]
pub struct LayerConfig {
    pub tile_id: usize,
    /// Programmed before execution when present
    pub weights: Option<Array2<f64>>,
    pub inputs: LayerInput,
    pub timesteps: usize,
}

impl LayerConfig {
    pub fn new(tile_id: usize, inputs: impl Into<LayerInput>, timesteps: usize) -> Self {
        Self {
            tile_id,
            weights: None,
            inputs: inputs.into(),
            timesteps,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f64>) -> Self {
        self.weights = Some(weights);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LayerStatistics {
    pub total_spikes: usize,
    /// Cumulative energy of the tile's power monitor after the layer (pJ)
    pub energy_consumed_pj: f64,
    /// total_spikes / (timesteps * tile_size)
    pub spike_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerResult {
    pub tile_id: usize,
    /// Spiking neuron indices, one entry per timestep
    pub outputs: Vec<Vec<usize>>,
    pub statistics: LayerStatistics,
}

impl LayerResult {
    /// Spikes per neuron across all steps.
    pub fn spike_counts(&self, size: usize) -> Array1<f64> {
        let mut counts = Array1::zeros(size);
        for &n in self.outputs.iter().flatten() {
            if n < size {
                counts[n] += 1.0;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_train_rows_past_end_are_zero() {
        let input = LayerInput::Train(array![[1.0, 2.0]]);
        assert_eq!(input.step(0), vec![1.0, 2.0]);
        assert_eq!(input.step(5), vec![0.0, 0.0]);
    }

    #[test]
    fn test_to_train_pads_and_truncates() {
        let input = LayerInput::Train(array![[1.0], [2.0], [3.0]]);
        assert_eq!(input.to_train(2), array![[1.0], [2.0]]);
        assert_eq!(input.to_train(4), array![[1.0], [2.0], [3.0], [0.0]]);
        let vector = LayerInput::Vector(array![0.5, 1.0]);
        assert_eq!(vector.to_train(2), array![[0.5, 1.0], [0.5, 1.0]]);
    }

    #[test]
    fn test_nonzero_fraction_and_rate() {
        let input = LayerInput::Train(array![[1.0, 0.0], [0.0, 0.0]]);
        assert!((input.nonzero_fraction() - 0.25).abs() < 1e-12);
        assert_eq!(input.rate_vector(), array![0.5, 0.0]);
        assert!(LayerInput::Vector(Array1::zeros(0)).nonzero_fraction().abs() < 1e-12);
    }

    #[test]
    fn test_spike_counts() {
        let result = LayerResult {
            tile_id: 0,
            outputs: vec![vec![0, 2], vec![2]],
            statistics: LayerStatistics::default(),
        };
        assert_eq!(result.spike_counts(3), array![1.0, 0.0, 2.0]);
    }
}

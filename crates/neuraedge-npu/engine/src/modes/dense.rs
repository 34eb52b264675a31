// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conventional feed-forward inference, ReLU between all but the last layer.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use neuraedge_npu_tile::TileError;

use super::AnalogMac;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone)]
pub struct DenseMode {
    layer_sizes: Vec<usize>,
    layers: Vec<AnalogMac>,
    biases: Vec<Array1<f64>>,
}

impl DenseMode {
    /// `layer_sizes` lists every layer width including the input, so it needs
    /// at least two entries.
    pub fn new(layer_sizes: &[usize]) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(EngineError::InvalidLayer {
                index: 0,
                reason: "dense mode needs at least an input and an output layer".to_string(),
            });
        }
        let layers = layer_sizes
            .windows(2)
            .map(|w| AnalogMac::new(w[1], w[0]))
            .collect();
        let biases = layer_sizes[1..].iter().map(|&n| Array1::zeros(n)).collect();
        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            layers,
            biases,
        })
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn num_weight_layers(&self) -> usize {
        self.layers.len()
    }

    fn layer_index(&self, index: usize) -> Result<usize> {
        if index >= self.layers.len() {
            return Err(EngineError::InvalidLayer {
                index,
                reason: format!("only {} weight layers", self.layers.len()),
            });
        }
        Ok(index)
    }

    /// Set layer weights given as `(inputs, outputs)`.
    pub fn set_weights(&mut self, index: usize, weights: ArrayView2<'_, f64>) -> Result<()> {
        let index = self.layer_index(index)?;
        self.layers[index].program_weights(weights.t())
    }

    pub fn set_biases(&mut self, index: usize, biases: ArrayView1<'_, f64>) -> Result<()> {
        let index = self.layer_index(index)?;
        let expected = self.biases[index].len();
        if biases.len() != expected {
            return Err(TileError::VectorLengthMismatch {
                expected,
                actual: biases.len(),
            }
            .into());
        }
        self.biases[index].assign(&biases);
        Ok(())
    }

    pub fn forward(&self, inputs: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let last = self.layers.len() - 1;
        let mut activations = inputs.to_owned();
        for (i, (layer, bias)) in self.layers.iter().zip(&self.biases).enumerate() {
            activations = layer.compute(activations.view())? + bias;
            if i < last {
                activations.mapv_inplace(|a| a.max(0.0));
            }
        }
        Ok(activations)
    }

    /// Forward a `(batch, inputs)` matrix.
    pub fn forward_batch(&self, inputs: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let last = self.layers.len() - 1;
        let mut activations = inputs.to_owned();
        for (i, (layer, bias)) in self.layers.iter().zip(&self.biases).enumerate() {
            activations = layer.compute_batch(activations.view())? + bias;
            if i < last {
                activations.mapv_inplace(|a| a.max(0.0));
            }
        }
        Ok(activations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_relu_between_layers_not_after_last() {
        let mut dense = DenseMode::new(&[2, 2, 1]).unwrap();
        // hidden = [x0 - x1, x1 - x0]
        dense
            .set_weights(0, array![[1.0, -1.0], [-1.0, 1.0]].view())
            .unwrap();
        dense.set_weights(1, array![[1.0], [1.0]].view()).unwrap();
        dense.set_biases(1, array![-5.0].view()).unwrap();

        let out = dense.forward(array![3.0, 1.0].view()).unwrap();
        // relu([2, -2]) = [2, 0]; 2 - 5 = -3 stays negative
        assert!((out[0] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_batch_matches_single() {
        let mut dense = DenseMode::new(&[3, 2]).unwrap();
        dense
            .set_weights(0, array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]].view())
            .unwrap();
        let batch = array![[1.0, 2.0, 3.0], [0.0, 0.0, 1.0]];
        let out = dense.forward_batch(batch.view()).unwrap();
        assert_eq!(out.row(0), dense.forward(batch.row(0)).unwrap());
        assert_eq!(out.row(1), array![1.0, 1.0]);
    }

    #[test]
    fn test_invalid_construction_and_indices() {
        assert!(DenseMode::new(&[4]).is_err());
        let mut dense = DenseMode::new(&[2, 2]).unwrap();
        assert!(dense.set_weights(1, Array2::zeros((2, 2)).view()).is_err());
        assert!(dense.set_weights(0, Array2::zeros((3, 2)).view()).is_err());
        assert!(dense.set_biases(0, array![1.0].view()).is_err());
        assert!(dense.forward(array![1.0, 2.0, 3.0].view()).is_err());
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ideal (noise-free) crossbar multiply-accumulate: `y = W x`.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use neuraedge_npu_tile::TileError;
use rayon::prelude::*;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct AnalogMac {
    /// `(outputs, inputs)`
    weights: Array2<f64>,
}

impl AnalogMac {
    pub fn new(outputs: usize, inputs: usize) -> Self {
        Self {
            weights: Array2::zeros((outputs, inputs)),
        }
    }

    pub fn square(matrix_size: usize) -> Self {
        Self::new(matrix_size, matrix_size)
    }

    pub fn inputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn outputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn program_weights(&mut self, weights: ArrayView2<'_, f64>) -> Result<()> {
        if weights.dim() != self.weights.dim() {
            let (rows, cols) = weights.dim();
            return Err(TileError::MatrixShapeMismatch {
                expected: self.outputs(),
                rows,
                cols,
            }
            .into());
        }
        self.weights.assign(&weights);
        Ok(())
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.inputs() {
            return Err(TileError::VectorLengthMismatch {
                expected: self.inputs(),
                actual: width,
            }
            .into());
        }
        Ok(())
    }

    pub fn compute(&self, inputs: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        self.check_width(inputs.len())?;
        Ok(self.weights.dot(&inputs))
    }

    /// Row-wise products for a `(batch, inputs)` matrix, rows in parallel.
    pub fn compute_batch(&self, inputs: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_width(inputs.ncols())?;
        let rows: Vec<Array1<f64>> = (0..inputs.nrows())
            .into_par_iter()
            .map(|b| self.weights.dot(&inputs.row(b)))
            .collect();
        let mut out = Array2::zeros((inputs.nrows(), self.outputs()));
        for (mut dst, row) in out.rows_mut().into_iter().zip(&rows) {
            dst.assign(row);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_compute() {
        let mut mac = AnalogMac::new(2, 3);
        mac.program_weights(array![[1.0, 0.0, 2.0], [0.0, 1.0, 0.0]].view())
            .unwrap();
        assert_eq!(mac.compute(array![1.0, 2.0, 3.0].view()).unwrap(), array![7.0, 2.0]);
        assert!(mac.compute(array![1.0].view()).is_err());
    }

    #[test]
    fn test_batch_matches_single() {
        let mut mac = AnalogMac::square(2);
        mac.program_weights(array![[0.5, 1.0], [2.0, -1.0]].view()).unwrap();
        let batch = array![[1.0, 1.0], [0.0, 2.0], [4.0, 0.0]];
        let out = mac.compute_batch(batch.view()).unwrap();
        for (i, row) in batch.rows().into_iter().enumerate() {
            let single = mac.compute(row).unwrap();
            for j in 0..2 {
                assert!((out[[i, j]] - single[j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let mut mac = AnalogMac::square(2);
        assert!(mac.program_weights(Array2::zeros((3, 2)).view()).is_err());
    }
}

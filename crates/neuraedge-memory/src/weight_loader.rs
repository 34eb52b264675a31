// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Staging area for per-tile weight matrices before they are programmed
//! onto crossbars.

use ahash::AHashMap;
use ndarray::{s, Array2, ArrayView2};
use tracing::debug;

use crate::error::{MemoryError, Result};

const VERIFY_RTOL: f64 = 1e-5;
const VERIFY_ATOL: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct WeightLoader {
    num_tiles: usize,
    tile_size: usize,
    loaded: AHashMap<usize, Array2<f64>>,
}

impl WeightLoader {
    pub fn new(num_tiles: usize, tile_size: usize) -> Self {
        Self {
            num_tiles,
            tile_size,
            loaded: AHashMap::new(),
        }
    }

    fn check_tile(&self, tile_id: usize) -> Result<()> {
        if tile_id >= self.num_tiles {
            return Err(MemoryError::InvalidTile {
                tile_id,
                num_tiles: self.num_tiles,
            });
        }
        Ok(())
    }

    pub fn load_weights(&mut self, tile_id: usize, weights: ArrayView2<'_, f64>) -> Result<()> {
        self.check_tile(tile_id)?;
        let (rows, cols) = weights.dim();
        if rows != self.tile_size || cols != self.tile_size {
            return Err(MemoryError::ShapeMismatch {
                expected: self.tile_size,
                rows,
                cols,
            });
        }
        self.loaded.insert(tile_id, weights.to_owned());
        debug!("staged {}x{} weights for tile {}", rows, cols, tile_id);
        Ok(())
    }

    pub fn weights(&self, tile_id: usize) -> Option<&Array2<f64>> {
        self.loaded.get(&tile_id)
    }

    /// Overwrite a sub-block starting at (`row`, `col`). A tile with no staged
    /// matrix starts from zeros.
    pub fn partial_program(
        &mut self,
        tile_id: usize,
        block: ArrayView2<'_, f64>,
        row: usize,
        col: usize,
    ) -> Result<()> {
        self.check_tile(tile_id)?;
        let (rows, cols) = block.dim();
        let n = self.tile_size;
        if row + rows > n || col + cols > n {
            return Err(MemoryError::OutOfBounds {
                address: row * n + col,
                len: rows * cols,
                capacity: n * n,
            });
        }
        let target = self
            .loaded
            .entry(tile_id)
            .or_insert_with(|| Array2::zeros((n, n)));
        target
            .slice_mut(s![row..row + rows, col..col + cols])
            .assign(&block);
        Ok(())
    }

    /// Compare staged weights with `expected` element-wise within tolerance.
    pub fn verify(&self, tile_id: usize, expected: ArrayView2<'_, f64>) -> bool {
        match self.loaded.get(&tile_id) {
            Some(w) if w.dim() == expected.dim() => w
                .iter()
                .zip(expected.iter())
                .all(|(a, b)| (a - b).abs() <= VERIFY_ATOL + VERIFY_RTOL * b.abs()),
            _ => false,
        }
    }

    pub fn loaded_tiles(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.loaded.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
    }
}

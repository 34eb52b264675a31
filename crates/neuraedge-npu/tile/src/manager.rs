// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Owns the platform's tiles and routes programming and execution calls.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TileError};
use crate::tile::{Tile, TileConfig};

/// Energy across all tiles (pJ)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSummary {
    pub total_energy_pj: f64,
    pub per_tile_pj: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct TileManager {
    tiles: Vec<Tile>,
    tile_size: usize,
}

impl TileManager {
    /// Create `num_tiles` identical tiles. With a seed in the crossbar
    /// config, tile `i` is seeded with `seed + i` so tiles draw independent
    /// noise.
    pub fn new(num_tiles: usize, config: &TileConfig) -> Result<Self> {
        if num_tiles == 0 {
            return Err(TileError::NoTiles);
        }
        let tiles = (0..num_tiles)
            .map(|tile_id| {
                let mut tile_config = config.clone();
                tile_config.crossbar.seed = config
                    .crossbar
                    .seed
                    .map(|seed| seed.wrapping_add(tile_id as u64));
                Tile::new(tile_id, &tile_config)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "TileManager: {} tiles of {}x{} {} cells",
            num_tiles,
            config.size(),
            config.size(),
            config.crossbar.device.device_type
        );
        Ok(Self {
            tiles,
            tile_size: config.size(),
        })
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    fn out_of_range(&self, tile_id: usize) -> TileError {
        TileError::TileOutOfRange {
            tile_id,
            num_tiles: self.tiles.len(),
        }
    }

    pub fn tile(&self, tile_id: usize) -> Result<&Tile> {
        self.tiles.get(tile_id).ok_or_else(|| self.out_of_range(tile_id))
    }

    pub fn tile_mut(&mut self, tile_id: usize) -> Result<&mut Tile> {
        let err = self.out_of_range(tile_id);
        self.tiles.get_mut(tile_id).ok_or(err)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Program weights into one tile.
    ///
    /// # Errors
    ///
    /// `TileOutOfRange` for an unknown tile, `MatrixShapeMismatch` when the
    /// matrix is not `tile_size x tile_size`.
    pub fn program_tile(&mut self, tile_id: usize, weights: &Array2<f64>) -> Result<()> {
        self.tile_mut(tile_id)?.program_weights(weights)?;
        debug!("Programmed tile {}", tile_id);
        Ok(())
    }

    /// Execute one step on a tile and return its spikes.
    pub fn execute(&mut self, tile_id: usize, input: &[f64], dt: f64) -> Result<Vec<usize>> {
        self.tile_mut(tile_id)?.execute_layer(input, dt)
    }

    pub fn reset_all(&mut self) {
        self.tiles.iter_mut().for_each(Tile::reset);
    }

    pub fn update_drift_all(&mut self, time_elapsed: f64) {
        self.tiles
            .iter_mut()
            .for_each(|t| t.update_device_state(time_elapsed));
    }

    pub fn set_temperature_all(&mut self, temperature_celsius: f64) {
        self.tiles
            .iter_mut()
            .for_each(|t| t.set_temperature(temperature_celsius));
    }

    pub fn power_summary(&self) -> PowerSummary {
        let per_tile_pj: Vec<f64> = self.tiles.iter().map(Tile::energy_pj).collect();
        PowerSummary {
            total_energy_pj: per_tile_pj.iter().sum(),
            per_tile_pj,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(num_tiles: usize) -> TileManager {
        let mut config = TileConfig::with_size(4);
        config.crossbar.seed = Some(10);
        TileManager::new(num_tiles, &config).unwrap()
    }

    #[test]
    fn test_program_out_of_range() {
        let mut m = manager(2);
        assert_eq!(
            m.program_tile(2, &Array2::eye(4)),
            Err(TileError::TileOutOfRange {
                tile_id: 2,
                num_tiles: 2
            })
        );
        assert!(m.execute(5, &[0.0; 4], 1.0).is_err());
        assert!(m.tile(2).is_err());
    }

    #[test]
    fn test_program_wrong_shape() {
        let mut m = manager(2);
        assert!(matches!(
            m.program_tile(0, &Array2::eye(3)),
            Err(TileError::MatrixShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_power_summary_aggregates() {
        let mut m = manager(3);
        m.execute(0, &[1.0; 4], 1.0).unwrap();
        m.execute(2, &[1.0, 0.0, 0.0, 0.0], 1.0).unwrap();

        let summary = m.power_summary();
        assert_eq!(summary.per_tile_pj.len(), 3);
        assert_eq!(summary.per_tile_pj[1], 0.0);
        let sum: f64 = summary.per_tile_pj.iter().sum();
        assert!((summary.total_energy_pj - sum).abs() < 1e-12);
        assert!(summary.per_tile_pj[0] > summary.per_tile_pj[2]);

        m.reset_all();
        assert_eq!(m.power_summary().total_energy_pj, 0.0);
    }

    #[test]
    fn test_tiles_have_independent_seeds() {
        let mut m = manager(2);
        let w = Array2::from_elem((4, 4), 1.0);
        m.program_tile(0, &w).unwrap();
        m.program_tile(1, &w).unwrap();
        assert_ne!(
            m.tile(0).unwrap().crossbar().conductances(),
            m.tile(1).unwrap().crossbar().conductances()
        );
    }

    #[test]
    fn test_zero_tiles_rejected() {
        assert!(matches!(
            TileManager::new(0, &TileConfig::with_size(4)),
            Err(TileError::NoTiles)
        ));
    }
}

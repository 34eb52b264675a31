// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Multi-timestep, multi-layer execution across tiles.

use ndarray::Array2;
use neuraedge_memory::Quantizer;
use neuraedge_npu_tile::{TileError, TileManager};
use neuraedge_power::PJ_TO_MJ;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::layer::{LayerConfig, LayerInput, LayerResult, LayerStatistics};
use crate::scheduler::{SchedulingPolicy, Task, TileScheduler};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkResult {
    pub layers: Vec<LayerResult>,
    pub total_cycles: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerReport {
    pub total_energy_mj: f64,
    pub per_tile_mj: Vec<f64>,
    /// 1 / total_energy_mj, or 0 when nothing has run
    pub efficiency_ops_per_mj: f64,
}

#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    tiles: TileManager,
    scheduler: TileScheduler,
    /// Weights pass through this before programming when set
    quantizer: Option<Quantizer>,
    current_cycle: u64,
}

impl ExecutionEngine {
    pub fn new(tiles: TileManager) -> Self {
        Self::with_policy(tiles, SchedulingPolicy::default())
    }

    pub fn with_policy(tiles: TileManager, policy: SchedulingPolicy) -> Self {
        let scheduler = TileScheduler::with_policy(tiles.num_tiles(), policy);
        Self {
            tiles,
            scheduler,
            quantizer: None,
            current_cycle: 0,
        }
    }

    /// Store weights at reduced precision before they reach the crossbar.
    pub fn with_quantizer(mut self, quantizer: Quantizer) -> Self {
        self.quantizer = Some(quantizer);
        self
    }

    pub fn tile_manager(&self) -> &TileManager {
        &self.tiles
    }

    pub fn tile_manager_mut(&mut self) -> &mut TileManager {
        &mut self.tiles
    }

    pub fn scheduler(&self) -> &TileScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut TileScheduler {
        &mut self.scheduler
    }

    pub fn current_cycle(&self) -> u64 {
        self.current_cycle
    }

    /// Program a tile, routing the weights through the quantizer if present.
    pub fn program_weights(&mut self, tile_id: usize, weights: &Array2<f64>) -> Result<()> {
        match self.quantizer.as_mut() {
            Some(q) => {
                let stored = q.round_trip(weights)?;
                self.tiles.program_tile(tile_id, &stored)?;
            }
            None => self.tiles.program_tile(tile_id, weights)?,
        }
        Ok(())
    }

    /// Drive one tile for `timesteps` steps.
    ///
    /// # Errors
    ///
    /// Unknown tile, shape mismatches, and `timesteps == 0`. All of these are
    /// detected before `weights` are programmed.
    pub fn execute_layer(
        &mut self,
        tile_id: usize,
        inputs: &LayerInput,
        weights: Option<&Array2<f64>>,
        timesteps: usize,
    ) -> Result<LayerResult> {
        if timesteps == 0 {
            return Err(EngineError::InvalidLayer {
                index: tile_id,
                reason: "timesteps must be positive".to_string(),
            });
        }
        let size = self.tiles.tile(tile_id)?.size();
        if inputs.width() != size {
            return Err(TileError::VectorLengthMismatch {
                expected: size,
                actual: inputs.width(),
            }
            .into());
        }
        if let Some(w) = weights {
            self.program_weights(tile_id, w)?;
        }

        let tile = self.tiles.tile_mut(tile_id)?;
        let dt = tile.dt();
        let mut outputs = Vec::with_capacity(timesteps);
        for t in 0..timesteps {
            outputs.push(tile.execute_layer(&inputs.step(t), dt)?);
        }

        let total_spikes: usize = outputs.iter().map(Vec::len).sum();
        let statistics = LayerStatistics {
            total_spikes,
            energy_consumed_pj: tile.energy_pj(),
            spike_rate: total_spikes as f64 / (timesteps * tile.size()) as f64,
        };
        debug!(
            "tile {}: {} steps, {} spikes, rate {:.4}",
            tile_id, timesteps, total_spikes, statistics.spike_rate
        );
        Ok(LayerResult {
            tile_id,
            outputs,
            statistics,
        })
    }

    pub fn execute_network(&mut self, layers: &[LayerConfig]) -> Result<NetworkResult> {
        let results = layers
            .iter()
            .map(|l| self.execute_layer(l.tile_id, &l.inputs, l.weights.as_ref(), l.timesteps))
            .collect::<Result<Vec<_>>>()?;
        self.current_cycle += 1;
        Ok(NetworkResult {
            layers: results,
            total_cycles: self.current_cycle,
        })
    }

    /// Queue one task per layer on that layer's tile.
    pub fn submit_network(&mut self, layers: &[LayerConfig]) {
        let base = self.scheduler.completed_tasks().len() + self.scheduler.pending_tasks();
        for (layer_id, layer) in layers.iter().enumerate() {
            self.scheduler
                .enqueue_task(Task::new(base + layer_id, layer.tile_id, layer_id));
        }
    }

    /// Drain the scheduler tile by tile, running each task's layer on the
    /// task's tile, and advance the scheduler one cycle per sweep.
    pub fn run_scheduled(&mut self, layers: &[LayerConfig]) -> Result<Vec<(Task, LayerResult)>> {
        let mut results = Vec::new();
        while !self.scheduler.is_idle() {
            let mut progressed = false;
            for tile_id in 0..self.tiles.num_tiles() {
                let Some(task) = self.scheduler.get_next_task(tile_id) else {
                    continue;
                };
                let layer = layers.get(task.layer_id).ok_or(EngineError::InvalidLayer {
                    index: task.layer_id,
                    reason: format!("task {} references a missing layer", task.task_id),
                })?;
                let result = self.execute_layer(
                    task.tile_id,
                    &layer.inputs,
                    layer.weights.as_ref(),
                    layer.timesteps,
                )?;
                self.scheduler.mark_task_complete(task);
                results.push((task, result));
                progressed = true;
            }
            self.scheduler.advance_cycle();
            if !progressed {
                // Remaining tasks target tiles that do not exist
                let stranded = self.scheduler.pending_tasks();
                return Err(EngineError::InvalidLayer {
                    index: 0,
                    reason: format!("{} queued tasks target unknown tiles", stranded),
                });
            }
        }
        Ok(results)
    }

    pub fn power_report(&self) -> PowerReport {
        let summary = self.tiles.power_summary();
        let total_energy_mj = summary.total_energy_pj * PJ_TO_MJ;
        PowerReport {
            total_energy_mj,
            per_tile_mj: summary.per_tile_pj.iter().map(|e| e * PJ_TO_MJ).collect(),
            efficiency_ops_per_mj: if total_energy_mj > 0.0 {
                1.0 / total_energy_mj
            } else {
                0.0
            },
        }
    }

    /// Clear neuron, power and scheduling state; programmed weights remain.
    pub fn reset(&mut self) {
        self.tiles.reset_all();
        self.scheduler.reset();
        self.current_cycle = 0;
        info!("execution engine reset");
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Compute Tile
//!
//! One crossbar, one neuron cluster and one power monitor. A step is:
//!
//! 1. crossbar read (ADC-quantized column currents)
//! 2. currents x `current_scale` -> neuron integration
//! 3. power monitor update with the step's activity
//!
//! `reset` clears neuron and power state; programmed weights persist.

use ndarray::Array2;
use neuraedge_power::{EnergyBreakdown, PowerMonitor};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cluster::NeuronCluster;
use crate::crossbar::{CrossbarArray, CrossbarConfig};
use crate::error::{Result, TileError};
use crate::lif::LifParameters;

/// Tile construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileConfig {
    pub crossbar: CrossbarConfig,
    pub neuron: LifParameters,
    /// Gain from column current (A) to neuron input
    pub current_scale: f64,
    /// Default integration step (ms)
    pub dt: f64,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            crossbar: CrossbarConfig::default(),
            neuron: LifParameters::default(),
            current_scale: 1e4,
            dt: 1.0,
        }
    }
}

impl TileConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            crossbar: CrossbarConfig::with_size(size),
            ..Default::default()
        }
    }

    pub fn size(&self) -> usize {
        self.crossbar.size
    }

    pub fn validate(&self) -> Result<()> {
        self.crossbar.validate()?;
        self.neuron.validate()?;
        if !(self.current_scale > 0.0) {
            return Err(TileError::InvalidNeuronParameter {
                name: "current_scale",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.dt > 0.0) {
            return Err(TileError::InvalidNeuronParameter {
                name: "dt",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Snapshot of a tile's counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileStatistics {
    pub tile_id: usize,
    pub total_spikes: u64,
    pub steps: u64,
    pub energy_pj: f64,
    pub energy_breakdown: EnergyBreakdown,
    pub membrane_potentials: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Tile {
    id: usize,
    crossbar: CrossbarArray,
    neurons: NeuronCluster,
    power: PowerMonitor,
    current_scale: f64,
    dt: f64,
    last_spikes: Vec<usize>,
    steps: u64,
}

impl Tile {
    pub fn new(id: usize, config: &TileConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id,
            crossbar: CrossbarArray::new(&config.crossbar)?,
            neurons: NeuronCluster::new(config.size(), config.neuron)?,
            power: PowerMonitor::new(),
            current_scale: config.current_scale,
            dt: config.dt,
            last_spikes: Vec::new(),
            steps: 0,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn size(&self) -> usize {
        self.crossbar.size()
    }

    /// Default integration step (ms)
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn program_weights(&mut self, weights: &Array2<f64>) -> Result<()> {
        self.crossbar.program_weights(weights)
    }

    /// Execute one time step and return the indices of the neurons that
    /// fired.
    pub fn execute_layer(&mut self, input: &[f64], dt: f64) -> Result<Vec<usize>> {
        let currents = self.crossbar.read_outputs(input)?;
        let drive: Vec<f64> = currents.iter().map(|c| c * self.current_scale).collect();
        let spikes = self.neurons.integrate(&drive, dt)?;

        let active_inputs = input.iter().filter(|v| v.abs() > 0.0).count();
        self.power
            .add_activity(active_inputs, self.crossbar.size(), spikes.len());

        self.steps += 1;
        trace!(
            "tile {} step {}: {} active inputs, {} spikes",
            self.id,
            self.steps,
            active_inputs,
            spikes.len()
        );
        self.last_spikes.clone_from(&spikes);
        Ok(spikes)
    }

    /// Apply `time_elapsed` ms of conductance drift.
    pub fn update_device_state(&mut self, time_elapsed: f64) {
        self.crossbar.update_drift(time_elapsed);
    }

    pub fn set_temperature(&mut self, temperature_celsius: f64) {
        self.crossbar.set_temperature(temperature_celsius);
    }

    pub fn reset(&mut self) {
        self.neurons.reset();
        self.power.reset();
        self.last_spikes.clear();
        self.steps = 0;
    }

    pub fn last_spikes(&self) -> &[usize] {
        &self.last_spikes
    }

    pub fn crossbar(&self) -> &CrossbarArray {
        &self.crossbar
    }

    pub fn crossbar_mut(&mut self) -> &mut CrossbarArray {
        &mut self.crossbar
    }

    pub fn neurons(&self) -> &NeuronCluster {
        &self.neurons
    }

    pub fn power_monitor(&self) -> &PowerMonitor {
        &self.power
    }

    pub fn energy_pj(&self) -> f64 {
        self.power.total_energy()
    }

    pub fn statistics(&self) -> TileStatistics {
        TileStatistics {
            tile_id: self.id,
            total_spikes: self.neurons.total_spikes(),
            steps: self.steps,
            energy_pj: self.power.total_energy(),
            energy_breakdown: self.power.breakdown(),
            membrane_potentials: self.neurons.membrane_potentials().to_vec(),
        }
    }
}

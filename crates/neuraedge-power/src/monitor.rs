// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-tile energy counters fed by the tile's execution step.

use serde::{Deserialize, Serialize};

/// Calibrated per-operation energies for the tile monitor (pJ)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorCoefficients {
    /// Per active input conversion (8-bit R-2R DAC)
    pub dac_pj: f64,
    /// Per output column read (8-bit SAR ADC)
    pub adc_pj: f64,
    /// Per multiply-accumulate (active input x output column)
    pub crossbar_pj: f64,
    /// Per LIF spike event
    pub neuron_pj: f64,
}

impl Default for MonitorCoefficients {
    fn default() -> Self {
        Self {
            dac_pj: 2.5,
            adc_pj: 4.0,
            crossbar_pj: 0.15,
            neuron_pj: 0.02,
        }
    }
}

/// Energy split by consumer (pJ)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    pub dac_pj: f64,
    pub adc_pj: f64,
    pub crossbar_pj: f64,
    pub neuron_pj: f64,
}

impl EnergyBreakdown {
    pub fn total_pj(&self) -> f64 {
        self.dac_pj + self.adc_pj + self.crossbar_pj + self.neuron_pj
    }
}

/// Accumulates a tile's energy. Totals only grow until `reset`.
#[derive(Debug, Clone, Default)]
pub struct PowerMonitor {
    coefficients: MonitorCoefficients,
    energy: EnergyBreakdown,
    activity_count: u64,
}

impl PowerMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coefficients(coefficients: MonitorCoefficients) -> Self {
        Self {
            coefficients,
            ..Default::default()
        }
    }

    /// Record one execution step.
    ///
    /// * `active_inputs` - input lines with a nonzero drive
    /// * `outputs` - output columns read by the ADC
    /// * `spikes` - neurons that fired
    pub fn add_activity(&mut self, active_inputs: usize, outputs: usize, spikes: usize) {
        let c = &self.coefficients;
        self.energy.dac_pj += active_inputs as f64 * c.dac_pj;
        self.energy.adc_pj += outputs as f64 * c.adc_pj;
        self.energy.crossbar_pj += (active_inputs * outputs) as f64 * c.crossbar_pj;
        self.energy.neuron_pj += spikes as f64 * c.neuron_pj;
        self.activity_count += 1;
    }

    pub fn total_energy(&self) -> f64 {
        self.energy.total_pj()
    }

    pub fn breakdown(&self) -> EnergyBreakdown {
        self.energy
    }

    /// Number of `add_activity` calls since the last reset
    pub fn activity_count(&self) -> u64 {
        self.activity_count
    }

    pub fn coefficients(&self) -> &MonitorCoefficients {
        &self.coefficients
    }

    pub fn reset(&mut self) {
        self.energy = EnergyBreakdown::default();
        self.activity_count = 0;
    }
}

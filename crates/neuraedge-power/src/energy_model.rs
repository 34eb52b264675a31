// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parametric energy formulas for what-if estimation without running the
//! pipeline. All results are in pJ.

use serde::{Deserialize, Serialize};

/// Per-operation energies (pJ)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyCoefficients {
    pub dac_per_access: f64,
    pub adc_per_access: f64,
    /// Per cell read (one input x one output)
    pub crossbar_per_read: f64,
    pub neuron_per_spike: f64,
    pub router_per_packet: f64,
    pub memory_per_access: f64,
}

impl Default for EnergyCoefficients {
    fn default() -> Self {
        Self {
            dac_per_access: 0.1,
            adc_per_access: 0.15,
            crossbar_per_read: 0.05,
            neuron_per_spike: 0.05,
            router_per_packet: 0.02,
            memory_per_access: 0.08,
        }
    }
}

/// Activity of one operation fed to `EnergyModel::total_energy`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationActivity {
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub matrix_size: usize,
    pub num_reads: usize,
    pub num_spikes: usize,
    pub num_memory_ops: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyModel {
    coefficients: EnergyCoefficients,
}

impl EnergyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coefficients(coefficients: EnergyCoefficients) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &EnergyCoefficients {
        &self.coefficients
    }

    pub fn energy_dac(&self, num_inputs: usize, num_accesses: usize) -> f64 {
        (num_inputs * num_accesses) as f64 * self.coefficients.dac_per_access
    }

    pub fn energy_adc(&self, num_outputs: usize, num_reads: usize) -> f64 {
        (num_outputs * num_reads) as f64 * self.coefficients.adc_per_access
    }

    /// Read energy of a `matrix_size x matrix_size` crossbar
    pub fn energy_crossbar(&self, matrix_size: usize, num_reads: usize) -> f64 {
        (matrix_size * matrix_size * num_reads) as f64 * self.coefficients.crossbar_per_read
    }

    pub fn energy_neurons(&self, num_spikes: usize) -> f64 {
        num_spikes as f64 * self.coefficients.neuron_per_spike
    }

    pub fn energy_routing(&self, num_packets: usize) -> f64 {
        num_packets as f64 * self.coefficients.router_per_packet
    }

    pub fn energy_memory(&self, num_reads: usize, num_writes: usize) -> f64 {
        (num_reads + num_writes) as f64 * self.coefficients.memory_per_access
    }

    /// DAC + ADC + crossbar + neuron + memory energy of one operation
    pub fn total_energy(&self, activity: &OperationActivity) -> f64 {
        self.energy_dac(activity.num_inputs, activity.num_reads)
            + self.energy_adc(activity.num_outputs, activity.num_reads)
            + self.energy_crossbar(activity.matrix_size, activity.num_reads)
            + self.energy_neurons(activity.num_spikes)
            + self.energy_memory(activity.num_memory_ops, 0)
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Instantaneous power from assumed activity and clock frequency.
//!
//! ```text
//! E_cycle (pJ) = EnergyModel::total_energy(N inputs, N outputs, N x N,
//!                                          reads = floor(activity * N),
//!                                          spikes = floor(spike_rate * N))
//! P (mW)       = E_cycle * f_MHz * 1e-3 * voltage_factor
//! ```
//! (1 pJ per cycle at 1 MHz is 1 uW.)

use tracing::debug;

use crate::energy_model::{EnergyModel, OperationActivity};
use crate::error::{PowerError, Result};
use crate::voltage::VoltageModel;

#[derive(Debug, Clone, Default)]
pub struct PowerEstimator {
    energy_model: EnergyModel,
    voltage: Option<VoltageModel>,
    measurements: Vec<f64>,
    current_power_mw: f64,
}

fn check_rate(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PowerError::InvalidParameter {
            name,
            reason: format!("{} is outside [0, 1]", value),
        });
    }
    Ok(())
}

impl PowerEstimator {
    pub fn new(energy_model: EnergyModel) -> Self {
        Self {
            energy_model,
            ..Default::default()
        }
    }

    /// Scale every estimate by the voltage model's power factor.
    pub fn with_voltage_model(mut self, voltage: VoltageModel) -> Self {
        self.voltage = Some(voltage);
        self
    }

    pub fn voltage_model_mut(&mut self) -> Option<&mut VoltageModel> {
        self.voltage.as_mut()
    }

    /// Energy of one clock cycle (pJ) at the given activity.
    pub fn energy_per_cycle(&self, activity_rate: f64, matrix_size: usize, spike_rate: f64) -> f64 {
        let activity = OperationActivity {
            num_inputs: matrix_size,
            num_outputs: matrix_size,
            matrix_size,
            num_reads: (activity_rate * matrix_size as f64) as usize,
            num_spikes: (spike_rate * matrix_size as f64) as usize,
            num_memory_ops: 0,
        };
        self.energy_model.total_energy(&activity)
    }

    /// Estimate power (mW) and append it to the measurement history.
    ///
    /// # Errors
    ///
    /// Rates must lie in [0, 1] and the frequency must be positive.
    pub fn estimate_power(
        &mut self,
        activity_rate: f64,
        matrix_size: usize,
        spike_rate: f64,
        frequency_mhz: f64,
    ) -> Result<f64> {
        check_rate("activity_rate", activity_rate)?;
        check_rate("spike_rate", spike_rate)?;
        if frequency_mhz <= 0.0 {
            return Err(PowerError::InvalidParameter {
                name: "frequency_mhz",
                reason: "must be positive".to_string(),
            });
        }

        let energy_pj = self.energy_per_cycle(activity_rate, matrix_size, spike_rate);
        let scale = self
            .voltage
            .as_ref()
            .map_or(1.0, VoltageModel::power_scaling_factor);
        let power_mw = energy_pj * frequency_mhz * 1e-3 * scale;

        debug!(
            "Power estimate: {:.3} pJ/cycle @ {} MHz -> {:.4} mW",
            energy_pj, frequency_mhz, power_mw
        );
        self.current_power_mw = power_mw;
        self.measurements.push(power_mw);
        Ok(power_mw)
    }

    pub fn current_power(&self) -> f64 {
        self.current_power_mw
    }

    pub fn average_power(&self) -> f64 {
        if self.measurements.is_empty() {
            return 0.0;
        }
        self.measurements.iter().sum::<f64>() / self.measurements.len() as f64
    }

    pub fn peak_power(&self) -> f64 {
        self.measurements.iter().copied().fold(0.0, f64::max)
    }

    pub fn measurements(&self) -> &[f64] {
        &self.measurements
    }

    pub fn reset(&mut self) {
        self.measurements.clear();
        self.current_power_mw = 0.0;
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! First-order RC model of junction temperature.

/// Thermal time constant (s)
const TAU_THERMAL_S: f64 = 0.1;

/// Reference temperature for the parameter coefficients (degC)
const REFERENCE_TEMP_C: f64 = 25.0;

/// Device parameters with a temperature coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureParameter {
    /// -0.1 % per degC
    Conductance,
    /// +5 % per degC
    Leakage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalModel {
    ambient_temp: f64,
    /// Junction-to-ambient thermal resistance (degC/W)
    rja: f64,
    junction_temp: f64,
    power_watts: f64,
}

impl Default for ThermalModel {
    fn default() -> Self {
        Self::new(25.0, 10.0)
    }
}

impl ThermalModel {
    pub fn new(ambient_temp: f64, junction_to_ambient_resistance: f64) -> Self {
        Self {
            ambient_temp,
            rja: junction_to_ambient_resistance,
            junction_temp: ambient_temp,
            power_watts: 0.0,
        }
    }

    /// Move junction temperature towards `T_amb + P * R_ja`.
    pub fn update(&mut self, power_watts: f64, time_step_seconds: f64) {
        self.power_watts = power_watts;
        let steady_state = self.ambient_temp + power_watts * self.rja;
        let alpha = 1.0 - (-time_step_seconds / TAU_THERMAL_S).exp();
        self.junction_temp += (steady_state - self.junction_temp) * alpha;
    }

    pub fn temperature(&self) -> f64 {
        self.junction_temp
    }

    pub fn power_watts(&self) -> f64 {
        self.power_watts
    }

    pub fn temperature_coefficient(&self, parameter: TemperatureParameter) -> f64 {
        let excess = self.junction_temp - REFERENCE_TEMP_C;
        match parameter {
            TemperatureParameter::Conductance => 1.0 - 0.001 * excess,
            TemperatureParameter::Leakage => 1.0 + 0.05 * excess,
        }
    }

    pub fn reset(&mut self) {
        self.junction_temp = self.ambient_temp;
        self.power_watts = 0.0;
    }
}

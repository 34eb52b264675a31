// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Supply-voltage scaling of power, frequency and delay.

use crate::error::{PowerError, Result};

/// Lowest supply voltage the model accepts (V)
pub const MIN_SUPPLY_VOLTAGE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageModel {
    nominal_voltage: f64,
    current_voltage: f64,
}

impl Default for VoltageModel {
    fn default() -> Self {
        Self {
            nominal_voltage: 0.8,
            current_voltage: 0.8,
        }
    }
}

impl VoltageModel {
    pub fn new(nominal_voltage: f64) -> Result<Self> {
        if nominal_voltage <= 0.0 {
            return Err(PowerError::InvalidParameter {
                name: "nominal_voltage",
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self {
            nominal_voltage,
            current_voltage: nominal_voltage,
        })
    }

    pub fn set_voltage(&mut self, voltage: f64) -> Result<()> {
        if voltage < MIN_SUPPLY_VOLTAGE {
            return Err(PowerError::VoltageTooLow {
                voltage,
                min: MIN_SUPPLY_VOLTAGE,
            });
        }
        self.current_voltage = voltage;
        Ok(())
    }

    pub fn voltage(&self) -> f64 {
        self.current_voltage
    }

    pub fn nominal_voltage(&self) -> f64 {
        self.nominal_voltage
    }

    fn ratio(&self) -> f64 {
        self.current_voltage / self.nominal_voltage
    }

    /// Dynamic power goes with V^2, leakage roughly with V.
    pub fn power_scaling_factor(&self) -> f64 {
        let r = self.ratio();
        0.7 * r * r + 0.3 * r
    }

    /// Frequency multiplier, floored at 50 %
    pub fn frequency_scaling_factor(&self) -> f64 {
        (self.ratio() - 0.2).max(0.5)
    }

    pub fn delay_scaling_factor(&self) -> f64 {
        1.0 / self.frequency_scaling_factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_power_factor_is_unity() {
        let v = VoltageModel::default();
        assert!((v.power_scaling_factor() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_undervolt_reduces_power_and_frequency() {
        let mut v = VoltageModel::new(1.0).unwrap();
        v.set_voltage(0.6).unwrap();
        assert!((v.power_scaling_factor() - (0.7 * 0.36 + 0.18)).abs() < 1e-12);
        assert!((v.frequency_scaling_factor() - 0.5).abs() < 1e-12);
        assert!((v.delay_scaling_factor() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_low_voltage_rejected() {
        let mut v = VoltageModel::default();
        assert!(matches!(
            v.set_voltage(0.4),
            Err(PowerError::VoltageTooLow { .. })
        ));
        assert_eq!(v.voltage(), 0.8);
    }
}

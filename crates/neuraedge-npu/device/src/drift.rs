// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time and temperature degradation of programmed conductance.

/// Reference temperature for read derating (degC)
pub const REFERENCE_TEMPERATURE_C: f64 = 25.0;

/// Fractional read-current loss per 100 degC above reference
pub const TEMPERATURE_COEFFICIENT: f64 = 0.001;

/// Conductance lost over `time_elapsed` (ms): `G * coef * t / 1000`.
#[inline]
pub fn conductance_drift(conductance: f64, drift_coefficient: f64, time_elapsed: f64) -> f64 {
    conductance * drift_coefficient * (time_elapsed / 1000.0)
}

/// Read derating factor `1 - 0.001 * (T - 25) / 100`.
#[inline]
pub fn temperature_factor(temperature_celsius: f64) -> f64 {
    1.0 - TEMPERATURE_COEFFICIENT * (temperature_celsius - REFERENCE_TEMPERATURE_C) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_scales_with_time() {
        let d1 = conductance_drift(1e-4, 0.05, 100.0);
        let d2 = conductance_drift(1e-4, 0.05, 200.0);
        assert!((d1 - 5e-7).abs() < 1e-15);
        assert!((d2 - 2.0 * d1).abs() < 1e-15);
    }

    #[test]
    fn test_temperature_factor_reference_is_unity() {
        assert!((temperature_factor(25.0) - 1.0).abs() < 1e-12);
        assert!(temperature_factor(125.0) < 1.0);
        assert!(temperature_factor(-75.0) > 1.0);
    }
}

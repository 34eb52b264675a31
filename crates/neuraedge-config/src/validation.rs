// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module checks that configuration values are within the ranges the
//! simulator can represent (tile ids fit the 8-bit packet field, neuron ids
//! fit 16 bits, conductance bounds are ordered) and that every enumerated
//! setting uses an accepted spelling.

use crate::{ConfigError, ConfigResult, NeuraEdgeConfig};

/// Largest tile count addressable by the 8-bit source/destination packet fields
pub const MAX_TILES: usize = 256;

/// Largest tile size addressable by the 16-bit neuron packet field
pub const MAX_TILE_SIZE: usize = 65_536;

pub const DEVICE_TYPES: &[&str] = &["reram", "pcm", "sram"];
pub const COMPUTE_MODES: &[&str] = &["snn", "dense", "hybrid"];
pub const QUANTIZATION_BITS: &[u32] = &[4, 8, 16];
pub const DELIVERY_POLICIES: &[&str] = &["broadcast", "neighbors", "feedforward"];
pub const ARBITRATION_POLICIES: &[&str] = &["round_robin", "priority", "fifo"];
pub const SCHEDULING_POLICIES: &[&str] = &["fifo", "priority"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    OutOfRange { field: String, value: String, range: String },
    UnknownChoice { field: String, value: String, allowed: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value, range } => {
                write!(f, "{} = {} is outside valid range ({})", field, value, range)
            }
            Self::UnknownChoice {
                field,
                value,
                allowed,
            } => {
                write!(f, "{} = '{}' is not one of: {}", field, value, allowed)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation found
pub fn validate_config(config: &NeuraEdgeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_platform(config, &mut errors);
    validate_device(config, &mut errors);
    validate_periphery(config, &mut errors);
    validate_choices(config, &mut errors);
    validate_power(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_platform(config: &NeuraEdgeConfig, errors: &mut Vec<ConfigValidationError>) {
    let platform = &config.platform;
    if platform.num_tiles == 0 || platform.num_tiles > MAX_TILES {
        errors.push(ConfigValidationError::OutOfRange {
            field: "platform.num_tiles".to_string(),
            value: platform.num_tiles.to_string(),
            range: format!("1-{}", MAX_TILES),
        });
    }
    if platform.tile_size == 0 || platform.tile_size > MAX_TILE_SIZE {
        errors.push(ConfigValidationError::OutOfRange {
            field: "platform.tile_size".to_string(),
            value: platform.tile_size.to_string(),
            range: format!("1-{}", MAX_TILE_SIZE),
        });
    }
    if platform.timesteps == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "platform.timesteps".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if !QUANTIZATION_BITS.contains(&platform.quantization_bits) {
        errors.push(ConfigValidationError::UnknownChoice {
            field: "platform.quantization_bits".to_string(),
            value: platform.quantization_bits.to_string(),
            allowed: "4, 8, 16".to_string(),
        });
    }
}

fn validate_device(config: &NeuraEdgeConfig, errors: &mut Vec<ConfigValidationError>) {
    let device = &config.device;
    if !(device.min_conductance > 0.0 && device.min_conductance < device.max_conductance) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "device.min_conductance".to_string(),
            reason: "must satisfy 0 < min_conductance < max_conductance".to_string(),
        });
    }
    if !(0.0..=1.0).contains(&device.fault_rate) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "device.fault_rate".to_string(),
            value: device.fault_rate.to_string(),
            range: "0.0-1.0".to_string(),
        });
    }
}

fn validate_periphery(config: &NeuraEdgeConfig, errors: &mut Vec<ConfigValidationError>) {
    for (field, bits) in [
        ("crossbar.adc_bits", config.crossbar.adc_bits),
        ("crossbar.dac_bits", config.crossbar.dac_bits),
    ] {
        if bits == 0 || bits > 16 {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                value: bits.to_string(),
                range: "1-16".to_string(),
            });
        }
    }
    if !(config.crossbar.ir_drop_factor > 0.0 && config.crossbar.ir_drop_factor <= 1.0) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "crossbar.ir_drop_factor".to_string(),
            value: config.crossbar.ir_drop_factor.to_string(),
            range: "(0.0, 1.0]".to_string(),
        });
    }

    let neuron = &config.neuron;
    for (field, value) in [
        ("neuron.threshold", neuron.threshold),
        ("neuron.tau_membrane", neuron.tau_membrane),
        ("neuron.dt", neuron.dt),
        ("neuron.current_scale", neuron.current_scale),
    ] {
        if value <= 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "must be positive".to_string(),
            });
        }
    }
    if neuron.refractory_period < 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "neuron.refractory_period".to_string(),
            reason: "must not be negative".to_string(),
        });
    }
}

fn check_choice(
    field: &str,
    value: &str,
    allowed: &[&str],
    errors: &mut Vec<ConfigValidationError>,
) {
    if !allowed.contains(&value) {
        errors.push(ConfigValidationError::UnknownChoice {
            field: field.to_string(),
            value: value.to_string(),
            allowed: allowed.join(", "),
        });
    }
}

fn validate_choices(config: &NeuraEdgeConfig, errors: &mut Vec<ConfigValidationError>) {
    check_choice("platform.device_type", &config.platform.device_type, DEVICE_TYPES, errors);
    check_choice("platform.mode", &config.platform.mode, COMPUTE_MODES, errors);
    check_choice("routing.delivery", &config.routing.delivery, DELIVERY_POLICIES, errors);
    check_choice(
        "routing.arbitration",
        &config.routing.arbitration,
        ARBITRATION_POLICIES,
        errors,
    );
    check_choice("scheduler.policy", &config.scheduler.policy, SCHEDULING_POLICIES, errors);
}

fn validate_power(config: &NeuraEdgeConfig, errors: &mut Vec<ConfigValidationError>) {
    let power = &config.power;
    if power.frequency_mhz <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "power.frequency_mhz".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if power.nominal_voltage <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "power.nominal_voltage".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if power.supply_voltage < 0.5 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "power.supply_voltage".to_string(),
            reason: "must be at least 0.5 V".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NeuraEdgeConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_too_many_tiles() {
        let mut config = NeuraEdgeConfig::default();
        config.platform.num_tiles = 300;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("platform.num_tiles"));
            assert!(msg.contains("1-256"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_unknown_device_type() {
        let mut config = NeuraEdgeConfig::default();
        config.platform.device_type = "flash".to_string();

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("platform.device_type"));
            assert!(msg.contains("reram"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_invalid_mode_and_bits_reported_together() {
        let mut config = NeuraEdgeConfig::default();
        config.platform.mode = "quantum".to_string();
        config.platform.quantization_bits = 3;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("platform.mode"));
            assert!(msg.contains("platform.quantization_bits"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_inverted_conductance_bounds() {
        let mut config = NeuraEdgeConfig::default();
        config.device.min_conductance = 1e-3;

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_low_supply_voltage() {
        let mut config = NeuraEdgeConfig::default();
        config.power.supply_voltage = 0.3;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("power.supply_voltage"));
        } else {
            panic!("expected validation error");
        }
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `neuraedge.toml`. Enumerated settings (device type, compute mode, delivery
//! policy, ...) are kept as strings here and parsed by the crates that own
//! the corresponding enums; `validate_config` checks the accepted spellings.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuraEdgeConfig {
    pub platform: PlatformConfig,
    pub device: DeviceSettings,
    pub crossbar: CrossbarSettings,
    pub neuron: NeuronSettings,
    pub routing: RoutingSettings,
    pub scheduler: SchedulerSettings,
    pub power: PowerSettings,
    pub memory: MemorySettings,
    pub logging: LoggingConfig,
}

/// Platform shape and execution defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub num_tiles: usize,
    pub tile_size: usize,
    /// "reram", "pcm" or "sram"
    pub device_type: String,
    /// "snn", "dense" or "hybrid"
    pub mode: String,
    pub timesteps: usize,
    /// 4, 8 or 16
    pub quantization_bits: u32,
    /// Seed for every stochastic component; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            num_tiles: 4,
            tile_size: 64,
            device_type: "reram".to_string(),
            mode: "snn".to_string(),
            timesteps: 100,
            quantization_bits: 8,
            seed: None,
        }
    }
}

/// Resistive device parameters shared by every crossbar cell
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub max_conductance: f64,
    pub min_conductance: f64,
    pub noise_enabled: bool,
    pub drift_enabled: bool,
    pub temperature_celsius: f64,
    pub enable_stuck_at_faults: bool,
    pub fault_rate: f64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            max_conductance: 1e-4,
            min_conductance: 1e-6,
            noise_enabled: true,
            drift_enabled: true,
            temperature_celsius: 25.0,
            enable_stuck_at_faults: false,
            fault_rate: 0.001,
        }
    }
}

/// Crossbar periphery (converters and IR drop)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrossbarSettings {
    pub adc_bits: u32,
    pub dac_bits: u32,
    pub ir_drop_enabled: bool,
    pub ir_drop_factor: f64,
}

impl Default for CrossbarSettings {
    fn default() -> Self {
        Self {
            adc_bits: 8,
            dac_bits: 8,
            ir_drop_enabled: true,
            ir_drop_factor: 0.95,
        }
    }
}

/// LIF neuron parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuronSettings {
    pub threshold: f64,
    /// Membrane time constant (ms)
    pub tau_membrane: f64,
    /// Refractory period (ms)
    pub refractory_period: f64,
    /// Gain from crossbar output current (A) to neuron input
    pub current_scale: f64,
    /// Integration step (ms)
    pub dt: f64,
}

impl Default for NeuronSettings {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            tau_membrane: 20.0,
            refractory_period: 2.0,
            current_scale: 1e4,
            dt: 1.0,
        }
    }
}

/// Inter-tile spike transport
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// "broadcast", "neighbors" or "feedforward"
    pub delivery: String,
    /// "round_robin", "priority" or "fifo"
    pub arbitration: String,
    /// Per-destination queue capacity (0 = unbounded)
    pub max_queue_depth: usize,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            delivery: "neighbors".to_string(),
            arbitration: "round_robin".to_string(),
            max_queue_depth: 0,
        }
    }
}

/// Task scheduling
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// "fifo" or "priority"
    pub policy: String,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            policy: "fifo".to_string(),
        }
    }
}

/// Power estimation parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PowerSettings {
    pub frequency_mhz: f64,
    pub nominal_voltage: f64,
    pub supply_voltage: f64,
    pub ambient_temp_celsius: f64,
    /// Junction-to-ambient thermal resistance (degC/W)
    pub thermal_resistance: f64,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            frequency_mhz: 100.0,
            nominal_voltage: 0.8,
            supply_voltage: 0.8,
            ambient_temp_celsius: 25.0,
            thermal_resistance: 10.0,
        }
    }
}

/// On-chip memory sizes
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MemorySettings {
    pub tile_buffer_kb: usize,
    pub global_sram_kb: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            tile_buffer_kb: 16,
            global_sram_kb: 256,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

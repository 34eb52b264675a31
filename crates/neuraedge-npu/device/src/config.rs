// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Device configuration and factory

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::drift::REFERENCE_TEMPERATURE_C;
use crate::error::{DeviceError, Result};
use crate::model::{Device, DeviceKind, StuckAt};
use crate::noise::RandomTelegraphNoise;

/// Random telegraph noise parameters (amplitude relative to conductance)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelegraphNoiseConfig {
    pub relative_amplitude: f64,
    pub switch_probability: f64,
}

/// Parameters applied to every cell of a crossbar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub device_type: DeviceKind,
    pub max_conductance: f64,
    pub min_conductance: f64,
    pub noise_enabled: bool,
    pub drift_enabled: bool,
    pub temperature_celsius: f64,
    pub enable_stuck_at_faults: bool,
    /// Probability that a cell is stuck (only with `enable_stuck_at_faults`)
    pub fault_rate: f64,
    pub telegraph_noise: Option<TelegraphNoiseConfig>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceKind::ReRam,
            max_conductance: 1e-4,
            min_conductance: 1e-6,
            noise_enabled: true,
            drift_enabled: true,
            temperature_celsius: REFERENCE_TEMPERATURE_C,
            enable_stuck_at_faults: false,
            fault_rate: 0.001,
            telegraph_noise: None,
        }
    }
}

impl DeviceConfig {
    pub fn new(device_type: DeviceKind) -> Self {
        Self {
            device_type,
            ..Default::default()
        }
    }

    /// Noise-free, drift-free cells; used for deterministic reads.
    pub fn ideal(device_type: DeviceKind) -> Self {
        Self {
            device_type,
            noise_enabled: false,
            drift_enabled: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_conductance > 0.0 && self.min_conductance < self.max_conductance) {
            return Err(DeviceError::InvalidConductanceBounds {
                min: self.min_conductance,
                max: self.max_conductance,
            });
        }
        if !(0.0..=1.0).contains(&self.fault_rate) {
            return Err(DeviceError::InvalidParameter {
                name: "fault_rate",
                reason: format!("{} is outside [0, 1]", self.fault_rate),
            });
        }
        if let Some(rtn) = &self.telegraph_noise {
            if !(0.0..=1.0).contains(&rtn.switch_probability) {
                return Err(DeviceError::InvalidParameter {
                    name: "telegraph_noise.switch_probability",
                    reason: format!("{} is outside [0, 1]", rtn.switch_probability),
                });
            }
        }
        Ok(())
    }
}

/// Builds devices from a `DeviceConfig`.
pub struct DeviceFactory;

impl DeviceFactory {
    /// Create a healthy device.
    pub fn create(config: &DeviceConfig) -> Result<Device> {
        config.validate()?;
        let device = Device::new(
            config.device_type,
            config.min_conductance,
            config.max_conductance,
        )?
        .with_noise(config.noise_enabled)
        .with_drift(config.drift_enabled)
        .with_temperature(config.temperature_celsius);
        Ok(device)
    }

    /// Create a device, drawing a stuck-at fault with probability
    /// `fault_rate` when faults are enabled, and a telegraph-noise source
    /// when configured.
    pub fn create_sampled<R: Rng + ?Sized>(config: &DeviceConfig, rng: &mut R) -> Result<Device> {
        let device = Self::create(config)?;
        Ok(Self::with_sampled_defects(device, config, rng))
    }

    /// Apply the per-cell random defects of `config` to an already
    /// validated device.
    pub fn with_sampled_defects<R: Rng + ?Sized>(
        mut device: Device,
        config: &DeviceConfig,
        rng: &mut R,
    ) -> Device {
        if let Some(rtn) = &config.telegraph_noise {
            device = device.with_telegraph_noise(RandomTelegraphNoise::new(
                rtn.relative_amplitude,
                rtn.switch_probability,
                rng,
            ));
        }
        if config.enable_stuck_at_faults && rng.gen::<f64>() < config.fault_rate {
            let fault = if rng.gen_bool(0.5) {
                StuckAt::High
            } else {
                StuckAt::Low
            };
            debug!("{} cell stuck at {:?}", config.device_type, fault);
            device = device.with_stuck_at(fault);
        }
        device
    }

    /// Parse a device type name and create a default-configured device.
    pub fn from_name(name: &str) -> Result<Device> {
        let kind: DeviceKind = name.parse()?;
        Self::create(&DeviceConfig::new(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceModel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_factory_selects_variant() {
        for (name, kind) in [
            ("reram", DeviceKind::ReRam),
            ("pcm", DeviceKind::Pcm),
            ("sram", DeviceKind::Sram),
        ] {
            let d = DeviceFactory::from_name(name).unwrap();
            assert_eq!(d.kind(), kind);
            assert_eq!(d.model_name(), kind.name());
        }
        assert!(DeviceFactory::from_name("mram").is_err());
    }

    #[test]
    fn test_ideal_config_disables_noise() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut d = DeviceFactory::create(&DeviceConfig::ideal(DeviceKind::ReRam)).unwrap();
        assert_eq!(d.inject_noise(&mut rng), 0.0);
    }

    #[test]
    fn test_fault_rate_one_always_faulty() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = DeviceConfig {
            enable_stuck_at_faults: true,
            fault_rate: 1.0,
            ..Default::default()
        };
        for _ in 0..20 {
            assert!(DeviceFactory::create_sampled(&config, &mut rng)
                .unwrap()
                .is_faulty());
        }
    }

    #[test]
    fn test_faults_disabled_never_faulty() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = DeviceConfig {
            enable_stuck_at_faults: false,
            fault_rate: 1.0,
            ..Default::default()
        };
        assert!(!DeviceFactory::create_sampled(&config, &mut rng)
            .unwrap()
            .is_faulty());
    }

    #[test]
    fn test_invalid_fault_rate() {
        let config = DeviceConfig {
            fault_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            DeviceFactory::create(&config),
            Err(DeviceError::InvalidParameter { name: "fault_rate", .. })
        ));
    }
}

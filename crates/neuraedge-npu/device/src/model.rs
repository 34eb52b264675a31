// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Resistive Device Model
//!
//! One crossbar cell. Every variant shares the same four operations and only
//! differs in constants and in the read-noise distribution:
//!
//! ```text
//! variant  drift coef  sigma   read I(V)               read noise
//! ReRAM    0.001       0.02    G*V + 0.1*V^2*G         N(0, sigma*G)
//! PCM      0.05        0.03    G*V                     (LogN(0, sigma/2) - 1) * G
//! SRAM     0.0001      0.001   G*V                     N(0, sigma*G)
//!
//! program(target): G = clip(clip(target) + N(0, sigma*target))
//! update_drift(t): G = clip(G - G*coef*t/1000)
//! ```
//!
//! Devices are plain values so a crossbar can hold them in a dense 2D array.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

use crate::drift::{conductance_drift, temperature_factor, REFERENCE_TEMPERATURE_C};
use crate::error::{DeviceError, Result};
use crate::noise::{gaussian, lognormal_minus_one, RandomTelegraphNoise};

/// ReRAM read nonlinearity coefficient
const RERAM_NONLINEARITY: f64 = 0.1;

/// Device technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    ReRam,
    Pcm,
    Sram,
}

impl DeviceKind {
    pub fn drift_coefficient(self) -> f64 {
        match self {
            DeviceKind::ReRam => 0.001,
            DeviceKind::Pcm => 0.05,
            DeviceKind::Sram => 0.0001,
        }
    }

    /// Relative programming/read noise standard deviation
    pub fn noise_std(self) -> f64 {
        match self {
            DeviceKind::ReRam => 0.02,
            DeviceKind::Pcm => 0.03,
            DeviceKind::Sram => 0.001,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceKind::ReRam => "ReRAM",
            DeviceKind::Pcm => "PCM",
            DeviceKind::Sram => "SRAM",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceKind {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reram" => Ok(DeviceKind::ReRam),
            "pcm" => Ok(DeviceKind::Pcm),
            "sram" => Ok(DeviceKind::Sram),
            other => Err(DeviceError::UnknownDeviceType(other.to_string())),
        }
    }
}

/// Permanent cell failure: the cell ignores programming and drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StuckAt {
    Low,
    High,
}

/// Capability set shared by every device variant.
pub trait DeviceModel {
    fn model_name(&self) -> &'static str;

    /// Program towards `target` and return the conductance actually stored.
    fn program<R: Rng + ?Sized>(&mut self, target: f64, rng: &mut R) -> f64;

    /// Read current at the applied voltage (noise-free).
    fn read(&self, voltage: f64) -> f64;

    /// Decay conductance over `time_elapsed` milliseconds.
    fn update_drift(&mut self, time_elapsed: f64);

    /// Independent per-read current perturbation. Never changes conductance.
    fn inject_noise<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64;

    fn conductance(&self) -> f64;
}

/// One programmable resistive cell
#[derive(Debug, Clone)]
pub struct Device {
    kind: DeviceKind,
    conductance: f64,
    min_conductance: f64,
    max_conductance: f64,
    drift_coefficient: f64,
    noise_std: f64,
    noise_enabled: bool,
    drift_enabled: bool,
    temperature_celsius: f64,
    stuck_at: Option<StuckAt>,
    telegraph: Option<RandomTelegraphNoise>,
    program_count: u64,
}

impl Device {
    /// Create a device at the midpoint of its conductance range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConductanceBounds` unless `0 < min < max`.
    pub fn new(kind: DeviceKind, min_conductance: f64, max_conductance: f64) -> Result<Self> {
        if !(min_conductance > 0.0 && min_conductance < max_conductance) {
            return Err(DeviceError::InvalidConductanceBounds {
                min: min_conductance,
                max: max_conductance,
            });
        }
        Ok(Self {
            kind,
            conductance: (max_conductance + min_conductance) / 2.0,
            min_conductance,
            max_conductance,
            drift_coefficient: kind.drift_coefficient(),
            noise_std: kind.noise_std(),
            noise_enabled: true,
            drift_enabled: true,
            temperature_celsius: REFERENCE_TEMPERATURE_C,
            stuck_at: None,
            telegraph: None,
            program_count: 0,
        })
    }

    pub fn with_noise(mut self, enabled: bool) -> Self {
        self.noise_enabled = enabled;
        self
    }

    pub fn with_drift(mut self, enabled: bool) -> Self {
        self.drift_enabled = enabled;
        self
    }

    pub fn with_temperature(mut self, temperature_celsius: f64) -> Self {
        self.temperature_celsius = temperature_celsius;
        self
    }

    pub fn with_telegraph_noise(mut self, telegraph: RandomTelegraphNoise) -> Self {
        self.telegraph = Some(telegraph);
        self
    }

    /// Mark the cell as stuck; conductance jumps to the matching bound.
    pub fn with_stuck_at(mut self, fault: StuckAt) -> Self {
        self.conductance = match fault {
            StuckAt::Low => self.min_conductance,
            StuckAt::High => self.max_conductance,
        };
        self.stuck_at = Some(fault);
        self
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn min_conductance(&self) -> f64 {
        self.min_conductance
    }

    pub fn max_conductance(&self) -> f64 {
        self.max_conductance
    }

    pub fn drift_coefficient(&self) -> f64 {
        self.drift_coefficient
    }

    pub fn noise_std(&self) -> f64 {
        self.noise_std
    }

    pub fn stuck_at(&self) -> Option<StuckAt> {
        self.stuck_at
    }

    pub fn is_faulty(&self) -> bool {
        self.stuck_at.is_some()
    }

    /// Number of accepted programming pulses
    pub fn program_count(&self) -> u64 {
        self.program_count
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    pub fn set_temperature(&mut self, temperature_celsius: f64) {
        self.temperature_celsius = temperature_celsius;
    }

    pub fn set_noise_enabled(&mut self, enabled: bool) {
        self.noise_enabled = enabled;
    }

    pub fn set_drift_enabled(&mut self, enabled: bool) {
        self.drift_enabled = enabled;
    }

    #[inline]
    fn clip(&self, value: f64) -> f64 {
        value.clamp(self.min_conductance, self.max_conductance)
    }
}

impl DeviceModel for Device {
    fn model_name(&self) -> &'static str {
        self.kind.name()
    }

    fn program<R: Rng + ?Sized>(&mut self, target: f64, rng: &mut R) -> f64 {
        if self.stuck_at.is_some() {
            return self.conductance;
        }
        let target = self.clip(target);
        let variation = if self.noise_enabled {
            gaussian(rng, self.noise_std * target)
        } else {
            0.0
        };
        self.conductance = self.clip(target + variation);
        self.program_count += 1;
        trace!(
            "[{}] programmed target={:.3e} actual={:.3e}",
            self.kind,
            target,
            self.conductance
        );
        self.conductance
    }

    #[inline]
    fn read(&self, voltage: f64) -> f64 {
        let g = self.conductance;
        let current = match self.kind {
            DeviceKind::ReRam => g * voltage + RERAM_NONLINEARITY * voltage * voltage * g,
            DeviceKind::Pcm | DeviceKind::Sram => g * voltage,
        };
        current * temperature_factor(self.temperature_celsius)
    }

    fn update_drift(&mut self, time_elapsed: f64) {
        if !self.drift_enabled || self.stuck_at.is_some() {
            return;
        }
        let drift = conductance_drift(self.conductance, self.drift_coefficient, time_elapsed);
        self.conductance = self.clip(self.conductance - drift);
    }

    fn inject_noise<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        if !self.noise_enabled {
            return 0.0;
        }
        let g = self.conductance;
        let base = match self.kind {
            DeviceKind::Pcm => lognormal_minus_one(rng, self.noise_std * 0.5) * g,
            DeviceKind::ReRam | DeviceKind::Sram => gaussian(rng, self.noise_std * g),
        };
        let telegraph = match self.telegraph.as_mut() {
            Some(rtn) => rtn.sample(rng) * g,
            None => 0.0,
        };
        base + telegraph
    }

    #[inline]
    fn conductance(&self) -> f64 {
        self.conductance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn reram() -> Device {
        Device::new(DeviceKind::ReRam, 1e-6, 1e-4).unwrap()
    }

    #[test]
    fn test_initial_conductance_is_midpoint() {
        let d = reram();
        assert!((d.conductance() - (1e-4 + 1e-6) / 2.0).abs() < 1e-18);
        assert_eq!(d.program_count(), 0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(matches!(
            Device::new(DeviceKind::Pcm, 1e-4, 1e-6),
            Err(DeviceError::InvalidConductanceBounds { .. })
        ));
        assert!(Device::new(DeviceKind::Pcm, 0.0, 1e-6).is_err());
    }

    #[test]
    fn test_program_without_noise_is_exact() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut d = reram().with_noise(false);
        assert_eq!(d.program(5e-5, &mut rng), 5e-5);
        assert_eq!(d.program(1.0, &mut rng), 1e-4);
        assert_eq!(d.program(-1.0, &mut rng), 1e-6);
        assert_eq!(d.program_count(), 3);
    }

    #[test]
    fn test_program_with_noise_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut d = Device::new(DeviceKind::Pcm, 1e-6, 1e-4).unwrap();
        for i in 0..500 {
            let target = (i as f64 / 500.0) * 2e-4;
            let g = d.program(target, &mut rng);
            assert!((1e-6..=1e-4).contains(&g));
        }
    }

    #[test]
    fn test_reram_read_has_nonlinearity() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut d = reram().with_noise(false);
        d.program(1e-4, &mut rng);
        assert!((d.read(1.0) - 1.1e-4).abs() < 1e-15);
        assert!((d.read(2.0) - (2e-4 + 0.4e-4)).abs() < 1e-15);
    }

    #[test]
    fn test_pcm_and_sram_read_linear() {
        let mut rng = StdRng::seed_from_u64(0);
        for kind in [DeviceKind::Pcm, DeviceKind::Sram] {
            let mut d = Device::new(kind, 1e-6, 1e-4).unwrap().with_noise(false);
            d.program(4e-5, &mut rng);
            assert!((d.read(0.5) - 2e-5).abs() < 1e-15);
        }
    }

    #[test]
    fn test_hot_device_reads_lower() {
        let d = reram().with_noise(false);
        let hot = d.clone().with_temperature(125.0);
        assert!(hot.read(1.0) < d.read(1.0));
    }

    #[test]
    fn test_drift_decays_and_clips() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut d = Device::new(DeviceKind::Pcm, 1e-6, 1e-4)
            .unwrap()
            .with_noise(false);
        d.program(1e-4, &mut rng);
        d.update_drift(1000.0);
        assert!((d.conductance() - 0.95e-4).abs() < 1e-15);

        d.update_drift(1e9);
        assert_eq!(d.conductance(), 1e-6);
    }

    #[test]
    fn test_drift_disabled_is_noop() {
        let mut d = reram().with_drift(false);
        let before = d.conductance();
        d.update_drift(10_000.0);
        assert_eq!(d.conductance(), before);
    }

    #[test]
    fn test_noise_does_not_touch_conductance() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut d = reram();
        let before = d.conductance();
        for _ in 0..100 {
            d.inject_noise(&mut rng);
        }
        assert_eq!(d.conductance(), before);
    }

    #[test]
    fn test_disabled_noise_is_zero() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut d = Device::new(DeviceKind::Pcm, 1e-6, 1e-4)
            .unwrap()
            .with_noise(false);
        assert_eq!(d.inject_noise(&mut rng), 0.0);
    }

    #[test]
    fn test_stuck_cell_ignores_program_and_drift() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut d = reram().with_stuck_at(StuckAt::High);
        assert_eq!(d.conductance(), 1e-4);
        assert_eq!(d.program(1e-6, &mut rng), 1e-4);
        d.update_drift(1e6);
        assert_eq!(d.conductance(), 1e-4);
        assert_eq!(d.program_count(), 0);
        assert!(d.is_faulty());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("ReRAM".parse::<DeviceKind>().unwrap(), DeviceKind::ReRam);
        assert_eq!(" pcm ".parse::<DeviceKind>().unwrap(), DeviceKind::Pcm);
        assert_eq!("sram".parse::<DeviceKind>().unwrap(), DeviceKind::Sram);
        assert!(matches!(
            "flash".parse::<DeviceKind>(),
            Err(DeviceError::UnknownDeviceType(_))
        ));
    }
}

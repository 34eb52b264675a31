// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Memristive Crossbar Array
//!
//! An N x N grid of devices performing an analog matrix-vector product:
//!
//! ```text
//! program:  G[i][j] = (W[i][j] / max(W)) * G_max      (no scaling if max(W) <= 0)
//! read:     I[j]    = sum_i dev[i][j].read(V[i]) + dev[i][j].inject_noise()
//!           I[j]   *= ir_drop_factor                   (if IR drop enabled)
//!           I[j]    = round(I[j] / R * L) / L * R      (R = max(I) or 1, L = 2^adc_bits - 1)
//! ```
//!
//! Devices are stored as a dense `Array2<Device>` indexed by (input row,
//! output column). The raw weight matrix is kept separately for
//! introspection.

use ndarray::{Array1, Array2};
use neuraedge_npu_device::{Device, DeviceConfig, DeviceFactory, DeviceModel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, TileError};

/// Crossbar construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossbarConfig {
    pub size: usize,
    pub device: DeviceConfig,
    pub adc_bits: u32,
    pub dac_bits: u32,
    pub ir_drop_enabled: bool,
    /// Multiplicative derating applied to every output line
    pub ir_drop_factor: f64,
    /// Seed for programming variation, read noise and fault sampling
    pub seed: Option<u64>,
}

impl Default for CrossbarConfig {
    fn default() -> Self {
        Self {
            size: 64,
            device: DeviceConfig::default(),
            adc_bits: 8,
            dac_bits: 8,
            ir_drop_enabled: true,
            ir_drop_factor: 0.95,
            seed: None,
        }
    }
}

impl CrossbarConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(TileError::InvalidSize(self.size));
        }
        for (name, bits) in [("adc_bits", self.adc_bits), ("dac_bits", self.dac_bits)] {
            if bits == 0 || bits > 16 {
                return Err(TileError::InvalidCrossbarParameter {
                    name,
                    reason: format!("{} is outside 1-16", bits),
                });
            }
        }
        if !(self.ir_drop_factor > 0.0 && self.ir_drop_factor <= 1.0) {
            return Err(TileError::InvalidCrossbarParameter {
                name: "ir_drop_factor",
                reason: format!("{} is outside (0, 1]", self.ir_drop_factor),
            });
        }
        self.device.validate()?;
        Ok(())
    }
}

/// Round `values` to the ADC grid using the per-call dynamic range.
///
/// The range is the largest value, or 1.0 when no value is positive.
pub fn quantize_adc(values: &Array1<f64>, adc_bits: u32) -> Array1<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max > 0.0 { max } else { 1.0 };
    let levels = ((1u64 << adc_bits) - 1) as f64;
    values.mapv(|v| (v / range * levels).round() / levels * range)
}

#[derive(Debug, Clone)]
pub struct CrossbarArray {
    size: usize,
    devices: Array2<Device>,
    weights: Array2<f64>,
    max_conductance: f64,
    adc_bits: u32,
    dac_bits: u32,
    ir_drop_enabled: bool,
    ir_drop_factor: f64,
    rng: StdRng,
}

impl CrossbarArray {
    /// Build the array. Every cell starts at the midpoint conductance; with
    /// faults enabled each cell is independently stuck with `fault_rate`.
    pub fn new(config: &CrossbarConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let prototype = DeviceFactory::create(&config.device)?;
        let n = config.size;
        let devices = Array2::from_shape_fn((n, n), |_| {
            DeviceFactory::with_sampled_defects(prototype.clone(), &config.device, &mut rng)
        });

        let crossbar = Self {
            size: n,
            devices,
            weights: Array2::zeros((n, n)),
            max_conductance: config.device.max_conductance,
            adc_bits: config.adc_bits,
            dac_bits: config.dac_bits,
            ir_drop_enabled: config.ir_drop_enabled,
            ir_drop_factor: config.ir_drop_factor,
            rng,
        };
        debug!(
            "Created {}x{} {} crossbar ({} faulty cells)",
            n,
            n,
            config.device.device_type,
            crossbar.faulty_cells()
        );
        Ok(crossbar)
    }

    /// Program a weight matrix onto the devices.
    ///
    /// # Errors
    ///
    /// `MatrixShapeMismatch` unless `matrix` is `size x size`; no device is
    /// touched in that case.
    pub fn program_weights(&mut self, matrix: &Array2<f64>) -> Result<()> {
        let (rows, cols) = matrix.dim();
        if rows != self.size || cols != self.size {
            return Err(TileError::MatrixShapeMismatch {
                expected: self.size,
                rows,
                cols,
            });
        }

        let max = matrix.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let scale = if max > 0.0 { 1.0 / max } else { 1.0 };

        for ((i, j), device) in self.devices.indexed_iter_mut() {
            let target = matrix[[i, j]] * scale * self.max_conductance;
            device.program(target, &mut self.rng);
        }
        self.weights = matrix.clone();
        trace!("Programmed {}x{} weights (max={:.4})", rows, cols, max);
        Ok(())
    }

    /// Drive the input lines and return per-column currents before the ADC.
    pub fn read_analog(&mut self, input: &[f64]) -> Result<Array1<f64>> {
        if input.len() != self.size {
            return Err(TileError::VectorLengthMismatch {
                expected: self.size,
                actual: input.len(),
            });
        }

        let mut outputs = Array1::<f64>::zeros(self.size);
        for ((i, j), device) in self.devices.indexed_iter_mut() {
            outputs[j] += device.read(input[i]) + device.inject_noise(&mut self.rng);
        }
        if self.ir_drop_enabled {
            outputs *= self.ir_drop_factor;
        }
        Ok(outputs)
    }

    /// Drive the input lines and return ADC-quantized column currents.
    pub fn read_outputs(&mut self, input: &[f64]) -> Result<Array1<f64>> {
        let analog = self.read_analog(input)?;
        Ok(quantize_adc(&analog, self.adc_bits))
    }

    /// Apply `time_elapsed` ms of drift to every device.
    pub fn update_drift(&mut self, time_elapsed: f64) {
        self.devices
            .iter_mut()
            .for_each(|d| d.update_drift(time_elapsed));
    }

    /// Set the operating temperature of every device.
    pub fn set_temperature(&mut self, temperature_celsius: f64) {
        self.devices
            .iter_mut()
            .for_each(|d| d.set_temperature(temperature_celsius));
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Last programmed (unnormalized) weight matrix
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Present conductance of every cell
    pub fn conductances(&self) -> Array2<f64> {
        self.devices.mapv(|d| d.conductance())
    }

    pub fn device(&self, row: usize, col: usize) -> Option<&Device> {
        self.devices.get((row, col))
    }

    pub fn faulty_cells(&self) -> usize {
        self.devices.iter().filter(|d| d.is_faulty()).count()
    }

    pub fn adc_bits(&self) -> u32 {
        self.adc_bits
    }

    pub fn dac_bits(&self) -> u32 {
        self.dac_bits
    }

    pub fn ir_drop_enabled(&self) -> bool {
        self.ir_drop_enabled
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Affine weight quantization to 4, 8 or 16 bits.
//!
//! `quantize` maps the observed `[min, max]` range onto `0..=2^bits - 1` and
//! remembers the scale and offset so `dequantize` can invert it.

use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantizationBits {
    Four,
    Eight,
    Sixteen,
}

impl QuantizationBits {
    pub fn bits(self) -> u32 {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    pub fn max_level(self) -> u16 {
        ((1u32 << self.bits()) - 1) as u16
    }
}

impl TryFrom<u32> for QuantizationBits {
    type Error = MemoryError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            other => Err(MemoryError::UnsupportedBits(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AffineParams {
    scale: f64,
    offset: f64,
}

#[derive(Debug, Clone)]
pub struct Quantizer {
    bits: QuantizationBits,
    params: Option<AffineParams>,
}

impl Quantizer {
    pub fn new(bits: QuantizationBits) -> Self {
        Self { bits, params: None }
    }

    pub fn from_bits(bits: u32) -> Result<Self> {
        Ok(Self::new(QuantizationBits::try_from(bits)?))
    }

    pub fn bits(&self) -> QuantizationBits {
        self.bits
    }

    /// Step between adjacent levels, once a tensor has been quantized
    pub fn scale(&self) -> Option<f64> {
        self.params.map(|p| p.scale)
    }

    pub fn quantize<D: Dimension>(&mut self, weights: &Array<f64, D>) -> Array<u16, D> {
        let (min, max) = weights
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &w| {
                (lo.min(w), hi.max(w))
            });
        let levels = f64::from(self.bits.max_level());
        let (offset, scale) = if min.is_finite() && max > min {
            (min, (max - min) / levels)
        } else if min.is_finite() {
            (min, 1.0)
        } else {
            (0.0, 1.0)
        };
        self.params = Some(AffineParams { scale, offset });

        weights.mapv(|w| ((w - offset) / scale).round().clamp(0.0, levels) as u16)
    }

    pub fn dequantize<D: Dimension>(&self, quantized: &Array<u16, D>) -> Result<Array<f64, D>> {
        let params = self.params.ok_or(MemoryError::NotQuantized)?;
        Ok(quantized.mapv(|q| f64::from(q) * params.scale + params.offset))
    }

    /// Quantize and immediately dequantize, modelling storage at reduced precision.
    pub fn round_trip<D: Dimension>(&mut self, weights: &Array<f64, D>) -> Result<Array<f64, D>> {
        let q = self.quantize(weights);
        self.dequantize(&q)
    }

    /// Size reduction relative to f32 storage
    pub fn compression_ratio(&self) -> f64 {
        32.0 / f64::from(self.bits.bits())
    }
}

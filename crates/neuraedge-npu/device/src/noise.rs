// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Noise samplers for device variation and read perturbation.
//!
//! All samplers draw from a caller-supplied RNG so a seeded `StdRng` gives
//! reproducible runs.

use rand::Rng;
use std::f64::consts::PI;

/// Standard normal sample (Box-Muller).
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-12);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Zero-mean Gaussian sample with the given standard deviation.
///
/// A non-positive `std_dev` yields exactly 0.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    std_dev * standard_normal(rng)
}

/// Log-normal(0, sigma) sample shifted by -1, so it is centred near zero.
pub fn lognormal_minus_one<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    (sigma * standard_normal(rng)).exp() - 1.0
}

/// Random telegraph noise: a two-level signal that flips state with
/// probability `switch_probability` on every sample.
#[derive(Debug, Clone)]
pub struct RandomTelegraphNoise {
    amplitude: f64,
    switch_probability: f64,
    state: f64,
}

impl RandomTelegraphNoise {
    pub fn new<R: Rng + ?Sized>(amplitude: f64, switch_probability: f64, rng: &mut R) -> Self {
        let state = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Self {
            amplitude,
            switch_probability: switch_probability.clamp(0.0, 1.0),
            state,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        if rng.gen::<f64>() < self.switch_probability {
            self.state = -self.state;
        }
        self.amplitude * self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gaussian_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| gaussian(&mut rng, 2.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

        assert!(mean.abs() < 0.1, "mean {}", mean);
        assert!((var.sqrt() - 2.0).abs() < 0.1, "std {}", var.sqrt());
    }

    #[test]
    fn test_zero_sigma_is_silent() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gaussian(&mut rng, 0.0), 0.0);
        assert_eq!(lognormal_minus_one(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn test_lognormal_lower_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(lognormal_minus_one(&mut rng, 0.5) > -1.0);
        }
    }

    #[test]
    fn test_telegraph_two_levels() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut rtn = RandomTelegraphNoise::new(0.3, 0.5, &mut rng);
        let mut flips = 0;
        let mut last = rtn.sample(&mut rng);
        for _ in 0..200 {
            let s = rtn.sample(&mut rng);
            assert!((s.abs() - 0.3).abs() < 1e-12);
            if s != last {
                flips += 1;
            }
            last = s;
        }
        assert!(flips > 0);
    }

    #[test]
    fn test_telegraph_never_switches_at_zero_probability() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut rtn = RandomTelegraphNoise::new(1.0, 0.0, &mut rng);
        let first = rtn.sample(&mut rng);
        for _ in 0..50 {
            assert_eq!(rtn.sample(&mut rng), first);
        }
    }
}

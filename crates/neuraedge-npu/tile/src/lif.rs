// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # LIF (Leaky Integrate-and-Fire) Neuron
//!
//! ```text
//! Integrating:
//!     decay = exp(-dt / tau)
//!     V     = V * decay + I * (1 - decay)
//!     if V >= threshold: V = 0, timer = refractory_period, spikes += 1 -> Refractory
//!
//! Refractory:
//!     input ignored, V forced to 0
//!     timer -= dt; if timer <= 0 -> Integrating
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TileError};

/// LIF neuron parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifParameters {
    pub threshold: f64,
    /// Membrane time constant (ms)
    pub tau_membrane: f64,
    /// Refractory period (ms)
    pub refractory_period: f64,
}

impl Default for LifParameters {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            tau_membrane: 20.0,
            refractory_period: 2.0,
        }
    }
}

impl LifParameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0) {
            return Err(TileError::InvalidNeuronParameter {
                name: "threshold",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.tau_membrane > 0.0) {
            return Err(TileError::InvalidNeuronParameter {
                name: "tau_membrane",
                reason: "must be positive".to_string(),
            });
        }
        if self.refractory_period < 0.0 {
            return Err(TileError::InvalidNeuronParameter {
                name: "refractory_period",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeuronState {
    Integrating,
    Refractory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifNeuron {
    params: LifParameters,
    voltage: f64,
    state: NeuronState,
    refractory_timer: f64,
    spike_count: u64,
}

impl LifNeuron {
    pub fn new(params: LifParameters) -> Self {
        Self {
            params,
            voltage: 0.0,
            state: NeuronState::Integrating,
            refractory_timer: 0.0,
            spike_count: 0,
        }
    }

    /// Advance one step of `dt` ms. Returns `true` if the neuron fired.
    #[inline]
    pub fn integrate(&mut self, input: f64, dt: f64) -> bool {
        if self.state == NeuronState::Refractory {
            self.refractory_timer -= dt;
            if self.refractory_timer <= 0.0 {
                self.state = NeuronState::Integrating;
            }
            self.voltage = 0.0;
            return false;
        }

        let decay = (-dt / self.params.tau_membrane).exp();
        self.voltage = self.voltage * decay + input * (1.0 - decay);

        if self.voltage >= self.params.threshold {
            self.voltage = 0.0;
            self.state = NeuronState::Refractory;
            self.refractory_timer = self.params.refractory_period;
            self.spike_count += 1;
            return true;
        }
        false
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    pub fn state(&self) -> NeuronState {
        self.state
    }

    pub fn is_refractory(&self) -> bool {
        self.state == NeuronState::Refractory
    }

    pub fn spike_count(&self) -> u64 {
        self.spike_count
    }

    pub fn params(&self) -> &LifParameters {
        &self.params
    }

    pub fn reset(&mut self) {
        self.voltage = 0.0;
        self.state = NeuronState::Integrating;
        self.refractory_timer = 0.0;
        self.spike_count = 0;
    }
}

impl Default for LifNeuron {
    fn default() -> Self {
        Self::new(LifParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subthreshold_input_never_fires() {
        let mut n = LifNeuron::default();
        for _ in 0..1000 {
            assert!(!n.integrate(0.9, 1.0));
        }
        assert!(n.voltage() < 0.9);
        assert!(n.voltage() > 0.89);
    }

    #[test]
    fn test_single_step_update() {
        let mut n = LifNeuron::default();
        n.integrate(0.5, 1.0);
        let decay = (-1.0f64 / 20.0).exp();
        assert!((n.voltage() - 0.5 * (1.0 - decay)).abs() < 1e-12);
    }

    #[test]
    fn test_spike_resets_and_enters_refractory() {
        let mut n = LifNeuron::default();
        let mut fired_at = None;
        for step in 0..200 {
            if n.integrate(5.0, 1.0) {
                fired_at = Some(step);
                break;
            }
        }
        assert!(fired_at.is_some());
        assert_eq!(n.voltage(), 0.0);
        assert_eq!(n.state(), NeuronState::Refractory);
        assert_eq!(n.spike_count(), 1);
    }

    #[test]
    fn test_refractory_ignores_input() {
        let params = LifParameters {
            threshold: 0.01,
            tau_membrane: 1.0,
            refractory_period: 3.0,
        };
        let mut n = LifNeuron::new(params);
        assert!(n.integrate(100.0, 1.0));

        // timer 3 -> 2 -> 1 -> 0: three silent steps at V = 0
        for _ in 0..3 {
            assert!(!n.integrate(100.0, 1.0));
            assert_eq!(n.voltage(), 0.0);
        }
        assert_eq!(n.state(), NeuronState::Integrating);
        assert!(n.integrate(100.0, 1.0));
    }

    #[test]
    fn test_periodic_firing_under_constant_drive() {
        let mut n = LifNeuron::default();
        let steps: Vec<usize> = (0..400).filter(|_| n.integrate(3.0, 1.0)).collect();
        assert_eq!(steps[0], 8);

        let gaps: Vec<usize> = steps.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(!gaps.is_empty());
        assert!(gaps.iter().all(|g| *g == gaps[0]));
        // integration time to threshold: ceil(-tau * ln(1 - 1/3)) = 9 steps,
        // plus 2 refractory steps
        assert_eq!(gaps[0], 11);
    }

    #[test]
    fn test_reset() {
        let mut n = LifNeuron::default();
        while !n.integrate(10.0, 1.0) {}
        n.reset();
        assert_eq!(n.spike_count(), 0);
        assert_eq!(n.state(), NeuronState::Integrating);
        assert_eq!(n.voltage(), 0.0);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(LifParameters::default().validate().is_ok());
        let bad = LifParameters {
            tau_membrane: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(TileError::InvalidNeuronParameter { name: "tau_membrane", .. })
        ));
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Neuron cluster: one LIF neuron per crossbar output line.

use crate::error::{Result, TileError};
use crate::lif::{LifNeuron, LifParameters};

#[derive(Debug, Clone)]
pub struct NeuronCluster {
    neurons: Vec<LifNeuron>,
    membrane_potentials: Vec<f64>,
}

impl NeuronCluster {
    pub fn new(size: usize, params: LifParameters) -> Result<Self> {
        if size == 0 {
            return Err(TileError::InvalidSize(size));
        }
        params.validate()?;
        Ok(Self {
            neurons: vec![LifNeuron::new(params); size],
            membrane_potentials: vec![0.0; size],
        })
    }

    pub fn size(&self) -> usize {
        self.neurons.len()
    }

    /// Integrate every neuron with its input current.
    ///
    /// Returns the ascending indices of the neurons that fired this step.
    pub fn integrate(&mut self, currents: &[f64], dt: f64) -> Result<Vec<usize>> {
        if currents.len() != self.neurons.len() {
            return Err(TileError::VectorLengthMismatch {
                expected: self.neurons.len(),
                actual: currents.len(),
            });
        }

        let mut spikes = Vec::new();
        for (idx, (neuron, &current)) in self.neurons.iter_mut().zip(currents).enumerate() {
            if neuron.integrate(current, dt) {
                spikes.push(idx);
            }
            self.membrane_potentials[idx] = neuron.voltage();
        }
        Ok(spikes)
    }

    /// Membrane voltages after the most recent step
    pub fn membrane_potentials(&self) -> &[f64] {
        &self.membrane_potentials
    }

    /// Cumulative spike count per neuron
    pub fn spike_counts(&self) -> Vec<u64> {
        self.neurons.iter().map(LifNeuron::spike_count).collect()
    }

    pub fn total_spikes(&self) -> u64 {
        self.neurons.iter().map(LifNeuron::spike_count).sum()
    }

    pub fn neuron(&self, idx: usize) -> Option<&LifNeuron> {
        self.neurons.get(idx)
    }

    pub fn reset(&mut self) {
        self.neurons.iter_mut().for_each(LifNeuron::reset);
        self.membrane_potentials.iter_mut().for_each(|v| *v = 0.0);
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Layer-pipelined inference over the whole platform.
//!
//! Each layer runs on its tile for its timesteps. Spikes emitted at step `t`
//! are routed to the next layer's tile through the [`SpikeRouter`], land in
//! that tile's [`TileBuffer`], and are added to the next layer's input at
//! step `t`. Per-layer activity feeds the activity tracker, the power
//! estimator and the junction temperature model; the resulting temperature
//! is applied to every crossbar before the next layer.
//!
//! Packet timestamps carry the emitting step, so a layer that forwards spikes
//! may run at most [`PacketFormat::TIMESTAMP_PERIOD`] steps.

use ndarray::Array2;
use neuraedge_memory::{GlobalSram, SramStats, TileBuffer};
use neuraedge_power::{
    ActivityTracker, EnergyModel, GlobalActivity, PowerEstimator, ThermalModel, VoltageModel,
};
use neuraedge_routing::{
    wrapping_timestamp, PacketFormat, RouterStatistics, RoutingError, SpikePacket, SpikeRouter,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::ExecutionEngine;
use crate::error::{EngineError, Result};
use crate::layer::{LayerConfig, LayerInput, LayerResult};

const F32_BYTES: usize = std::mem::size_of::<f32>();
const PACKET_BYTES: usize = std::mem::size_of::<u64>();

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemOptions {
    pub frequency_mhz: f64,
    /// Reference voltage of the energy model (V)
    pub nominal_voltage: f64,
    /// Operating voltage; power scales with it relative to `nominal_voltage`
    pub supply_voltage: f64,
    pub ambient_temp_celsius: f64,
    pub thermal_resistance: f64,
    pub tile_buffer_kb: usize,
    pub global_sram_kb: usize,
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self {
            frequency_mhz: 100.0,
            nominal_voltage: 0.8,
            supply_voltage: 0.8,
            ambient_temp_celsius: 25.0,
            thermal_resistance: 10.0,
            tile_buffer_kb: 16,
            global_sram_kb: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    pub total_cycles: u64,
    /// Tiles + router + SRAM (pJ)
    pub total_energy_pj: f64,
    pub router_energy_pj: f64,
    pub memory_energy_pj: f64,
    pub layer_results: Vec<LayerResult>,
    /// Layers skipped because `max_cycles` was reached
    pub skipped_layers: usize,
    pub temperature_celsius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatistics {
    pub total_cycles: u64,
    pub activity: GlobalActivity,
    pub router: RouterStatistics,
    pub sram: SramStats,
    pub dropped_packets: u64,
    pub temperature_celsius: f64,
    pub average_power_mw: f64,
    pub peak_power_mw: f64,
}

#[derive(Debug, Clone)]
pub struct FullSystemSimulator {
    engine: ExecutionEngine,
    router: SpikeRouter,
    buffers: Vec<TileBuffer>,
    sram: GlobalSram,
    activity: ActivityTracker,
    energy_model: EnergyModel,
    estimator: PowerEstimator,
    thermal: ThermalModel,
    options: SystemOptions,
    cycle_count: u64,
    router_energy_pj: f64,
    memory_energy_pj: f64,
    dropped_packets: u64,
}

fn activations_region(tile_id: usize) -> String {
    format!("tile{}_activations", tile_id)
}

impl FullSystemSimulator {
    /// Reserves one activation region per tile in global SRAM.
    ///
    /// # Errors
    ///
    /// Non-positive nominal voltage, a supply below the minimum, or SRAM too
    /// small for the activation regions.
    pub fn new(engine: ExecutionEngine, router: SpikeRouter, options: SystemOptions) -> Result<Self> {
        let mut voltage = VoltageModel::new(options.nominal_voltage)?;
        voltage.set_voltage(options.supply_voltage)?;
        let num_tiles = engine.tile_manager().num_tiles();
        let size = engine.tile_manager().tile_size();
        let mut sram = GlobalSram::new(options.global_sram_kb);
        for tile_id in 0..num_tiles {
            sram.allocate(&activations_region(tile_id), size * F32_BYTES)?;
        }
        info!(
            "full-system simulator: {} tiles, {} KB SRAM ({:.1}% reserved), {:.2} V supply",
            num_tiles,
            options.global_sram_kb,
            sram.utilization() * 100.0,
            options.supply_voltage
        );
        Ok(Self {
            buffers: (0..num_tiles)
                .map(|id| TileBuffer::new(id, options.tile_buffer_kb))
                .collect(),
            sram,
            activity: ActivityTracker::new(num_tiles),
            energy_model: EnergyModel::new(),
            estimator: PowerEstimator::new(EnergyModel::new()).with_voltage_model(voltage),
            thermal: ThermalModel::new(options.ambient_temp_celsius, options.thermal_resistance),
            engine,
            router,
            options,
            cycle_count: 0,
            router_energy_pj: 0.0,
            memory_energy_pj: 0.0,
            dropped_packets: 0,
        })
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ExecutionEngine {
        &mut self.engine
    }

    pub fn sram_mut(&mut self) -> &mut GlobalSram {
        &mut self.sram
    }

    pub fn temperature(&self) -> f64 {
        self.thermal.temperature()
    }

    /// Add buffered packets for `tile_id` to a `(timesteps, size)` train by
    /// timestamp; packets stamped past the last step are discarded.
    fn drain_buffer_into(&mut self, tile_id: usize, train: &mut Array2<f64>) {
        let Some(buffer) = self.buffers.get_mut(tile_id) else {
            return;
        };
        let (steps, size) = train.dim();
        for word in buffer.read_words() {
            let packet = SpikePacket::decode(word);
            let t = usize::from(packet.timestamp);
            if t < steps && size > 0 {
                train[[t, packet.neuron() % size]] += f64::from(packet.payload);
            }
        }
    }

    /// Send one layer's spikes to `dest` and stage them in its buffer.
    fn forward_spikes(&mut self, result: &LayerResult, dest: usize) -> Result<usize> {
        let source = result.tile_id;
        let mut routed = 0;
        for (t, spikes) in result.outputs.iter().enumerate() {
            let timestamp = wrapping_timestamp(t as u64);
            for &neuron in spikes {
                match self
                    .router
                    .route_spike(SpikePacket::new(source, dest, neuron, timestamp, 1)?)
                {
                    Ok(()) => routed += 1,
                    Err(RoutingError::QueueFull { .. }) => self.dropped_packets += 1,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let words: Vec<u64> = self
            .router
            .get_packets(dest)?
            .iter()
            .map(SpikePacket::encode)
            .collect();
        if let Some(buffer) = self.buffers.get_mut(dest) {
            let fit = (buffer.available() / PACKET_BYTES).min(words.len());
            if fit < words.len() {
                let lost = words.len() - fit;
                warn!("tile {} buffer full, dropping {} packets", dest, lost);
                self.dropped_packets += lost as u64;
            }
            buffer.write_words(&words[..fit])?;
        }
        Ok(routed)
    }

    fn account_layer(
        &mut self,
        layer: &LayerConfig,
        train: &Array2<f64>,
        result: &LayerResult,
        routed: usize,
    ) -> Result<()> {
        let tile_id = layer.tile_id;
        let size = self.engine.tile_manager().tile_size();
        let steps = layer.timesteps;
        let active: usize = train
            .rows()
            .into_iter()
            .map(|r| r.iter().filter(|v| **v != 0.0).count())
            .sum();

        self.activity.log_dac_activity(tile_id, active as u64)?;
        self.activity.log_adc_activity(tile_id, (steps * size) as u64)?;
        self.activity.log_crossbar_activity(tile_id, (active * size) as u64)?;
        self.activity
            .log_spike_events(tile_id, result.statistics.total_spikes as u64)?;
        self.activity.log_router_activity(tile_id, routed as u64)?;
        self.router_energy_pj += self.energy_model.energy_routing(routed);

        let activity_rate = active as f64 / (steps * size).max(1) as f64;
        let power_mw = self.estimator.estimate_power(
            activity_rate,
            size,
            result.statistics.spike_rate,
            self.options.frequency_mhz,
        )?;
        let duration_s = steps as f64 / (self.options.frequency_mhz * 1e6);
        self.thermal.update(power_mw * 1e-3, duration_s);
        self.engine
            .tile_manager_mut()
            .set_temperature_all(self.thermal.temperature());
        Ok(())
    }

    fn store_activations(&mut self, result: &LayerResult) -> Result<()> {
        let size = self.engine.tile_manager().tile_size();
        let counts: Vec<f32> = result
            .spike_counts(size)
            .iter()
            .map(|&c| c as f32)
            .collect();
        self.sram
            .write_region(&activations_region(result.tile_id), &counts)?;
        self.memory_energy_pj += self.energy_model.energy_memory(0, 1);
        Ok(())
    }

    /// Spike counts of the last layer run on `tile_id`, read back from SRAM.
    pub fn load_activations(&mut self, tile_id: usize) -> Result<Vec<f32>> {
        let values = self.sram.read_region(&activations_region(tile_id))?;
        self.memory_energy_pj += self.energy_model.energy_memory(1, 0);
        Ok(values)
    }

    /// Run `layers` in order, at most `max_cycles` layers in total over the
    /// simulator's lifetime.
    pub fn run_inference(
        &mut self,
        layers: &[LayerConfig],
        max_cycles: u64,
    ) -> Result<InferenceResult> {
        let forwarding = layers.len().saturating_sub(1);
        if let Some((index, layer)) = layers[..forwarding]
            .iter()
            .enumerate()
            .find(|(_, l)| l.timesteps as u64 > PacketFormat::TIMESTAMP_PERIOD)
        {
            return Err(EngineError::InvalidLayer {
                index,
                reason: format!(
                    "{} timesteps exceed the {}-step packet timestamp range",
                    layer.timesteps,
                    PacketFormat::TIMESTAMP_PERIOD
                ),
            });
        }

        let mut layer_results = Vec::with_capacity(layers.len());
        let mut skipped_layers = 0;

        for (index, layer) in layers.iter().enumerate() {
            if self.cycle_count >= max_cycles {
                skipped_layers = layers.len() - index;
                warn!("max_cycles {} reached, skipping {} layers", max_cycles, skipped_layers);
                break;
            }
            let mut train = layer.inputs.to_train(layer.timesteps);
            self.drain_buffer_into(layer.tile_id, &mut train);

            let result = self.engine.execute_layer(
                layer.tile_id,
                &LayerInput::Train(train.clone()),
                layer.weights.as_ref(),
                layer.timesteps,
            )?;

            let routed = match layers.get(index + 1) {
                Some(next) => self.forward_spikes(&result, next.tile_id)?,
                None => 0,
            };
            self.account_layer(layer, &train, &result, routed)?;
            self.store_activations(&result)?;

            self.activity.advance_cycle();
            self.cycle_count += 1;
            debug!(
                "layer {} on tile {}: {} spikes, {} packets forwarded",
                index, layer.tile_id, result.statistics.total_spikes, routed
            );
            layer_results.push(result);
        }

        let tile_energy = self.engine.tile_manager().power_summary().total_energy_pj;
        Ok(InferenceResult {
            total_cycles: self.cycle_count,
            total_energy_pj: tile_energy + self.router_energy_pj + self.memory_energy_pj,
            router_energy_pj: self.router_energy_pj,
            memory_energy_pj: self.memory_energy_pj,
            layer_results,
            skipped_layers,
            temperature_celsius: self.thermal.temperature(),
        })
    }

    pub fn statistics(&self) -> SystemStatistics {
        SystemStatistics {
            total_cycles: self.cycle_count,
            activity: self.activity.global_activity(),
            router: self.router.statistics(),
            sram: self.sram.stats(),
            dropped_packets: self.dropped_packets,
            temperature_celsius: self.thermal.temperature(),
            average_power_mw: self.estimator.average_power(),
            peak_power_mw: self.estimator.peak_power(),
        }
    }

    /// Clear execution, routing, buffer and accounting state. SRAM regions
    /// stay allocated.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.router.reset();
        self.buffers.iter_mut().for_each(TileBuffer::clear);
        self.activity.reset();
        self.estimator.reset();
        self.thermal.reset();
        self.engine
            .tile_manager_mut()
            .set_temperature_all(self.thermal.temperature());
        self.cycle_count = 0;
        self.router_energy_pj = 0.0;
        self.memory_energy_pj = 0.0;
        self.dropped_packets = 0;
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Assemble simulators from a [`NeuraEdgeConfig`].
//!
//! Every builder validates the string-valued choices it consumes (device
//! type, compute mode, policies), so a config that skipped
//! `validate_config` still fails here with a typed error instead of
//! silently falling back to defaults.

use neuraedge_config::NeuraEdgeConfig;
use neuraedge_memory::Quantizer;
use neuraedge_npu_device::{DeviceConfig, DeviceKind};
use neuraedge_npu_engine::{
    ComputeMode, DeliveryPolicy, DenseMode, ExecutionEngine, FullSystemSimulator,
    ModeController, MultiTileSimulator, SchedulingPolicy, SnnMode, SystemOptions,
};
use neuraedge_npu_tile::{CrossbarConfig, LifParameters, TileConfig, TileManager};
use neuraedge_routing::{Arbiter, ArbitrationPolicy, SpikeRouter};
use tracing::{debug, info};

use crate::error::Result;

/// Per-tile configuration shared by every tile of the platform
pub fn build_tile_config(config: &NeuraEdgeConfig) -> Result<TileConfig> {
    let device_type: DeviceKind = config.platform.device_type.parse()?;
    let d = &config.device;
    let device = DeviceConfig {
        device_type,
        max_conductance: d.max_conductance,
        min_conductance: d.min_conductance,
        noise_enabled: d.noise_enabled,
        drift_enabled: d.drift_enabled,
        temperature_celsius: d.temperature_celsius,
        enable_stuck_at_faults: d.enable_stuck_at_faults,
        fault_rate: d.fault_rate,
        telegraph_noise: None,
    };

    let tile_config = TileConfig {
        crossbar: CrossbarConfig {
            size: config.platform.tile_size,
            device,
            adc_bits: config.crossbar.adc_bits,
            dac_bits: config.crossbar.dac_bits,
            ir_drop_enabled: config.crossbar.ir_drop_enabled,
            ir_drop_factor: config.crossbar.ir_drop_factor,
            seed: config.platform.seed,
        },
        neuron: LifParameters {
            threshold: config.neuron.threshold,
            tau_membrane: config.neuron.tau_membrane,
            refractory_period: config.neuron.refractory_period,
        },
        current_scale: config.neuron.current_scale,
        dt: config.neuron.dt,
    };
    tile_config.validate()?;
    Ok(tile_config)
}

pub fn build_tile_manager(config: &NeuraEdgeConfig) -> Result<TileManager> {
    let tile_config = build_tile_config(config)?;
    let manager = TileManager::new(config.platform.num_tiles, &tile_config)?;
    debug!(
        "built {} tiles of {}x{} {} crossbars",
        manager.num_tiles(),
        manager.tile_size(),
        manager.tile_size(),
        config.platform.device_type
    );
    Ok(manager)
}

/// Execution engine with the configured scheduling policy and weight
/// quantization. The compute mode belongs to [`build_mode_controller`].
pub fn build_engine(config: &NeuraEdgeConfig) -> Result<ExecutionEngine> {
    let policy: SchedulingPolicy = config.scheduler.policy.parse()?;
    let quantizer = Quantizer::from_bits(config.platform.quantization_bits)?;
    let engine =
        ExecutionEngine::with_policy(build_tile_manager(config)?, policy).with_quantizer(quantizer);
    info!(
        "engine ready: {} tiles, scheduler={}, {}-bit weights",
        config.platform.num_tiles,
        config.scheduler.policy,
        config.platform.quantization_bits
    );
    Ok(engine)
}

pub fn build_router(config: &NeuraEdgeConfig) -> Result<SpikeRouter> {
    Ok(SpikeRouter::new(config.platform.num_tiles)?
        .with_max_queue_depth(config.routing.max_queue_depth))
}

pub fn build_multi_tile(config: &NeuraEdgeConfig) -> Result<MultiTileSimulator> {
    let delivery: DeliveryPolicy = config.routing.delivery.parse()?;
    let arbitration: ArbitrationPolicy = config.routing.arbitration.parse()?;
    let simulator = MultiTileSimulator::new(build_tile_manager(config)?, build_router(config)?)
        .with_delivery(delivery)
        .with_arbiter(Arbiter::new(arbitration));
    debug!(
        "multi-tile simulator: delivery={}, arbitration={}",
        config.routing.delivery, config.routing.arbitration
    );
    Ok(simulator)
}

pub fn build_system_options(config: &NeuraEdgeConfig) -> SystemOptions {
    SystemOptions {
        frequency_mhz: config.power.frequency_mhz,
        nominal_voltage: config.power.nominal_voltage,
        supply_voltage: config.power.supply_voltage,
        ambient_temp_celsius: config.power.ambient_temp_celsius,
        thermal_resistance: config.power.thermal_resistance,
        tile_buffer_kb: config.memory.tile_buffer_kb,
        global_sram_kb: config.memory.global_sram_kb,
    }
}

pub fn build_full_system(config: &NeuraEdgeConfig) -> Result<FullSystemSimulator> {
    Ok(FullSystemSimulator::new(
        build_engine(config)?,
        build_router(config)?,
        build_system_options(config),
    )?)
}

/// Mode controller over a dense network of `layer_sizes`, starting in the
/// configured compute mode.
pub fn build_mode_controller(
    config: &NeuraEdgeConfig,
    layer_sizes: &[usize],
) -> Result<ModeController> {
    let mode: ComputeMode = config.platform.mode.parse()?;
    let dense = DenseMode::new(layer_sizes)?;
    let snn = SnnMode::new(config.platform.timesteps, config.neuron.dt);
    let mut controller = ModeController::new(dense, snn);
    if controller.current_mode() != mode {
        controller.switch_mode(mode);
    }
    Ok(controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NeuraEdgeError;

    fn small_config() -> NeuraEdgeConfig {
        let mut config = NeuraEdgeConfig::default();
        config.platform.num_tiles = 4;
        config.platform.tile_size = 8;
        config.platform.seed = Some(7);
        config
    }

    #[test]
    fn test_tile_config_mapping() {
        let mut config = small_config();
        config.platform.device_type = "pcm".to_string();
        config.crossbar.ir_drop_enabled = false;
        config.neuron.threshold = 0.5;

        let tile = build_tile_config(&config).unwrap();
        assert_eq!(tile.size(), 8);
        assert_eq!(tile.crossbar.device.device_type, DeviceKind::Pcm);
        assert_eq!(tile.crossbar.seed, Some(7));
        assert!(!tile.crossbar.ir_drop_enabled);
        assert_eq!(tile.neuron.threshold, 0.5);
    }

    #[test]
    fn test_unknown_device_type_is_typed_error() {
        let mut config = small_config();
        config.platform.device_type = "flash".to_string();
        assert!(matches!(
            build_tile_config(&config),
            Err(NeuraEdgeError::Device(_))
        ));
    }

    #[test]
    fn test_engine_takes_configured_quantization() {
        let mut config = small_config();
        config.platform.quantization_bits = 4;
        let mut engine = build_engine(&config).unwrap();
        assert_eq!(engine.tile_manager().num_tiles(), 4);

        let ramp = ndarray::Array2::from_shape_fn((8, 8), |(i, j)| (i * 8 + j) as f64 / 63.0);
        engine.program_weights(0, &ramp).unwrap();
        let stored = engine.tile_manager().tile(0).unwrap().crossbar().weights();
        // 4-bit levels over [0, 1] are multiples of 1/15
        for w in stored.iter() {
            assert!((w * 15.0 - (w * 15.0).round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unknown_mode_rejected_by_mode_controller() {
        let mut config = small_config();
        config.platform.mode = "quantum".to_string();
        assert!(matches!(
            build_mode_controller(&config, &[8, 4]),
            Err(NeuraEdgeError::Engine(_))
        ));
    }

    #[test]
    fn test_bad_policies_rejected() {
        let mut config = small_config();
        config.scheduler.policy = "lottery".to_string();
        assert!(matches!(build_engine(&config), Err(NeuraEdgeError::Engine(_))));

        let mut config = small_config();
        config.routing.arbitration = "random".to_string();
        assert!(matches!(
            build_multi_tile(&config),
            Err(NeuraEdgeError::Routing(_))
        ));
    }

    #[test]
    fn test_mode_controller_starts_in_configured_mode() {
        let mut config = small_config();
        config.platform.mode = "dense".to_string();
        let controller = build_mode_controller(&config, &[8, 4, 2]).unwrap();
        assert_eq!(controller.current_mode(), ComputeMode::Dense);
    }

    #[test]
    fn test_full_system_builds() {
        let sim = build_full_system(&small_config()).unwrap();
        assert_eq!(sim.engine().tile_manager().num_tiles(), 4);
    }

    #[test]
    fn test_system_options_carry_power_settings() {
        let mut config = small_config();
        config.power.supply_voltage = 0.9;
        config.power.nominal_voltage = 0.75;
        config.power.frequency_mhz = 200.0;
        let options = build_system_options(&config);
        assert_eq!(options.supply_voltage, 0.9);
        assert_eq!(options.nominal_voltage, 0.75);
        assert_eq!(options.frequency_mhz, 200.0);

        config.power.supply_voltage = 0.3;
        assert!(matches!(
            build_full_system(&config),
            Err(NeuraEdgeError::Engine(_))
        ));
    }
}

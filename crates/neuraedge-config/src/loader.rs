// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, NeuraEdgeConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "neuraedge.toml";

/// Find the NeuraEdge configuration file
///
/// Search order:
/// 1. `NEURAEDGE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./neuraedge.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NEURAEDGE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NEURAEDGE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "NeuraEdge configuration file '{}' not found in any of these locations:\n{}\n\nSet NEURAEDGE_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is a separate step (`validate_config`).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeuraEdgeConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeuraEdgeConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower == "true" || lower == "1" || lower == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEURAEDGE_NUM_TILES` -> `platform.num_tiles`
/// - `NEURAEDGE_TILE_SIZE` -> `platform.tile_size`
/// - `NEURAEDGE_DEVICE_TYPE` -> `platform.device_type`
/// - `NEURAEDGE_MODE` -> `platform.mode`
/// - `NEURAEDGE_TIMESTEPS` -> `platform.timesteps`
/// - `NEURAEDGE_SEED` -> `platform.seed`
/// - `NEURAEDGE_NOISE_ENABLED` -> `device.noise_enabled`
/// - `NEURAEDGE_DELIVERY` -> `routing.delivery`
/// - `NEURAEDGE_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut NeuraEdgeConfig) {
    if let Ok(value) = env::var("NEURAEDGE_NUM_TILES") {
        if let Ok(tiles) = value.parse::<usize>() {
            config.platform.num_tiles = tiles;
        }
    }
    if let Ok(value) = env::var("NEURAEDGE_TILE_SIZE") {
        if let Ok(size) = value.parse::<usize>() {
            config.platform.tile_size = size;
        }
    }
    if let Ok(value) = env::var("NEURAEDGE_DEVICE_TYPE") {
        config.platform.device_type = value;
    }
    if let Ok(value) = env::var("NEURAEDGE_MODE") {
        config.platform.mode = value;
    }
    if let Ok(value) = env::var("NEURAEDGE_TIMESTEPS") {
        if let Ok(steps) = value.parse::<usize>() {
            config.platform.timesteps = steps;
        }
    }
    if let Ok(value) = env::var("NEURAEDGE_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.platform.seed = Some(seed);
        }
    }
    if let Ok(value) = env::var("NEURAEDGE_NOISE_ENABLED") {
        config.device.noise_enabled = parse_bool(&value);
    }
    if let Ok(value) = env::var("NEURAEDGE_DELIVERY") {
        config.routing.delivery = value;
    }
    if let Ok(value) = env::var("NEURAEDGE_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"num_tiles": "8", "mode": "hybrid"}`)
pub fn apply_cli_overrides(config: &mut NeuraEdgeConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("num_tiles") {
        if let Ok(tiles) = value.parse::<usize>() {
            config.platform.num_tiles = tiles;
        }
    }
    if let Some(value) = cli_args.get("tile_size") {
        if let Ok(size) = value.parse::<usize>() {
            config.platform.tile_size = size;
        }
    }
    if let Some(value) = cli_args.get("device_type") {
        config.platform.device_type = value.clone();
    }
    if let Some(value) = cli_args.get("mode") {
        config.platform.mode = value.clone();
    }
    if let Some(value) = cli_args.get("timesteps") {
        if let Ok(steps) = value.parse::<usize>() {
            config.platform.timesteps = steps;
        }
    }
    if let Some(value) = cli_args.get("seed") {
        if let Ok(seed) = value.parse::<u64>() {
            config.platform.seed = Some(seed);
        }
    }
    if let Some(value) = cli_args.get("noise_enabled") {
        config.device.noise_enabled = parse_bool(value);
    }
    if let Some(value) = cli_args.get("delivery") {
        config.routing.delivery = value.clone();
    }
    if let Some(value) = cli_args.get("scheduler_policy") {
        config.scheduler.policy = value.clone();
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("NEURAEDGE_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("NEURAEDGE_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing_file() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("NEURAEDGE_CONFIG_PATH", "/definitely/not/here/neuraedge.toml");
        let result = find_config_file();
        env::remove_var("NEURAEDGE_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::remove_var("NEURAEDGE_NUM_TILES");
        env::remove_var("NEURAEDGE_DEVICE_TYPE");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("neuraedge.toml");

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[platform]").unwrap();
        writeln!(file, "num_tiles = 9").unwrap();
        writeln!(file, "device_type = \"pcm\"").unwrap();
        writeln!(file, "[crossbar]").unwrap();
        writeln!(file, "ir_drop_enabled = false").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.platform.num_tiles, 9);
        assert_eq!(config.platform.device_type, "pcm");
        assert!(!config.crossbar.ir_drop_enabled);
        // Untouched sections keep their defaults
        assert_eq!(config.platform.tile_size, 64);
        assert_eq!(config.neuron.threshold, 1.0);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("neuraedge.toml");
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[platform").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = NeuraEdgeConfig::default();

        env::set_var("NEURAEDGE_NUM_TILES", "16");
        env::set_var("NEURAEDGE_SEED", "42");
        env::set_var("NEURAEDGE_NOISE_ENABLED", "false");

        apply_environment_overrides(&mut config);

        env::remove_var("NEURAEDGE_NUM_TILES");
        env::remove_var("NEURAEDGE_SEED");
        env::remove_var("NEURAEDGE_NOISE_ENABLED");

        assert_eq!(config.platform.num_tiles, 16);
        assert_eq!(config.platform.seed, Some(42));
        assert!(!config.device.noise_enabled);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = NeuraEdgeConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("mode".to_string(), "hybrid".to_string());
        cli_args.insert("tile_size".to_string(), "32".to_string());
        cli_args.insert("tile_size_typo".to_string(), "1".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.platform.mode, "hybrid");
        assert_eq!(config.platform.tile_size, 32);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("neuraedge.toml");

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[platform]").unwrap();
        writeln!(file, "mode = \"dense\"").unwrap();
        writeln!(file, "timesteps = 10").unwrap();

        env::set_var("NEURAEDGE_MODE", "snn");
        env::set_var("NEURAEDGE_TIMESTEPS", "20");

        let mut cli_args = HashMap::new();
        cli_args.insert("mode".to_string(), "hybrid".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("NEURAEDGE_MODE");
        env::remove_var("NEURAEDGE_TIMESTEPS");

        // CLI wins for mode, env wins for timesteps (no CLI override)
        assert_eq!(config.platform.mode, "hybrid");
        assert_eq!(config.platform.timesteps, 20);
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # NeuraEdge Configuration System
//!
//! Type-safe configuration loader for the NeuraEdge simulator with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use neuraedge_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("Tiles: {}", config.platform.num_tiles);
//! println!("Tile size: {}", config.platform.tile_size);
//! ```
//!
//! Every section carries `#[serde(default)]`, so an empty file yields the
//! documented platform defaults (4 tiles of 64x64 ReRAM, SNN mode, 100
//! timesteps, 8-bit quantization).

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_platform_matches_documented_defaults() {
        let config = NeuraEdgeConfig::default();
        assert_eq!(config.platform.num_tiles, 4);
        assert_eq!(config.platform.tile_size, 64);
        assert_eq!(config.platform.device_type, "reram");
        assert_eq!(config.platform.mode, "snn");
        assert_eq!(config.platform.timesteps, 100);
        assert_eq!(config.platform.quantization_bits, 8);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: NeuraEdgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.platform.num_tiles, 4);
        assert_eq!(config.crossbar.adc_bits, 8);
        assert!(config.crossbar.ir_drop_enabled);
    }
}

// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-neuraedge-routing`, `--debug-neuraedge-npu-tile`
//! to raise a single crate to debug level.

use std::collections::HashMap;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Environment variable holding comma-separated crate names (or `all`)
pub const DEBUG_ENV_VAR: &str = "NEURAEDGE_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use neuraedge_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-neuraedge-routing".to_string()]);
/// assert!(flags.is_enabled("neuraedge-routing"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
}

impl CrateDebugFlags {
    /// Looks for arguments matching `--debug-{crate-name}`.
    /// `--debug-all` enables every known crate.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    /// Merge a `NEURAEDGE_DEBUG`-style value: `all` or comma-separated names.
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                self.enable(crate_name);
            }
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string(), true);
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains_key(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` if enabled for the crate, `INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build an `EnvFilter` directive string.
    ///
    /// Format: `neuraedge_routing=debug,neuraedge_npu_tile=debug,<default>`.
    /// Crate names are converted to their module-path targets; the entries
    /// are sorted so the directive is stable.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut targets: Vec<String> = self
            .enabled_crates
            .keys()
            .map(|name| format!("{}=debug", crate_target(name)))
            .collect();
        targets.sort();
        targets.push(default_level.to_string());
        targets.join(",")
    }
}

/// Parse debug flags from process arguments and `NEURAEDGE_DEBUG`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var(DEBUG_ENV_VAR) {
        flags.merge_env_value(&value);
    }
    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {var}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {var}=all                               Enable debug for all crates
"#,
        KNOWN_CRATES.join(", "),
        var = DEBUG_ENV_VAR
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-neuraedge-routing".to_string()]);
        assert!(flags.is_enabled("neuraedge-routing"));
        assert!(!flags.is_enabled("neuraedge-power"));
    }

    #[test]
    fn test_unrelated_args_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "run_simulation".to_string(),
            "--config".to_string(),
            "neuraedge.toml".to_string(),
        ]);
        assert!(!flags.any_enabled());
        assert_eq!(flags.to_filter_string("warn"), "warn");
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_filter_string_uses_module_targets() {
        let flags = CrateDebugFlags::from_args(vec![
            "--debug-neuraedge-npu-tile".to_string(),
            "--debug-neuraedge-routing".to_string(),
        ]);
        assert_eq!(
            flags.to_filter_string("info"),
            "neuraedge_npu_tile=debug,neuraedge_routing=debug,info"
        );
    }

    #[test]
    fn test_env_value_merge() {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value("neuraedge-power, neuraedge-memory,");
        assert!(flags.is_enabled("neuraedge-power"));
        assert!(flags.is_enabled("neuraedge-memory"));
        assert_eq!(flags.enabled_crates.len(), 2);
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-neuraedge-power".to_string()]);
        assert_eq!(flags.log_level("neuraedge-power"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("neuraedge-routing"), tracing::Level::INFO);
    }
}

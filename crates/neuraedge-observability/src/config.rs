// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging output options

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Console line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Options for `init_logging`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingOptions {
    /// Level for crates without a debug flag (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
    /// Print event targets (module paths)
    pub with_target: bool,
    pub ansi: bool,
    /// Base directory for run folders (`file-logging` feature)
    pub log_dir: PathBuf,
    /// Number of most recent run folders kept (`file-logging` feature)
    pub retention_runs: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        LoggingOptions {
            level: "info".to_string(),
            format: LogFormat::Full,
            with_target: true,
            ansi: true,
            log_dir: PathBuf::from("./logs"),
            retention_runs: 10,
        }
    }
}

impl LoggingOptions {
    pub fn with_level(level: impl Into<String>) -> Self {
        LoggingOptions {
            level: level.into(),
            ..Default::default()
        }
    }
}

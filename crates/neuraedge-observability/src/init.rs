// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always installed. With the `file-logging` feature a
//! timestamped run folder is created as well:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── neuraedge.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingOptions};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps background log writers alive; logs are flushed on drop.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving file logs, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Build the `EnvFilter` for the given debug flags and default level.
pub fn build_filter(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string(default_level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

fn console_layer(options: &LoggingOptions, filter: EnvFilter) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(options.with_target)
        .with_ansi(options.ansi);
    match options.format {
        LogFormat::Full => layer.with_filter(filter).boxed(),
        LogFormat::Compact => layer.compact().with_filter(filter).boxed(),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the filter directives do not parse, the log directory cannot
/// be created, or a global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(console_layer(options, build_filter(debug_flags, &options.level)?));

    #[cfg(feature = "file-logging")]
    let (file_guard, run_folder) = {
        let run_folder = create_run_folder(&options.log_dir)?;
        cleanup_old_runs(&options.log_dir, options.retention_runs)?;

        let appender = tracing_appender::rolling::never(&run_folder, "neuraedge.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(build_filter(debug_flags, &options.level)?)
            .boxed();
        layers.push(file_layer);
        (guard, run_folder)
    };

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    #[cfg(feature = "file-logging")]
    return Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir: Some(run_folder),
    });

    #[cfg(not(feature = "file-logging"))]
    Ok(LoggingGuard { log_dir: None })
}

/// Initialize console logging at `info` with default options
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingOptions::default())
}

#[cfg(feature = "file-logging")]
fn create_run_folder(base_log_dir: &Path) -> Result<PathBuf> {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_folder = base_log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    Ok(run_folder)
}

/// Keep only the newest `retention_runs` run folders.
///
/// Folder names embed a zero-padded timestamp, so name order is age order.
#[cfg(feature = "file-logging")]
fn cleanup_old_runs(base_log_dir: &Path, retention_runs: usize) -> Result<()> {
    let mut runs: Vec<PathBuf> = std::fs::read_dir(base_log_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("run_"))
        })
        .collect();
    runs.sort();

    if runs.len() > retention_runs {
        let to_remove = runs.len() - retention_runs;
        for path in runs.iter().take(to_remove) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_debug_flags() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-neuraedge-npu-engine".to_string()]);
        assert!(build_filter(&flags, "info").is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage_level() {
        let flags = CrateDebugFlags::default();
        assert!(build_filter(&flags, "neuraedge=loud").is_err());
    }

    #[cfg(feature = "file-logging")]
    #[test]
    fn test_cleanup_keeps_newest_runs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["run_20250101_000000", "run_20250102_000000", "run_20250103_000000"] {
            std::fs::create_dir_all(dir.path().join(name)).unwrap();
        }
        cleanup_old_runs(dir.path(), 2).unwrap();
        assert!(!dir.path().join("run_20250101_000000").exists());
        assert!(dir.path().join("run_20250103_000000").exists());
    }
}

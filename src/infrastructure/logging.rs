//! Logging system configuration and initialization
//!
//! - Console output on stderr so command output on stdout stays clean
//! - Optional file logging through a non-blocking appender
//! - Optional structured JSON file logs
//! - `RUST_LOG` overrides the configured filter entirely
//! - Local timezone timestamps

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::Local;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;
use crate::infrastructure::config::ConfigManager;

/// Name of the log file written by this process
pub const LOG_FILE_NAME: &str = "imei-blackbird.log";

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> =
        Mutex::new(Vec::new());
}

/// Local time with millisecond precision
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Log directory from the configuration, or `logs/` under the local data dir
pub fn get_log_directory(config: &LoggingConfig) -> PathBuf {
    config.log_dir.clone().unwrap_or_else(|| {
        ConfigManager::get_app_data_dir()
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_default())
            .join("logs")
    })
}

/// Filter built from `RUST_LOG`, falling back to the configured level plus
/// module filters
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(config))
}

fn configured_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::new(&config.level);

    // Dependency chatter stays quiet unless TRACE is requested
    if !config.level.to_lowercase().contains("trace") {
        let mut modules: Vec<_> = config.module_filters.iter().collect();
        modules.sort();
        for (module, level) in modules {
            match format!("{}={}", module, level).parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => eprintln!("Ignoring log filter {}={}: {}", module, level, e),
            }
        }
    }

    filter
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize logging with custom configuration
///
/// # Environment Variable Override
/// ```bash
/// # Show HTTP client details
/// RUST_LOG="debug,reqwest=debug,hyper=debug" imei-blackbird generate --model "Galaxy S10"
/// ```
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
    });

    let mut log_dir = None;
    let file_layer = if config.file_output {
        let dir = get_log_directory(config);
        std::fs::create_dir_all(&dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", dir, e))?;

        let file_appender = rolling::daily(&dir, LOG_FILE_NAME);
        let (file_writer, file_guard) = non_blocking(file_appender);

        // Store the guard globally to prevent it from being dropped
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        let layer = if config.json_format {
            fmt::Layer::new()
                .json()
                .with_writer(file_writer)
                .with_timer(LocalTimeFormatter)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(LocalTimeFormatter)
                .with_target(false)
                .with_ansi(false)
                .boxed()
        };
        log_dir = Some(dir);
        Some(layer)
    } else {
        None
    };

    Registry::default()
        .with(build_env_filter(config))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    debug!("Logging system initialized");
    debug!("Log level: {}", config.level);
    if let Some(dir) = log_dir {
        debug!("Log directory: {:?} (JSON: {})", dir, config.json_format);
        if config.auto_cleanup_logs {
            cleanup_old_logs(&dir, config.max_files)?;
        }
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== IMEI Blackbird v{} ===", env!("CARGO_PKG_VERSION"));
    debug!("Operating system: {}", std::env::consts::OS);
    debug!("Architecture: {}", std::env::consts::ARCH);
    if let Ok(current_dir) = std::env::current_dir() {
        debug!("Working directory: {:?}", current_dir);
    }
}

/// Keeps the newest `max_files` log files in `log_dir`. Returns how many were removed.
pub fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let mut log_files = Vec::new();
    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_NAME));
        if path.is_file() && is_log {
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let keep = max_files as usize;
    let mut removed = 0;
    for (path, _) in log_files.iter().skip(keep) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove old log file {:?}: {}", path, e);
        } else {
            debug!("Removed old log file: {:?}", path);
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.console_output);
        assert!(!config.file_output);
        assert_eq!(config.module_filters.get("reqwest").map(String::as_str), Some("warn"));
    }

    #[test]
    fn test_log_directory_override() {
        let config = LoggingConfig {
            log_dir: Some(PathBuf::from("/tmp/imei-logs")),
            ..LoggingConfig::default()
        };
        assert_eq!(get_log_directory(&config), PathBuf::from("/tmp/imei-logs"));
        assert!(get_log_directory(&LoggingConfig::default()).ends_with("logs"));
    }

    #[test]
    fn test_no_output_is_rejected() {
        let config = LoggingConfig {
            console_output: false,
            file_output: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging_with_config(&config).is_err());
    }

    #[test]
    fn test_configured_filter_includes_modules() {
        let filter = configured_filter(&LoggingConfig::default()).to_string();
        assert!(filter.contains("reqwest=warn"));
        assert!(filter.contains("info"));
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let base = SystemTime::now() - Duration::from_secs(3600);
        for i in 0..4u64 {
            let path = dir.path().join(format!("{}.2026-01-0{}", LOG_FILE_NAME, i + 1));
            std::fs::write(&path, "x").unwrap();
            let file = std::fs::File::options().write(true).open(&path).unwrap();
            file.set_modified(base + Duration::from_secs(i * 60)).unwrap();
        }
        std::fs::write(dir.path().join("unrelated.txt"), "y").unwrap();

        let removed = cleanup_old_logs(dir.path(), 2).unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join(format!("{}.2026-01-04", LOG_FILE_NAME)).exists());
        assert!(dir.path().join(format!("{}.2026-01-03", LOG_FILE_NAME)).exists());
        assert!(!dir.path().join(format!("{}.2026-01-01", LOG_FILE_NAME)).exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }
}

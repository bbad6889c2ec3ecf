//! Logging configuration and initialization
//!
//! Console output (compact or JSON) plus optional non-blocking file output.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter directive env var, checked before `RUST_LOG`
pub const LOG_ENV_VAR: &str = "MUG_MOCKUP_LOG";
/// Set to "json" for JSON console output
pub const LOG_FORMAT_ENV_VAR: &str = "MUG_MOCKUP_LOG_FORMAT";

/// Logging setup failures
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to create log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Write to this file as well (default: none)
    pub file_path: Option<PathBuf>,
    /// Use JSON format for console logs (default: false)
    pub json_format: bool,
    /// Filter used when no env var is set (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Whether JSON output was requested by config or environment
    fn use_json(&self) -> bool {
        std::env::var(LOG_FORMAT_ENV_VAR)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(self.json_format)
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
            .unwrap_or_else(|_| EnvFilter::new(&self.default_level))
    }
}

/// Initialize the global subscriber
///
/// Keep the returned guard alive for the program's lifetime so buffered file
/// output gets flushed.
///
/// ```no_run
/// use mug_mockup::telemetry::{init_logging, LogConfig};
///
/// let _guard = init_logging(&LogConfig::default());
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, TelemetryError> {
    let use_json = config.use_json();
    let subscriber = tracing_subscriber::registry().with(config.env_filter());

    let (file_layer, file_guard) = match &config.file_path {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|source| TelemetryError::LogFile {
                path: path.clone(),
                source,
            })?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false); // No ANSI colors in file
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_enabled = config.console_enabled;
    let json_layer = (console_enabled && use_json).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });
    let compact_layer = (console_enabled && !use_json).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });

    subscriber
        .with(file_layer)
        .with(json_layer)
        .with(compact_layer)
        .try_init()?;

    tracing::info!(
        target: "mug_mockup",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file = ?config.file_path,
        "Logging initialized"
    );

    Ok(file_guard)
}

// Re-export WorkerGuard so callers can store it
pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(config.console_enabled);
        assert!(config.file_path.is_none());
        assert!(!config.json_format);
        assert_eq!(config.default_level, "info");
    }

    #[test]
    fn test_unwritable_log_file_is_reported() {
        let config = LogConfig {
            console_enabled: false,
            file_path: Some(PathBuf::from("/nonexistent-dir/mug-mockup.log")),
            ..LogConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(TelemetryError::LogFile { .. })));
    }
}

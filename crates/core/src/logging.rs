//! Logging setup for Armory binaries.
//!
//! Libraries in the workspace only emit `tracing` events; this module installs the
//! subscriber that renders them, with structured output and optional file logging.
//!
//! # Environment Variables
//!
//! - `ARMORY_LOG`: Filter directive (like `RUST_LOG`), e.g., `armory_skills=debug`
//! - `ARMORY_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `ARMORY_LOG_DIR`: Directory for file logs (default `~/.armory/logs`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! # format = "pretty"
//!
//! [logging.file]
//! enabled = false
//! level = "debug"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use armory_core::logging;
//!
//! let _guard = logging::init_logging(None)?;
//! # Ok::<(), armory_core::Error>(())
//! ```

use crate::Error;
use crate::config::{FileLoggingConfig, LoggingConfig as ConfigLoggingConfig};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    /// All available log formats.
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    /// Parse a log format from a string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    /// Get the string representation of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// Runtime logging settings, built from the `[logging]` table or by hand.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level for stderr output.
    pub level: String,
    /// Output format for stderr; `None` picks by TTY detection.
    pub format: Option<LogFormat>,
    /// File logging configuration (optional).
    pub file: Option<FileLoggingConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: None, file: None }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        Self {
            level: config.level,
            format: config.format.as_deref().and_then(LogFormat::parse_str),
            file: if config.file.enabled { Some(config.file) } else { None },
        }
    }
}

impl LoggingConfig {
    /// Create a new logging config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Enable file logging.
    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file = Some(config);
        self
    }

    /// Build the stderr filter from environment variables and the configured level.
    fn build_env_filter(&self) -> EnvFilter {
        let filter = env::var("ARMORY_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone());

        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Detect if stderr is a TTY for pretty formatting.
    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the format for stderr output.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("ARMORY_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if let Some(fmt) = self.format {
            return fmt;
        }

        if Self::is_tty() { LogFormat::Pretty } else { LogFormat::Compact }
    }

    /// Get the log directory path.
    fn get_log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("ARMORY_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".armory").join("logs"))
    }
}

/// Keeps the non-blocking file writer alive; drop it at shutdown to flush.
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the global tracing subscriber.
///
/// Sets up a stderr layer filtered by `ARMORY_LOG`/`RUST_LOG` (or the configured
/// level) and, when enabled, a JSON file layer with daily rotation.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<LoggingGuard, Error> {
    let config = config.unwrap_or_default();
    let stderr_filter = config.build_env_filter();
    let format = config.detect_format();

    let mut file_guard = None;
    let file_layer = match &config.file {
        Some(file_config) => {
            let log_dir = LoggingConfig::get_log_dir()?;
            std::fs::create_dir_all(&log_dir)
                .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

            let file_appender = tracing_appender::rolling::daily(log_dir, "armory.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            file_guard = Some(guard);

            let file_filter = EnvFilter::try_new(&file_config.level).unwrap_or_else(|_| EnvFilter::new("debug"));
            Some(fmt::layer().json().with_writer(non_blocking).with_filter(file_filter))
        }
        None => None,
    };

    let registry = Registry::default().with(file_layer);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_ansi(true)
                    .with_filter(stderr_filter),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr).with_filter(stderr_filter))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(io::stderr).with_filter(stderr_filter))
            .try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(LoggingGuard { _file_guard: file_guard })
}

/// Sanitize file paths for logging (replace the home directory with `~`).
pub fn sanitize_path(path: &Path) -> String {
    if let Ok(home) = env::var("HOME")
        && !home.is_empty()
        && home != "/"
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::parse_str("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse_str("PRETTY"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse_str("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse_str("compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse_str("invalid"), None);
    }

    #[test]
    fn test_log_format_as_str_round_trips() {
        for format in LogFormat::VALUES {
            assert_eq!(LogFormat::parse_str(format.as_str()), Some(*format));
        }
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert!(config.format.is_none());
        assert!(config.file.is_none());
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .with_level("debug")
            .with_format(LogFormat::Json)
            .with_file_logging(FileLoggingConfig { enabled: true, level: "trace".to_string() });

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, Some(LogFormat::Json));
        assert_eq!(config.file.unwrap().level, "trace");
    }

    #[test]
    fn test_logging_config_from_config_section() {
        let section = ConfigLoggingConfig {
            level: "info".to_string(),
            format: Some("compact".to_string()),
            file: FileLoggingConfig { enabled: false, level: "debug".to_string() },
        };
        let config = LoggingConfig::from(section);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, Some(LogFormat::Compact));
        assert!(config.file.is_none());
    }

    #[test]
    fn test_logging_config_from_default_section_leaves_format_to_tty() {
        let config = LoggingConfig::from(ConfigLoggingConfig::default());
        assert!(config.format.is_none());
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn test_logging_config_from_section_with_file() {
        let section = ConfigLoggingConfig {
            level: "warn".to_string(),
            format: Some("bogus".to_string()),
            file: FileLoggingConfig { enabled: true, level: "debug".to_string() },
        };
        let config = LoggingConfig::from(section);
        assert!(config.format.is_none());
        assert!(config.file.is_some());
    }

    #[test]
    fn test_sanitize_path() {
        let home = env::var("HOME").unwrap_or_default();
        let test_path = PathBuf::from(&home).join("project").join("skills");
        if !home.is_empty() && home != "/" {
            assert_eq!(sanitize_path(&test_path), "~/project/skills");
        }

        let abs_path = PathBuf::from("/var/lib/armory/skills");
        if home.is_empty() || !abs_path.starts_with(&home) {
            assert_eq!(sanitize_path(&abs_path), "/var/lib/armory/skills");
        }
    }
}

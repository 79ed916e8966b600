use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default timeout for the global skills CLI, in milliseconds
pub const DEFAULT_CLI_TIMEOUT_MS: u64 = 15_000;

/// Default project-local skills directory, relative to the working directory
pub const DEFAULT_LOCAL_SKILLS_DIR: &str = "skills";

/// Default program used to list globally installed skills
pub const DEFAULT_CLI_PROGRAM: &str = "npx";

/// Default arguments passed to [`DEFAULT_CLI_PROGRAM`]
pub const DEFAULT_CLI_ARGS: &[&str] = &["@djm204/agent-skills", "--list"];

/// Skill registry configuration (the `[registry]` table)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Project-local skills directory (defaults to `<cwd>/skills`)
    pub local_skills_dir: Option<PathBuf>,

    /// Timeout for the global skills CLI
    pub cli_timeout_ms: u64,

    /// Program that lists globally installed skills as JSON on stdout
    pub cli_program: String,

    /// Arguments for `cli_program`
    pub cli_args: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            local_skills_dir: None,
            cli_timeout_ms: DEFAULT_CLI_TIMEOUT_MS,
            cli_program: DEFAULT_CLI_PROGRAM.to_string(),
            cli_args: DEFAULT_CLI_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RegistryConfig {
    /// Set the local skills directory.
    pub fn with_local_skills_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_skills_dir = Some(dir.into());
        self
    }

    /// Set the CLI timeout in milliseconds.
    pub fn with_cli_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.cli_timeout_ms = timeout_ms;
        self
    }

    /// CLI timeout as a [`Duration`].
    pub fn cli_timeout(&self) -> Duration {
        Duration::from_millis(self.cli_timeout_ms)
    }

    /// The local skills directory, with relative paths anchored at the working directory.
    pub fn resolved_local_dir(&self) -> PathBuf {
        let dir = self
            .local_skills_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_SKILLS_DIR));

        if dir.is_absolute() {
            return dir;
        }

        std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(dir)
    }

    fn validate(&self) -> Result<()> {
        if self.cli_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::InvalidTimeout.to_string()));
        }
        if self.cli_program.trim().is_empty() {
            return Err(Error::Config(ConfigError::EmptyProgram.to_string()));
        }
        Ok(())
    }
}

/// File logging settings (the `[logging.file]` table)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileLoggingConfig {
    /// Write JSON logs to a daily-rolling file
    pub enabled: bool,

    /// Level for the file layer
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: "debug".to_string() }
    }
}

/// Logging settings (the `[logging]` table)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level for stderr output
    pub level: String,

    /// Output format for stderr: pretty, json or compact (unset: pretty on a TTY, compact otherwise)
    pub format: Option<String>,

    /// File logging
    pub file: FileLoggingConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: None, file: FileLoggingConfig::default() }
    }
}

/// Root configuration structure for armory.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Skill registry settings
    pub registry: RegistryConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).map_err(|e| Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.registry.validate()
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# Armory Configuration Example
# Copy this file to armory.toml and customize as needed

[registry]
# Project-local skill contracts (*.json); relative paths resolve against the cwd
local_skills_dir = "skills"
# Timeout for the global skills CLI, in milliseconds
cli_timeout_ms = 15000
# Command that prints globally installed skills as a JSON array
cli_program = "npx"
cli_args = ["@djm204/agent-skills", "--list"]

[logging]
# Filter for stderr output (overridden by ARMORY_LOG / RUST_LOG)
level = "warn"
# Output format: "pretty", "json", or "compact" (unset: pretty on a TTY, compact otherwise)
# format = "pretty"

[logging.file]
# Daily-rolling JSON logs under ~/.armory/logs (or ARMORY_LOG_DIR)
enabled = false
level = "debug"
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Timeout must be positive
    #[error("cli_timeout_ms must be greater than zero")]
    InvalidTimeout,

    /// Program must be named
    #[error("cli_program must not be empty")]
    EmptyProgram,

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

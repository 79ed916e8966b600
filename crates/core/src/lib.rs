//! Shared foundation for the Armory workspace: errors, configuration and logging.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, FileLoggingConfig, RegistryConfig};
pub use error::{Error, Result};
pub use logging::{LogFormat, LoggingGuard, init_logging, sanitize_path};

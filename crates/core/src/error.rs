use thiserror::Error;

/// Result type alias for armory-core
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error for the Armory workspace
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Skill registry errors, keyed by their stable code
    #[error("{code}: {message}")]
    Registry { code: &'static str, message: String },

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a registry error from a stable code and message.
    pub fn registry(code: &'static str, message: impl Into<String>) -> Self {
        Self::Registry { code, message: message.into() }
    }

    /// The stable registry code, if this error came from the skill registry.
    pub fn registry_code(&self) -> Option<&'static str> {
        match self {
            Self::Registry { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

use std::path::PathBuf;

/// Stable, machine-readable code for every registry failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidContract,
    RegistryNotSynced,
    CliFailure,
    CliTimeout,
    ParseError,
    DuplicateSkillId,
    IoError,
}

impl ErrorCode {
    pub const VALUES: &[ErrorCode] = &[
        ErrorCode::InvalidContract,
        ErrorCode::RegistryNotSynced,
        ErrorCode::CliFailure,
        ErrorCode::CliTimeout,
        ErrorCode::ParseError,
        ErrorCode::DuplicateSkillId,
        ErrorCode::IoError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidContract => "INVALID_CONTRACT",
            ErrorCode::RegistryNotSynced => "REGISTRY_NOT_SYNCED",
            ErrorCode::CliFailure => "CLI_FAILURE",
            ErrorCode::CliTimeout => "CLI_TIMEOUT",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::DuplicateSkillId => "DUPLICATE_SKILL_ID",
            ErrorCode::IoError => "IO_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::VALUES
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| format!("unknown error code: {s}"))
    }
}

/// One failed validation rule. The code is always `INVALID_CONTRACT`; `field`
/// names the offending path (e.g. `constraints.sandbox_type`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    pub field: &'static str,
    pub message: String,
}

impl ContractViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidContract
    }
}

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors raised by the skill registry and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SkillRegistryError {
    #[error("{message}")]
    InvalidContract { message: String, skill_id: Option<String>, violations: Vec<ContractViolation> },

    #[error("Registry has not been synced. Await sync() before querying.")]
    NotSynced,

    #[error("{0}")]
    CliFailure(String),

    #[error("{command} timed out after {timeout_ms}ms")]
    CliTimeout { command: String, timeout_ms: u64 },

    #[error("{0}")]
    Parse(String),

    #[error("Duplicate skill_id: {0}")]
    DuplicateSkillId(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SkillRegistryError {
    /// Rejection of a contract passed to `register`.
    pub fn invalid_contract(skill_id: impl Into<String>, violations: Vec<ContractViolation>) -> Self {
        let skill_id = skill_id.into();
        let details = violations.iter().map(|v| v.message.as_str()).collect::<Vec<_>>().join("; ");
        Self::InvalidContract {
            message: format!("Cannot register skill \"{skill_id}\": {details}"),
            skill_id: Some(skill_id),
            violations,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidContract { .. } => ErrorCode::InvalidContract,
            Self::NotSynced => ErrorCode::RegistryNotSynced,
            Self::CliFailure(_) => ErrorCode::CliFailure,
            Self::CliTimeout { .. } => ErrorCode::CliTimeout,
            Self::Parse(_) => ErrorCode::ParseError,
            Self::DuplicateSkillId(_) => ErrorCode::DuplicateSkillId,
            Self::Io { .. } => ErrorCode::IoError,
        }
    }

    /// The skill this error is about, when there is one.
    pub fn skill_id(&self) -> Option<&str> {
        match self {
            Self::InvalidContract { skill_id, .. } => skill_id.as_deref(),
            Self::DuplicateSkillId(id) => Some(id),
            _ => None,
        }
    }

    /// Field-level detail for `INVALID_CONTRACT`; empty for every other code.
    pub fn violations(&self) -> &[ContractViolation] {
        match self {
            Self::InvalidContract { violations, .. } => violations,
            _ => &[],
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, SkillRegistryError>;

impl From<SkillRegistryError> for armory_core::Error {
    fn from(err: SkillRegistryError) -> Self {
        armory_core::Error::registry(err.code().as_str(), err.to_string())
    }
}

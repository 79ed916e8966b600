//! Structured diagnostics emitted by the registry components.
//!
//! Components never log directly: they hold an [`EventSink`] and emit typed
//! [`RegistryEvent`]s. [`TracingSink`] renders them through `tracing`;
//! [`RecordingSink`] keeps them in memory for assertions.

use std::path::PathBuf;
use std::sync::Mutex;

use armory_core::sanitize_path;

use crate::error::{ErrorCode, SkillRegistryError};
use crate::types::{SandboxType, SkillContract, SkillSource};

/// Severity an event is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// A globally listed entry failed validation and was skipped.
    InvalidGlobalEntry { skill_id: Option<String>, errors: Vec<String> },

    /// A second entry claimed an id already taken within the same source.
    DuplicateSkill { skill_id: String, source: SkillSource },

    /// The local skills directory does not exist; no local skills this sync.
    LocalDirMissing { dir: PathBuf },

    /// A local file could not be read or parsed as JSON.
    LocalFileUnreadable { file: PathBuf, error: String },

    /// A local file parsed but failed validation.
    InvalidLocalFile { file: PathBuf, errors: Vec<String> },

    /// `register` replaced an existing entry with a local contract.
    LocalOverride { skill_id: String },

    SyncStarted { local_dir: PathBuf },

    /// Inventory record for one registered skill, with its safety flags.
    SkillRegistered {
        skill_id: String,
        source: SkillSource,
        is_destructive: bool,
        requires_hitl: bool,
        sandbox_type: SandboxType,
        is_override: bool,
    },

    SyncCompleted { global: usize, local: usize, registered: usize, overrides: usize },

    SyncFailed { code: ErrorCode, message: String },

    /// A lookup missed and a placeholder contract was generated for the developer.
    ScaffoldGenerated { skill_id: String, hint: String, template: Box<SkillContract> },
}

impl RegistryEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            Self::InvalidGlobalEntry { .. }
            | Self::DuplicateSkill { .. }
            | Self::LocalFileUnreadable { .. }
            | Self::InvalidLocalFile { .. } => EventLevel::Error,
            Self::SyncFailed { .. } | Self::ScaffoldGenerated { .. } => EventLevel::Warn,
            Self::LocalDirMissing { .. }
            | Self::LocalOverride { .. }
            | Self::SyncStarted { .. }
            | Self::SyncCompleted { .. } => EventLevel::Info,
            Self::SkillRegistered { .. } => EventLevel::Debug,
        }
    }

    /// The skill the event concerns, if any.
    pub fn skill_id(&self) -> Option<&str> {
        match self {
            Self::InvalidGlobalEntry { skill_id, .. } => skill_id.as_deref(),
            Self::DuplicateSkill { skill_id, .. }
            | Self::LocalOverride { skill_id }
            | Self::SkillRegistered { skill_id, .. }
            | Self::ScaffoldGenerated { skill_id, .. } => Some(skill_id),
            _ => None,
        }
    }
}

/// Destination for registry diagnostics.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RegistryEvent);
}

/// Renders events as `tracing` records with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: RegistryEvent) {
        match event {
            RegistryEvent::InvalidGlobalEntry { skill_id, errors } => {
                tracing::error!(skill_id = ?skill_id, errors = ?errors, "Invalid skill entry from global source: skipping");
            }
            RegistryEvent::DuplicateSkill { skill_id, source } => {
                let error = SkillRegistryError::DuplicateSkillId(skill_id);
                tracing::error!(
                    skill_id = ?error.skill_id(),
                    source = %source,
                    code = %error.code(),
                    "{} in {} source: keeping first",
                    error,
                    source
                );
            }
            RegistryEvent::LocalDirMissing { dir } => {
                tracing::info!(dir = %sanitize_path(&dir), "Local skills directory does not exist: skipping local skills");
            }
            RegistryEvent::LocalFileUnreadable { file, error } => {
                tracing::error!(file = %sanitize_path(&file), error = %error, "Failed to parse local skill file: skipping");
            }
            RegistryEvent::InvalidLocalFile { file, errors } => {
                tracing::error!(file = %sanitize_path(&file), errors = ?errors, "Invalid contract in local skill file: skipping");
            }
            RegistryEvent::LocalOverride { skill_id } => {
                tracing::info!(skill_id = %skill_id, source = "LOCAL", "Local skill overrides global entry");
            }
            RegistryEvent::SyncStarted { local_dir } => {
                tracing::info!(local_dir = %sanitize_path(&local_dir), "Syncing skill registry");
            }
            RegistryEvent::SkillRegistered {
                skill_id,
                source,
                is_destructive,
                requires_hitl,
                sandbox_type,
                is_override,
            } => {
                tracing::debug!(
                    skill_id = %skill_id,
                    source = %source,
                    is_destructive,
                    requires_hitl,
                    sandbox_type = %sandbox_type,
                    is_override,
                    "Registered skill"
                );
            }
            RegistryEvent::SyncCompleted { global, local, registered, overrides } => {
                tracing::info!(global, local, registered, overrides, "Skill registry synced");
            }
            RegistryEvent::SyncFailed { code, message } => {
                tracing::warn!(code = %code, error = %message, "Skill registry sync failed");
            }
            RegistryEvent::ScaffoldGenerated { skill_id, hint, template } => {
                let template = serde_json::to_string(&template).unwrap_or_default();
                tracing::warn!(skill_id = %skill_id, template = %template, "{}", hint);
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RegistryEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in order.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Events at exactly `level`.
    pub fn at_level(&self, level: EventLevel) -> Vec<RegistryEvent> {
        self.events().into_iter().filter(|e| e.level() == level).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: RegistryEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}

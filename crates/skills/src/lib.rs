//! Armory skill registry
//!
//! This crate keeps a typed, validated inventory of agent skills. Contracts
//! come from two places: the globally installed `@djm204/agent-skills`
//! package (listed through its CLI) and a project-local directory of JSON
//! files. A sync merges both, with local contracts overriding global ones, and
//! reads are refused until a sync has completed.

mod agent_cli;
mod discovery;
mod error;
mod events;
mod loader;
mod managed;
mod registry;
mod resolver;
mod scaffold;
mod types;
mod validator;

pub use agent_cli::{AgentSkillsCli, SkillCli, parse_cli_output};
pub use discovery::DiscoveryService;
pub use error::{ContractViolation, ErrorCode, Result, SkillRegistryError};
pub use events::{EventLevel, EventSink, RecordingSink, RegistryEvent, TracingSink};
pub use loader::{CONTRACT_EXTENSION, LocalSkillLoader};
pub use managed::{ManagedRegistry, SyncReport, create_registry, create_registry_with_sink};
pub use registry::SkillRegistry;
pub use resolver::{DroppedDuplicate, Resolution, resolve_skills};
pub use scaffold::{ScaffoldGenerator, SkillScaffold, scaffold_template};
pub use types::{SandboxType, SkillConstraints, SkillContract, SkillInterface, SkillMetadata, SkillSource};
pub use validator::{check_contract, validate_skill_contract};

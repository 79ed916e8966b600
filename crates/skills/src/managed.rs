//! Sync orchestration over the registry and its collaborators.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use armory_core::RegistryConfig;

use crate::agent_cli::{AgentSkillsCli, SkillCli};
use crate::discovery::DiscoveryService;
use crate::error::{Result, SkillRegistryError};
use crate::events::{EventSink, RegistryEvent, TracingSink};
use crate::loader::LocalSkillLoader;
use crate::registry::SkillRegistry;
use crate::resolver::{Resolution, resolve_skills};
use crate::scaffold::{ScaffoldGenerator, SkillScaffold};
use crate::types::SkillContract;

/// Summary of one successful sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Valid, distinct contracts from the global source
    pub global: usize,
    /// Valid contracts from the local directory
    pub local: usize,
    /// Contracts in the registry after the sync
    pub registered: usize,
    /// Ids where a local contract replaced a global one, sorted
    pub overrides: Vec<String>,
}

/// A [`SkillRegistry`] kept in step with the global package and the local
/// skills directory.
///
/// Each `sync` is a full replace: the store is cleared, both sources are read
/// concurrently, merged with local-first precedence and registered. If either
/// source fails, the store stays empty and unsynced.
pub struct ManagedRegistry<C = AgentSkillsCli, S = SkillScaffold> {
    registry: SkillRegistry,
    discovery: DiscoveryService<C>,
    loader: LocalSkillLoader,
    scaffold: S,
    local_skills_dir: PathBuf,
    sink: Arc<dyn EventSink>,
}

/// Build the production registry from configuration, logging through `tracing`.
pub fn create_registry(config: &RegistryConfig) -> ManagedRegistry {
    create_registry_with_sink(config, Arc::new(TracingSink))
}

/// Build the production registry with a custom event sink.
pub fn create_registry_with_sink(config: &RegistryConfig, sink: Arc<dyn EventSink>) -> ManagedRegistry {
    let local_skills_dir = config.resolved_local_dir();
    let scaffold = SkillScaffold::new(local_skills_dir.clone(), sink.clone());
    ManagedRegistry::with_parts(AgentSkillsCli::from_config(config), scaffold, local_skills_dir, sink)
}

impl<C: SkillCli, S: ScaffoldGenerator> ManagedRegistry<C, S> {
    pub fn with_parts(cli: C, scaffold: S, local_skills_dir: impl Into<PathBuf>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            registry: SkillRegistry::new(sink.clone()),
            discovery: DiscoveryService::new(cli, sink.clone()),
            loader: LocalSkillLoader::new(sink.clone()),
            scaffold,
            local_skills_dir: local_skills_dir.into(),
            sink,
        }
    }

    /// Rebuild the registry from both sources.
    ///
    /// Collaborator failures (`CLI_FAILURE`, `CLI_TIMEOUT`, `PARSE_ERROR`,
    /// `IO_ERROR`) are returned unchanged.
    pub async fn sync(&mut self) -> Result<SyncReport> {
        self.sink.emit(RegistryEvent::SyncStarted { local_dir: self.local_skills_dir.clone() });
        self.registry.clear_store();

        let fetched = tokio::try_join!(self.discovery.discover(), self.loader.load(&self.local_skills_dir));
        let (globals, locals) = match fetched {
            Ok(lists) => lists,
            Err(e) => return Err(self.fail(e)),
        };

        let (global, local) = (globals.len(), locals.len());
        let resolution = resolve_skills(globals, locals);
        for duplicate in &resolution.duplicates {
            self.sink.emit(RegistryEvent::DuplicateSkill {
                skill_id: duplicate.skill_id.clone(),
                source: duplicate.source,
            });
        }

        let inventory = inventory_records(&resolution);
        let overrides: Vec<String> = resolution.overrides.iter().cloned().collect();

        for contract in resolution.skills.into_values() {
            if let Err(e) = self.registry.register(contract) {
                self.registry.clear_store();
                return Err(self.fail(e));
            }
        }
        self.registry.mark_synced();

        for record in inventory {
            self.sink.emit(record);
        }

        let report = SyncReport { global, local, registered: self.registry.len(), overrides };
        self.sink.emit(RegistryEvent::SyncCompleted {
            global: report.global,
            local: report.local,
            registered: report.registered,
            overrides: report.overrides.len(),
        });

        Ok(report)
    }

    /// Look up a skill. A miss after a sync asks the scaffold for a template
    /// (advisory only) and still returns `None`.
    pub fn get_skill(&self, id: &str) -> Result<Option<&SkillContract>> {
        let found = self.registry.get_skill(id)?;
        if found.is_none() {
            self.scaffold.generate(id);
        }
        Ok(found)
    }

    pub fn get_all(&self) -> Result<Vec<&SkillContract>> {
        self.registry.get_all()
    }

    pub fn has_skill(&self, id: &str) -> Result<bool> {
        self.registry.has_skill(id)
    }

    pub fn is_synced(&self) -> bool {
        self.registry.is_synced()
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    pub fn local_skills_dir(&self) -> &Path {
        &self.local_skills_dir
    }

    fn fail(&self, error: SkillRegistryError) -> SkillRegistryError {
        self.sink.emit(RegistryEvent::SyncFailed { code: error.code(), message: error.to_string() });
        error
    }
}

fn inventory_records(resolution: &Resolution) -> Vec<RegistryEvent> {
    resolution
        .skills
        .values()
        .map(|contract| RegistryEvent::SkillRegistered {
            skill_id: contract.skill_id.clone(),
            source: contract.metadata.source,
            is_destructive: contract.constraints.is_destructive,
            requires_hitl: contract.constraints.requires_hitl,
            sandbox_type: contract.constraints.sandbox_type,
            is_override: resolution.is_override(&contract.skill_id),
        })
        .collect()
}

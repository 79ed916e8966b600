//! Validated discovery of globally installed skills.

use std::collections::HashSet;
use std::sync::Arc;

use crate::agent_cli::SkillCli;
use crate::error::Result;
use crate::events::{EventSink, RegistryEvent};
use crate::types::{SkillContract, SkillSource};
use crate::validator::validate_skill_contract;

/// Lists raw entries through a [`SkillCli`] and keeps the valid, first-seen ones.
pub struct DiscoveryService<C> {
    cli: C,
    sink: Arc<dyn EventSink>,
}

impl<C: SkillCli> DiscoveryService<C> {
    pub fn new(cli: C, sink: Arc<dyn EventSink>) -> Self {
        Self { cli, sink }
    }

    pub fn cli(&self) -> &C {
        &self.cli
    }

    /// Invalid and duplicate entries are reported and skipped; a failure of the
    /// CLI itself is returned unchanged.
    pub async fn discover(&self) -> Result<Vec<SkillContract>> {
        let raw_entries = self.cli.list().await?;
        let mut contracts = Vec::with_capacity(raw_entries.len());
        let mut seen = HashSet::new();

        for entry in raw_entries {
            let contract = match validate_skill_contract(&entry) {
                Ok(contract) => contract,
                Err(violations) => {
                    self.sink.emit(RegistryEvent::InvalidGlobalEntry {
                        skill_id: entry.get("skill_id").and_then(|v| v.as_str()).map(str::to_string),
                        errors: violations.into_iter().map(|v| v.message).collect(),
                    });
                    continue;
                }
            };

            if !seen.insert(contract.skill_id.clone()) {
                self.sink.emit(RegistryEvent::DuplicateSkill { skill_id: contract.skill_id, source: SkillSource::Global });
                continue;
            }

            contracts.push(contract);
        }

        Ok(contracts)
    }
}

//! In-memory skill store gated on a completed sync.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, SkillRegistryError};
use crate::events::{EventSink, RegistryEvent};
use crate::types::SkillContract;
use crate::validator::check_contract;

/// Keyed store of validated contracts.
///
/// Reads fail with `REGISTRY_NOT_SYNCED` until the owning orchestrator has
/// completed a sync. Contracts are replaced whole, never patched.
pub struct SkillRegistry {
    store: BTreeMap<String, SkillContract>,
    synced: bool,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for SkillRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillRegistry")
            .field("skills", &self.store.len())
            .field("synced", &self.synced)
            .finish()
    }
}

impl SkillRegistry {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { store: BTreeMap::new(), synced: false, sink }
    }

    /// Validate and store a contract.
    ///
    /// A new id is inserted. An existing id is replaced only by a LOCAL contract
    /// (logged as an override); a non-local contract never displaces an existing
    /// entry and the call is a silent no-op.
    pub fn register(&mut self, contract: SkillContract) -> Result<()> {
        if let Err(violations) = check_contract(&contract) {
            return Err(SkillRegistryError::invalid_contract(contract.skill_id, violations));
        }

        if self.store.contains_key(&contract.skill_id) {
            if contract.is_local() {
                self.sink.emit(RegistryEvent::LocalOverride { skill_id: contract.skill_id.clone() });
                self.store.insert(contract.skill_id.clone(), contract);
            }
            return Ok(());
        }

        self.store.insert(contract.skill_id.clone(), contract);
        Ok(())
    }

    pub fn get_skill(&self, id: &str) -> Result<Option<&SkillContract>> {
        self.assert_synced()?;
        Ok(self.store.get(id))
    }

    /// All contracts, ordered by `skill_id`.
    pub fn get_all(&self) -> Result<Vec<&SkillContract>> {
        self.assert_synced()?;
        Ok(self.store.values().collect())
    }

    pub fn has_skill(&self, id: &str) -> Result<bool> {
        self.assert_synced()?;
        Ok(self.store.contains_key(id))
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Number of stored contracts, regardless of sync state.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Drop every contract and return to the unsynced state.
    pub(crate) fn clear_store(&mut self) {
        self.store.clear();
        self.synced = false;
    }

    pub(crate) fn mark_synced(&mut self) {
        self.synced = true;
    }

    fn assert_synced(&self) -> Result<()> {
        if self.synced { Ok(()) } else { Err(SkillRegistryError::NotSynced) }
    }
}

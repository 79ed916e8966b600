//! Merge of global and local contracts with local-first precedence.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{SkillContract, SkillSource};

/// A same-source duplicate that was dropped during resolution (first occurrence kept).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedDuplicate {
    pub skill_id: String,
    pub source: SkillSource,
}

/// Output of [`resolve_skills`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// One contract per `skill_id`.
    pub skills: BTreeMap<String, SkillContract>,

    /// Ids where a local contract replaced a global one.
    pub overrides: BTreeSet<String>,

    /// Same-source duplicates, in the order they were encountered.
    pub duplicates: Vec<DroppedDuplicate>,
}

impl Resolution {
    pub fn is_override(&self, skill_id: &str) -> bool {
        self.overrides.contains(skill_id)
    }
}

/// Merge two ordered contract lists into one mapping keyed by `skill_id`.
///
/// Globals are inserted first-wins. Each local then replaces the stored entry
/// for its id (recorded in `overrides`), unless that entry is itself declared
/// LOCAL, in which case the incoming one is dropped as a duplicate. Pure:
/// duplicates are reported in the result rather than logged here.
pub fn resolve_skills(globals: Vec<SkillContract>, locals: Vec<SkillContract>) -> Resolution {
    let mut resolution = Resolution::default();

    for skill in globals {
        if resolution.skills.contains_key(&skill.skill_id) {
            resolution.duplicates.push(DroppedDuplicate { skill_id: skill.skill_id, source: SkillSource::Global });
            continue;
        }
        resolution.skills.insert(skill.skill_id.clone(), skill);
    }

    for skill in locals {
        match resolution.skills.get(&skill.skill_id) {
            Some(existing) if existing.is_local() => {
                resolution.duplicates.push(DroppedDuplicate { skill_id: skill.skill_id, source: SkillSource::Local });
                continue;
            }
            Some(_) => {
                resolution.overrides.insert(skill.skill_id.clone());
            }
            None => {}
        }
        resolution.skills.insert(skill.skill_id.clone(), skill);
    }

    resolution
}

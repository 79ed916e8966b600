//! Placeholder contracts for skills that were requested but not found.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;

use crate::events::{EventSink, RegistryEvent};
use crate::types::{SandboxType, SkillConstraints, SkillContract, SkillInterface, SkillMetadata, SkillSource};

/// Produces an advisory template for a missing skill id. Implementations must
/// not touch the registry.
pub trait ScaffoldGenerator: Send + Sync {
    fn generate(&self, skill_id: &str) -> SkillContract;
}

/// Emits a conservative template: destructive, human-in-the-loop, Docker
/// sandboxed. Opting out of any of those is left to the developer.
pub struct SkillScaffold {
    local_skills_dir: PathBuf,
    sink: Arc<dyn EventSink>,
}

impl SkillScaffold {
    pub fn new(local_skills_dir: impl Into<PathBuf>, sink: Arc<dyn EventSink>) -> Self {
        Self { local_skills_dir: local_skills_dir.into(), sink }
    }

    /// Where the developer should save the filled-in template.
    pub fn target_path(&self, skill_id: &str) -> PathBuf {
        self.local_skills_dir.join(format!("{skill_id}.json"))
    }
}

impl ScaffoldGenerator for SkillScaffold {
    fn generate(&self, skill_id: &str) -> SkillContract {
        let template = scaffold_template(skill_id);
        let hint = format!(
            "Skill \"{}\" not found in registry. Add it to {} to enable this capability.",
            skill_id,
            self.target_path(skill_id).display()
        );

        self.sink.emit(RegistryEvent::ScaffoldGenerated {
            skill_id: skill_id.to_string(),
            hint,
            template: Box::new(template.clone()),
        });

        template
    }
}

/// The conservative template, without side effects.
pub fn scaffold_template(skill_id: &str) -> SkillContract {
    SkillContract {
        skill_id: skill_id.to_string(),
        metadata: SkillMetadata {
            name: format!("TODO: name for {skill_id}"),
            description: format!("TODO: high-clarity description of what {skill_id} does"),
            source: SkillSource::Local,
        },
        interface: SkillInterface {
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": [],
                "description": "TODO: define input parameters",
            }),
            output_schema: json!({
                "type": "object",
                "properties": {},
                "description": "TODO: define output shape",
            }),
        },
        constraints: SkillConstraints { is_destructive: true, requires_hitl: true, sandbox_type: SandboxType::Docker },
    }
}

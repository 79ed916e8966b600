//! The Unified Skill Contract.
//!
//! Every skill in the registry, whether it came from the globally installed
//! package or from a project-local JSON file, is described by one contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a contract came from. Provenance only: two contracts with the same
/// `skill_id` are the same logical skill regardless of source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkillSource {
    /// Listed by the globally installed skills package
    Global,
    /// Loaded from the project-local skills directory
    Local,
}

impl SkillSource {
    pub const VALUES: &[SkillSource] = &[SkillSource::Global, SkillSource::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillSource::Global => "GLOBAL",
            SkillSource::Local => "LOCAL",
        }
    }

    /// Exact, case-sensitive match against the wire names.
    pub fn parse_str(s: &str) -> Option<Self> {
        Self::VALUES.iter().copied().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for SkillSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Execution sandbox a caller must use for the skill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SandboxType {
    Docker,
    Wasm,
    Local,
}

impl SandboxType {
    pub const VALUES: &[SandboxType] = &[SandboxType::Docker, SandboxType::Wasm, SandboxType::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            SandboxType::Docker => "DOCKER",
            SandboxType::Wasm => "WASM",
            SandboxType::Local => "LOCAL",
        }
    }

    /// Exact, case-sensitive match against the wire names.
    pub fn parse_str(s: &str) -> Option<Self> {
        Self::VALUES.iter().copied().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for SandboxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Human-facing description and provenance of a skill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillMetadata {
    pub name: String,
    pub description: String,
    pub source: SkillSource,
}

/// Input and output schemas. The registry checks presence only and never
/// interprets their shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillInterface {
    pub input_schema: Value,
    pub output_schema: Value,
}

/// Safety and execution policy flags, consumed by callers that run skills.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillConstraints {
    pub is_destructive: bool,
    pub requires_hitl: bool,
    pub sandbox_type: SandboxType,
}

/// A validated skill definition, keyed by `skill_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillContract {
    pub skill_id: String,
    pub metadata: SkillMetadata,
    pub interface: SkillInterface,
    pub constraints: SkillConstraints,
}

impl SkillContract {
    pub fn source(&self) -> SkillSource {
        self.metadata.source
    }

    pub fn is_local(&self) -> bool {
        self.metadata.source == SkillSource::Local
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    /// A well-formed raw entry, as the CLI or a local file would provide it.
    pub fn raw_entry(id: &str, source: &str) -> Value {
        json!({
            "skill_id": id,
            "metadata": {
                "name": format!("{id} skill"),
                "description": format!("Runs {id}"),
                "source": source,
            },
            "interface": {
                "input_schema": { "type": "object", "properties": {} },
                "output_schema": { "type": "object" },
            },
            "constraints": {
                "is_destructive": false,
                "requires_hitl": false,
                "sandbox_type": "WASM",
            },
        })
    }

    pub fn contract(id: &str, source: SkillSource) -> SkillContract {
        SkillContract {
            skill_id: id.to_string(),
            metadata: SkillMetadata {
                name: format!("{id} skill"),
                description: format!("Runs {id} ({source})"),
                source,
            },
            interface: SkillInterface {
                input_schema: json!({ "type": "object" }),
                output_schema: json!({ "type": "object" }),
            },
            constraints: SkillConstraints { is_destructive: false, requires_hitl: false, sandbox_type: SandboxType::Wasm },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skill_source_wire_names() {
        assert_eq!(serde_json::to_value(SkillSource::Global).unwrap(), json!("GLOBAL"));
        assert_eq!(serde_json::to_value(SkillSource::Local).unwrap(), json!("LOCAL"));
        assert_eq!(SkillSource::parse_str("LOCAL"), Some(SkillSource::Local));
        assert_eq!(SkillSource::parse_str("local"), None);
    }

    #[test]
    fn test_sandbox_type_wire_names() {
        for sandbox in SandboxType::VALUES {
            let wire = serde_json::to_value(sandbox).unwrap();
            assert_eq!(wire, json!(sandbox.as_str()));
            assert_eq!(SandboxType::parse_str(sandbox.as_str()), Some(*sandbox));
        }
        assert_eq!(SandboxType::parse_str("docker"), None);
        assert_eq!(SandboxType::Docker.to_string(), "DOCKER");
    }

    #[test]
    fn test_contract_deserializes_from_wire_shape() {
        let raw = fixtures::raw_entry("deploy-to-vercel", "GLOBAL");
        let contract: SkillContract = serde_json::from_value(raw).unwrap();
        assert_eq!(contract.skill_id, "deploy-to-vercel");
        assert_eq!(contract.source(), SkillSource::Global);
        assert!(!contract.is_local());
        assert_eq!(contract.constraints.sandbox_type, SandboxType::Wasm);
    }

    #[test]
    fn test_contract_serializes_field_names() {
        let contract = fixtures::contract("run-tests", SkillSource::Local);
        let value = serde_json::to_value(&contract).unwrap();
        assert_eq!(value["metadata"]["source"], json!("LOCAL"));
        assert_eq!(value["constraints"]["sandbox_type"], json!("WASM"));
        assert!(value["interface"]["input_schema"].is_object());
    }
}

//! Validation of untyped skill entries against the Unified Skill Contract.
//!
//! Every rule runs in one pass so that all problems with an entry surface
//! together. Stored strings are never trimmed or rewritten; whitespace only
//! matters for the non-empty checks.

use serde_json::{Map, Value};

use crate::error::ContractViolation;
use crate::types::{SandboxType, SkillConstraints, SkillContract, SkillInterface, SkillMetadata, SkillSource};

const SKILL_ID_REQUIRED: &str = "skill_id is required and must be a non-empty string";
const METADATA_REQUIRED: &str = "metadata is required";
const NAME_REQUIRED: &str = "metadata.name is required and must be a non-empty string";
const DESCRIPTION_REQUIRED: &str = "metadata.description is required and must be a non-empty string";
const SOURCE_INVALID: &str = "metadata.source must be one of: GLOBAL, LOCAL";
const INTERFACE_REQUIRED: &str = "interface is required";
const INPUT_SCHEMA_REQUIRED: &str = "interface.input_schema is required";
const OUTPUT_SCHEMA_REQUIRED: &str = "interface.output_schema is required";
const CONSTRAINTS_REQUIRED: &str = "constraints is required";
const IS_DESTRUCTIVE_REQUIRED: &str = "constraints.is_destructive is required and must be a boolean";
const REQUIRES_HITL_REQUIRED: &str = "constraints.requires_hitl is required and must be a boolean";
const SANDBOX_TYPE_INVALID: &str = "constraints.sandbox_type must be one of: DOCKER, WASM, LOCAL";

/// Validate an untyped entry, returning the typed contract or every violation found.
pub fn validate_skill_contract(raw: &Value) -> Result<SkillContract, Vec<ContractViolation>> {
    let mut violations = Vec::new();
    let root = raw.as_object();

    let skill_id = non_empty_string(field(root, "skill_id"), "skill_id", SKILL_ID_REQUIRED, &mut violations);

    let metadata = match field(root, "metadata").and_then(Value::as_object) {
        Some(meta) => {
            let name = non_empty_string(meta.get("name"), "metadata.name", NAME_REQUIRED, &mut violations);
            let description = non_empty_string(
                meta.get("description"),
                "metadata.description",
                DESCRIPTION_REQUIRED,
                &mut violations,
            );
            let source = enum_value(meta.get("source"), SkillSource::parse_str, "metadata.source", SOURCE_INVALID, &mut violations);
            match (name, description, source) {
                (Some(name), Some(description), Some(source)) => Some(SkillMetadata { name, description, source }),
                _ => None,
            }
        }
        None => {
            violations.push(ContractViolation::new("metadata", METADATA_REQUIRED));
            None
        }
    };

    let interface = match field(root, "interface").and_then(Value::as_object) {
        Some(iface) => {
            let input_schema =
                present(iface.get("input_schema"), "interface.input_schema", INPUT_SCHEMA_REQUIRED, &mut violations);
            let output_schema =
                present(iface.get("output_schema"), "interface.output_schema", OUTPUT_SCHEMA_REQUIRED, &mut violations);
            match (input_schema, output_schema) {
                (Some(input_schema), Some(output_schema)) => Some(SkillInterface { input_schema, output_schema }),
                _ => None,
            }
        }
        None => {
            violations.push(ContractViolation::new("interface", INTERFACE_REQUIRED));
            None
        }
    };

    let constraints = match field(root, "constraints").and_then(Value::as_object) {
        Some(cons) => {
            let is_destructive = strict_bool(
                cons.get("is_destructive"),
                "constraints.is_destructive",
                IS_DESTRUCTIVE_REQUIRED,
                &mut violations,
            );
            let requires_hitl = strict_bool(
                cons.get("requires_hitl"),
                "constraints.requires_hitl",
                REQUIRES_HITL_REQUIRED,
                &mut violations,
            );
            let sandbox_type = enum_value(
                cons.get("sandbox_type"),
                SandboxType::parse_str,
                "constraints.sandbox_type",
                SANDBOX_TYPE_INVALID,
                &mut violations,
            );
            match (is_destructive, requires_hitl, sandbox_type) {
                (Some(is_destructive), Some(requires_hitl), Some(sandbox_type)) => {
                    Some(SkillConstraints { is_destructive, requires_hitl, sandbox_type })
                }
                _ => None,
            }
        }
        None => {
            violations.push(ContractViolation::new("constraints", CONSTRAINTS_REQUIRED));
            None
        }
    };

    match (skill_id, metadata, interface, constraints) {
        (Some(skill_id), Some(metadata), Some(interface), Some(constraints)) if violations.is_empty() => {
            Ok(SkillContract { skill_id, metadata, interface, constraints })
        }
        _ => Err(violations),
    }
}

/// Re-check an already typed contract. Enum membership and boolean types are
/// guaranteed by the type system; the string and schema-presence rules are not.
pub fn check_contract(contract: &SkillContract) -> Result<(), Vec<ContractViolation>> {
    let mut violations = Vec::new();

    if is_blank(&contract.skill_id) {
        violations.push(ContractViolation::new("skill_id", SKILL_ID_REQUIRED));
    }
    if is_blank(&contract.metadata.name) {
        violations.push(ContractViolation::new("metadata.name", NAME_REQUIRED));
    }
    if is_blank(&contract.metadata.description) {
        violations.push(ContractViolation::new("metadata.description", DESCRIPTION_REQUIRED));
    }
    if contract.interface.input_schema.is_null() {
        violations.push(ContractViolation::new("interface.input_schema", INPUT_SCHEMA_REQUIRED));
    }
    if contract.interface.output_schema.is_null() {
        violations.push(ContractViolation::new("interface.output_schema", OUTPUT_SCHEMA_REQUIRED));
    }

    if violations.is_empty() { Ok(()) } else { Err(violations) }
}

fn field<'a>(root: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    root.and_then(|map| map.get(key))
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn non_empty_string(
    value: Option<&Value>, field: &'static str, message: &str, violations: &mut Vec<ContractViolation>,
) -> Option<String> {
    match value.and_then(Value::as_str) {
        Some(s) if !is_blank(s) => Some(s.to_string()),
        _ => {
            violations.push(ContractViolation::new(field, message));
            None
        }
    }
}

fn present(
    value: Option<&Value>, field: &'static str, message: &str, violations: &mut Vec<ContractViolation>,
) -> Option<Value> {
    match value {
        Some(v) if !v.is_null() => Some(v.clone()),
        _ => {
            violations.push(ContractViolation::new(field, message));
            None
        }
    }
}

fn strict_bool(
    value: Option<&Value>, field: &'static str, message: &str, violations: &mut Vec<ContractViolation>,
) -> Option<bool> {
    let parsed = value.and_then(Value::as_bool);
    if parsed.is_none() {
        violations.push(ContractViolation::new(field, message));
    }
    parsed
}

fn enum_value<T>(
    value: Option<&Value>, parse: fn(&str) -> Option<T>, field: &'static str, message: &str,
    violations: &mut Vec<ContractViolation>,
) -> Option<T> {
    let parsed = value.and_then(Value::as_str).and_then(parse);
    if parsed.is_none() {
        violations.push(ContractViolation::new(field, message));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures;
    use serde_json::json;

    fn messages(violations: &[ContractViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.message.as_str()).collect()
    }

    fn fields(raw: &Value) -> Vec<&'static str> {
        validate_skill_contract(raw)
            .unwrap_err()
            .iter()
            .map(|v| v.field)
            .collect()
    }

    #[test]
    fn test_valid_entry() {
        let raw = fixtures::raw_entry("deploy-to-vercel", "GLOBAL");
        let contract = validate_skill_contract(&raw).unwrap();
        assert_eq!(contract.skill_id, "deploy-to-vercel");
        assert_eq!(contract.metadata.source, SkillSource::Global);
        assert_eq!(contract.constraints.sandbox_type, SandboxType::Wasm);
        assert_eq!(contract.interface.input_schema, raw["interface"]["input_schema"]);
    }

    #[test]
    fn test_strings_are_not_trimmed() {
        let mut raw = fixtures::raw_entry("padded", "LOCAL");
        raw["metadata"]["name"] = json!("  Padded Name  ");
        let contract = validate_skill_contract(&raw).unwrap();
        assert_eq!(contract.metadata.name, "  Padded Name  ");
    }

    #[test]
    fn test_whitespace_skill_id_rejected() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw["skill_id"] = json!("   ");
        assert_eq!(fields(&raw), vec!["skill_id"]);
    }

    #[test]
    fn test_non_string_skill_id_rejected() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw["skill_id"] = json!(42);
        let violations = validate_skill_contract(&raw).unwrap_err();
        assert_eq!(messages(&violations), vec![SKILL_ID_REQUIRED]);
        assert!(violations.iter().all(|v| v.code() == crate::ErrorCode::InvalidContract));
    }

    #[test]
    fn test_missing_metadata() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw.as_object_mut().unwrap().remove("metadata");
        assert_eq!(fields(&raw), vec!["metadata"]);
    }

    #[test]
    fn test_metadata_array_is_not_an_object() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw["metadata"] = json!(["name", "description"]);
        assert_eq!(fields(&raw), vec!["metadata"]);
    }

    #[test]
    fn test_blank_name_and_description() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw["metadata"]["name"] = json!("");
        raw["metadata"]["description"] = json!(" \t ");
        assert_eq!(fields(&raw), vec!["metadata.name", "metadata.description"]);
    }

    #[test]
    fn test_source_must_match_exactly() {
        for bad in [json!("global"), json!("REMOTE"), json!(null), json!(1)] {
            let mut raw = fixtures::raw_entry("x", "GLOBAL");
            raw["metadata"]["source"] = bad;
            let violations = validate_skill_contract(&raw).unwrap_err();
            assert_eq!(messages(&violations), vec![SOURCE_INVALID]);
        }
    }

    #[test]
    fn test_null_schema_counts_as_missing() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw["interface"]["input_schema"] = Value::Null;
        raw["interface"].as_object_mut().unwrap().remove("output_schema");
        assert_eq!(fields(&raw), vec!["interface.input_schema", "interface.output_schema"]);
    }

    #[test]
    fn test_schema_shape_is_not_interpreted() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw["interface"]["input_schema"] = json!("anything goes");
        raw["interface"]["output_schema"] = json!(false);
        assert!(validate_skill_contract(&raw).is_ok());
    }

    #[test]
    fn test_booleans_are_not_coerced() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw["constraints"]["is_destructive"] = json!("true");
        raw["constraints"]["requires_hitl"] = json!(1);
        assert_eq!(fields(&raw), vec!["constraints.is_destructive", "constraints.requires_hitl"]);
    }

    #[test]
    fn test_sandbox_type_enum() {
        let mut raw = fixtures::raw_entry("x", "GLOBAL");
        raw["constraints"]["sandbox_type"] = json!("VM");
        let violations = validate_skill_contract(&raw).unwrap_err();
        assert_eq!(messages(&violations), vec![SANDBOX_TYPE_INVALID]);
    }

    #[test]
    fn test_all_errors_surface_together() {
        let raw = json!({
            "skill_id": "",
            "metadata": { "name": 3, "source": "BOTH" },
            "interface": {},
            "constraints": { "is_destructive": "no", "sandbox_type": "docker" },
        });
        let fields = fields(&raw);
        assert_eq!(
            fields,
            vec![
                "skill_id",
                "metadata.name",
                "metadata.description",
                "metadata.source",
                "interface.input_schema",
                "interface.output_schema",
                "constraints.is_destructive",
                "constraints.requires_hitl",
                "constraints.sandbox_type",
            ]
        );
    }

    #[test]
    fn test_non_object_entry_reports_every_section() {
        for raw in [json!(null), json!("deploy"), json!([1, 2, 3])] {
            assert_eq!(fields(&raw), vec!["skill_id", "metadata", "interface", "constraints"]);
        }
    }

    #[test]
    fn test_check_contract_accepts_fixture() {
        let contract = fixtures::contract("run-tests", SkillSource::Local);
        assert!(check_contract(&contract).is_ok());
    }

    #[test]
    fn test_check_contract_rejects_blank_strings_and_null_schemas() {
        let mut contract = fixtures::contract("run-tests", SkillSource::Global);
        contract.skill_id = " ".to_string();
        contract.metadata.description = String::new();
        contract.interface.output_schema = Value::Null;

        let violations = check_contract(&contract).unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["skill_id", "metadata.description", "interface.output_schema"]);
    }
}

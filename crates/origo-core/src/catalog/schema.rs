//! JSON Schema validation for rule documents.
//!
//! Rule documents arrive from an external ETL pipeline; they are validated
//! against the embedded schema before deserialization so a malformed rule is
//! a load-time error, not an evaluation-time surprise.

use std::sync::OnceLock;

use super::CatalogError;

/// Embedded rule schema (loaded at compile time).
const RULE_SCHEMA_JSON: &str = include_str!("../../schema/rule.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, CatalogError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = match serde_json::from_str(RULE_SCHEMA_JSON) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(CatalogError::Unavailable(e.clone())),
    }
}

/// Validate one rule document against the embedded schema.
///
/// Returns all violations, not just the first, so ETL operators can fix a
/// document in one pass.
pub fn validate_rule_document(rule_json: &serde_json::Value) -> Result<(), CatalogError> {
    let validator = get_validator()?;

    let errors: Vec<String> = validator
        .iter_errors(rule_json)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::SchemaViolation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rule_document_accepted() {
        let rule = serde_json::json!({
            "id": "CETA-3901-1",
            "hs_code": "390110",
            "trade_agreement": "CETA",
            "rule_text": "CTH or RVC 40%",
            "priority": 1,
            "conditions": {
                "alternatives": [
                    { "type": "heading_change", "change": "CTH" },
                    { "type": "value_rule", "method": "RVC", "threshold": 40 }
                ]
            }
        });
        assert!(validate_rule_document(&rule).is_ok());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let rule = serde_json::json!({
            "id": "CETA-3901-1",
            "hs_code": "390110",
            "trade_agreement": "CETA"
        });
        let err = validate_rule_document(&rule).unwrap_err();
        assert!(matches!(err, CatalogError::SchemaViolation(_)));
    }

    #[test]
    fn test_non_numeric_hs_code_rejected() {
        let rule = serde_json::json!({
            "id": "X",
            "hs_code": "39A110",
            "trade_agreement": "CETA",
            "rule_text": "CTH"
        });
        assert!(validate_rule_document(&rule).is_err());
    }

    #[test]
    fn test_value_rule_requires_threshold() {
        let rule = serde_json::json!({
            "id": "X",
            "hs_code": "390110",
            "trade_agreement": "CETA",
            "rule_text": "RVC",
            "conditions": {
                "alternatives": [ { "type": "value_rule", "method": "RVC" } ]
            }
        });
        assert!(validate_rule_document(&rule).is_err());
    }
}

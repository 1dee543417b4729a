//! JSON Schema validator implementation.

use crate::json_schema::{SchemaValidationError, SchemaValidationResult, SchemaValidator};
use jsonschema::Validator;
use serde_json::Value;

/// JSON Schema validator implementation.
///
/// Uses the `jsonschema` crate; the draft is detected from `$schema` and
/// defaults to 2020-12.
pub struct JsonSchemaValidator;

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonSchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, schema: &Value, data: &Value) -> SchemaValidationResult<()> {
        let validator = Validator::new(schema).map_err(|e| SchemaValidationError {
            message: format!("Invalid JSON Schema: {}", e),
        })?;

        let errors: Vec<String> = validator
            .iter_errors(data)
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();

        if !errors.is_empty() {
            return Err(SchemaValidationError {
                message: errors.join("; "),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_schema::parse_schema;
    use serde_json::json;

    fn counter_schema() -> Value {
        json!({
            "type": "object",
            "properties": {"counterID": {"type": "integer"}},
            "additionalProperties": false,
            "required": ["counterID"]
        })
    }

    #[test]
    fn test_empty_schema_allows_any_object() {
        let validator = JsonSchemaValidator::new();
        let data = json!({"counterID": 1, "anything": "else"});

        assert!(validator.validate(&json!({}), &data).is_ok());
    }

    #[test]
    fn test_valid_data_passes_schema() {
        let validator = JsonSchemaValidator::new();

        assert!(validator
            .validate(&counter_schema(), &json!({"counterID": 131}))
            .is_ok());
    }

    #[test]
    fn test_unknown_property_fails_closed_schema() {
        let validator = JsonSchemaValidator::new();

        let result = validator.validate(&counter_schema(), &json!({"counternumber": 131}));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let validator = JsonSchemaValidator::new();

        let result = validator.validate(&counter_schema(), &json!({}));
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("required"));
    }

    #[test]
    fn test_wrong_type_fails() {
        let validator = JsonSchemaValidator::new();

        let result = validator.validate(&counter_schema(), &json!({"counterID": "131"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_schema_type_fails() {
        let validator = JsonSchemaValidator::new();
        let schema = json!({"type": "not_a_valid_type"});

        let result = validator.validate(&schema, &json!({"counterID": 1}));
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("Invalid JSON Schema"));
    }

    #[test]
    fn test_parse_schema_rejects_invalid_json() {
        let result = parse_schema("not valid json");
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("Invalid schema JSON"));
    }
}

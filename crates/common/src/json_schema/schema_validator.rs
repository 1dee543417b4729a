//! Schema validator trait for JSON Schema validation.

use serde_json::Value;

/// Result type for schema validation operations.
pub type SchemaValidationResult<T> = Result<T, SchemaValidationError>;

/// Error type for schema validation failures.
#[derive(Debug, Clone)]
pub struct SchemaValidationError {
    /// The validation error message(s)
    pub message: String,
}

impl std::fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SchemaValidationError {}

/// Parse a stored schema document.
pub fn parse_schema(schema_str: &str) -> SchemaValidationResult<Value> {
    serde_json::from_str(schema_str).map_err(|e| SchemaValidationError {
        message: format!("Invalid schema JSON: {}", e),
    })
}

/// Validates JSON data against a JSON Schema document.
///
/// Covers the structural keywords the component schemas rely on: `type`,
/// `required` and `additionalProperties`. An empty schema `{}` accepts anything.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SchemaValidator: Send + Sync {
    /// Validate data against a JSON Schema.
    ///
    /// # Returns
    /// * `Ok(())` if validation passes
    /// * `Err(SchemaValidationError)` if the schema does not compile or the data violates it
    fn validate(&self, schema: &Value, data: &Value) -> SchemaValidationResult<()>;
}

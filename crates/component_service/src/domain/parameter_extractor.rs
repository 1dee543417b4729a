use common::{Column, DomainError, DomainResult, QueryParam, QueryParams};
use serde_json::Value;

/// Payload fields mapped to filter columns, in the order they are emitted
const COMMON_FIELDS: [(&str, Column); 4] = [
    ("componentID", Column::Id),
    ("typeName", Column::TypeName),
    ("branchID", Column::QueueBranchId),
    ("description", Column::Description),
];

/// Localized names travel as a group keyed on the first one
const NAME_FIELDS: [(&str, Column); 4] = [
    ("name_L1", Column::NameL1),
    ("name_L2", Column::NameL2),
    ("name_L3", Column::NameL3),
    ("name_L4", Column::NameL4),
];

/// Turns a request payload into typed query parameters
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ParameterExtractor: Send + Sync {
    /// Emit one parameter per present common field.
    ///
    /// A null payload is an error, not an empty filter.
    fn get_common_parameters(&self, payload: &Value) -> DomainResult<QueryParams>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommonParameterExtractor;

impl CommonParameterExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ParameterExtractor for CommonParameterExtractor {
    fn get_common_parameters(&self, payload: &Value) -> DomainResult<QueryParams> {
        if payload.is_null() {
            return Err(DomainError::MissingPayload);
        }

        let mut params = Vec::new();
        for (field, column) in COMMON_FIELDS {
            if let Some(value) = present(payload, field) {
                params.push(QueryParam::from_json(column, value)?);
            }
        }

        if present(payload, NAME_FIELDS[0].0).is_some() {
            for (field, column) in NAME_FIELDS {
                let value = payload.get(field).unwrap_or(&Value::Null);
                params.push(QueryParam::from_json(column, value)?);
            }
        }

        Ok(params)
    }
}

/// The payload field when it holds a truthy value
pub fn present<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    payload.get(field).filter(|value| is_truthy(value))
}

/// Null, empty strings, zero and `false` count as absent
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ParamValue;
    use serde_json::json;

    fn columns(params: &[QueryParam]) -> Vec<Column> {
        params.iter().map(|p| p.column).collect()
    }

    #[test]
    fn test_null_payload_is_an_error() {
        let result = CommonParameterExtractor::new().get_common_parameters(&Value::Null);
        assert!(matches!(result, Err(DomainError::MissingPayload)));
    }

    #[test]
    fn test_empty_payload_yields_no_parameters() {
        let params = CommonParameterExtractor::new()
            .get_common_parameters(&json!({}))
            .unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_fields_are_emitted_in_fixed_order() {
        let params = CommonParameterExtractor::new()
            .get_common_parameters(&json!({
                "description": "lobby",
                "branchID": 115,
                "typeName": "CounterLCD",
                "componentID": "7",
            }))
            .unwrap();

        assert_eq!(
            columns(&params),
            vec![
                Column::Id,
                Column::TypeName,
                Column::QueueBranchId,
                Column::Description
            ]
        );
        assert_eq!(params[0].value, ParamValue::BigInt(Some(7)));
        assert_eq!(params[2].value, ParamValue::BigInt(Some(115)));
    }

    #[test]
    fn test_falsy_fields_are_skipped() {
        let params = CommonParameterExtractor::new()
            .get_common_parameters(&json!({
                "componentID": 0,
                "typeName": "",
                "branchID": null,
                "description": false,
            }))
            .unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_names_are_all_or_nothing() {
        let extractor = CommonParameterExtractor::new();

        let params = extractor
            .get_common_parameters(&json!({"name_L1": "first", "name_L3": "third"}))
            .unwrap();
        assert_eq!(
            columns(&params),
            vec![Column::NameL1, Column::NameL2, Column::NameL3, Column::NameL4]
        );
        assert_eq!(params[1].value, ParamValue::Text(None));
        assert_eq!(params[2].value, ParamValue::Text(Some("third".to_string())));

        let params = extractor
            .get_common_parameters(&json!({"name_L2": "second"}))
            .unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_integral_float_id_is_accepted() {
        let params = CommonParameterExtractor::new()
            .get_common_parameters(&json!({"componentID": 5.0, "branchID": 115.0}))
            .unwrap();
        assert_eq!(columns(&params), vec![Column::Id, Column::QueueBranchId]);
        assert_eq!(params[0].value, ParamValue::BigInt(Some(5)));
        assert_eq!(params[1].value, ParamValue::BigInt(Some(115)));

        let result =
            CommonParameterExtractor::new().get_common_parameters(&json!({"componentID": 5.5}));
        assert!(matches!(result, Err(DomainError::InvalidParameter(_, _))));
    }

    #[test]
    fn test_non_numeric_id_is_rejected() {
        let result =
            CommonParameterExtractor::new().get_common_parameters(&json!({"componentID": "abc"}));
        assert!(matches!(result, Err(DomainError::InvalidParameter(_, _))));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
    }
}

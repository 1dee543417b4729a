use crate::domain::present;
use common::{DomainError, DomainResult, Envelope, ResponsePayload, ResultCode};
use serde_json::Value;
use tracing::error;

/// The command token: the topic with `"<module>/"` stripped, or the whole topic
pub(crate) fn command_token<'a>(topic: &'a str, module: &str) -> &'a str {
    topic
        .strip_prefix(module)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(topic)
}

/// Write an operation's outcome into the envelope and reduce it to a result code.
///
/// Errors replace the payload with a bare `Failed` response after being logged.
pub(crate) fn complete(
    module: &str,
    envelope: &mut Envelope,
    outcome: DomainResult<ResponsePayload>,
) -> ResultCode {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            error!(module = %module, topic = %envelope.topic_name, error = %e, "request failed");
            ResponsePayload::failed()
        }
    };

    let result = response.result;
    envelope.set_response(response);
    result
}

/// The payload's `data` field as a JSON value plus the text to store.
///
/// A string is parsed as JSON and stored verbatim; anything else is serialized.
pub(crate) fn property_data(payload: &Value) -> DomainResult<(Value, String)> {
    let data =
        present(payload, "data").ok_or_else(|| DomainError::MissingField("data".to_string()))?;

    match data {
        Value::String(text) => {
            let parsed = serde_json::from_str(text)
                .map_err(|e| DomainError::InvalidJson("data".to_string(), e.to_string()))?;
            Ok((parsed, text.clone()))
        }
        other => Ok((other.clone(), other.to_string())),
    }
}

/// The payload's `typeName`, required to pick the validating schema
pub(crate) fn required_type_name(payload: &Value) -> DomainResult<&str> {
    present(payload, "typeName")
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::MissingField("typeName".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_token_strips_module() {
        assert_eq!(
            command_token("ComponentService/Manager/GetComponents", "ComponentService/Manager"),
            "GetComponents"
        );
        assert_eq!(
            command_token("ComponentService/Registration", "ComponentService/Manager"),
            "ComponentService/Registration"
        );
        assert_eq!(
            command_token("ComponentService/ManagerX/Get", "ComponentService/Manager"),
            "ComponentService/ManagerX/Get"
        );
    }

    #[test]
    fn test_complete_replaces_payload() {
        let mut envelope = Envelope::new("test", "ComponentService/Manager/GetComponents", json!({}));

        let result = complete(
            "ComponentService/Manager",
            &mut envelope,
            Ok(ResponsePayload::success(Some("[]".to_string()))),
        );
        assert_eq!(result, ResultCode::Success);
        assert_eq!(envelope.payload, json!({"result": 0, "data": "[]"}));

        let result = complete(
            "ComponentService/Manager",
            &mut envelope,
            Err(DomainError::MissingPayload),
        );
        assert_eq!(result, ResultCode::Failed);
        assert_eq!(envelope.payload, json!({"result": -1}));
    }

    #[test]
    fn test_property_data_accepts_string_or_object() {
        let (value, text) = property_data(&json!({"data": "{\"counterID\":131}"})).unwrap();
        assert_eq!(value, json!({"counterID": 131}));
        assert_eq!(text, "{\"counterID\":131}");

        let (value, text) = property_data(&json!({"data": {"counterID": 131}})).unwrap();
        assert_eq!(value, json!({"counterID": 131}));
        assert_eq!(text, r#"{"counterID":131}"#);
    }

    #[test]
    fn test_property_data_rejects_missing_or_broken_data() {
        assert!(matches!(
            property_data(&json!({"typeName": "CounterLCD"})),
            Err(DomainError::MissingField(f)) if f == "data"
        ));
        assert!(matches!(
            property_data(&json!({"data": "{broken"})),
            Err(DomainError::InvalidJson(_, _))
        ));
    }

    #[test]
    fn test_required_type_name() {
        assert_eq!(
            required_type_name(&json!({"typeName": "CounterLCD"})).unwrap(),
            "CounterLCD"
        );
        assert!(required_type_name(&json!({"typeName": ""})).is_err());
        assert!(required_type_name(&json!({"typeName": 4})).is_err());
    }
}

use common::{
    Column, ComponentTypeRepository, DomainError, DomainResult, PropertyKind, QueryParam,
    SchemaValidator, parse_schema,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Structural contract every registration payload must satisfy
const REGISTRATION_SCHEMA: &str = include_str!("../../resources/component-schema.json");

/// Two-stage validation of component payloads.
///
/// Registration payloads are checked against the bundled registration schema.
/// Configuration and reported data are checked against the schema stored on
/// the component's type, fetched per call.
pub struct ComponentSchemaService {
    component_types: Arc<dyn ComponentTypeRepository>,
    validator: Arc<dyn SchemaValidator>,
    registration_schema: Value,
}

impl ComponentSchemaService {
    pub fn new(
        component_types: Arc<dyn ComponentTypeRepository>,
        validator: Arc<dyn SchemaValidator>,
    ) -> DomainResult<Self> {
        let registration_schema = parse_schema(REGISTRATION_SCHEMA).map_err(|e| {
            DomainError::InvalidJson("component-schema.json".to_string(), e.to_string())
        })?;

        Ok(Self {
            component_types,
            validator,
            registration_schema,
        })
    }

    /// Validate `object` against the schema registered for `type_name`.
    ///
    /// An unknown type, an unreadable registry or an unparsable stored schema all
    /// count as invalid.
    #[instrument(skip(self, object), fields(type_name = %type_name, kind = ?kind))]
    pub async fn validate(&self, object: &Value, type_name: &str, kind: PropertyKind) -> bool {
        let component_type = match self
            .component_types
            .get(vec![QueryParam::text(Column::TypeName, type_name)])
            .await
        {
            Ok(Some(component_type)) => component_type,
            Ok(None) => {
                warn!(type_name = %type_name, "no component type registered");
                return false;
            }
            Err(e) => {
                warn!(type_name = %type_name, error = %e, "failed to load component type");
                return false;
            }
        };

        match parse_schema(component_type.schema_for(kind)) {
            Ok(schema) => self.is_valid(object, &schema),
            Err(e) => {
                warn!(type_name = %type_name, error = %e, "stored schema is not valid JSON");
                false
            }
        }
    }

    /// Evaluate `object` against `schema`; compile and evaluation errors are `false`
    pub fn is_valid(&self, object: &Value, schema: &Value) -> bool {
        match self.validator.validate(schema, object) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "schema validation failed");
                false
            }
        }
    }

    pub fn is_valid_registration(&self, object: &Value) -> bool {
        self.is_valid(object, &self.registration_schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        ComponentType, JsonSchemaValidator, MockComponentTypeRepository, MockSchemaValidator,
        SchemaValidationError,
    };
    use serde_json::json;

    const COUNTER_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {"counterID": {"type": "integer"}},
        "required": ["counterID"],
        "additionalProperties": false
    }"#;

    fn counter_type() -> ComponentType {
        ComponentType {
            id: 1,
            type_name: "CounterLCD".to_string(),
            caption_key: "counter_lcd".to_string(),
            configuration_schema: COUNTER_SCHEMA.to_string(),
            reported_data_schema: "{}".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn service_with(repository: MockComponentTypeRepository) -> ComponentSchemaService {
        ComponentSchemaService::new(Arc::new(repository), Arc::new(JsonSchemaValidator::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_configuration_checked_against_registered_type() {
        let mut repository = MockComponentTypeRepository::new();
        repository
            .expect_get()
            .withf(|params| params == &vec![QueryParam::text(Column::TypeName, "CounterLCD")])
            .times(2)
            .returning(|_| Ok(Some(counter_type())));
        let service = service_with(repository);

        assert!(
            service
                .validate(
                    &json!({"counterID": 131}),
                    "CounterLCD",
                    PropertyKind::Configuration
                )
                .await
        );
        assert!(
            !service
                .validate(
                    &json!({"counternumber": 131}),
                    "CounterLCD",
                    PropertyKind::Configuration
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_reported_data_uses_its_own_schema() {
        let mut repository = MockComponentTypeRepository::new();
        repository
            .expect_get()
            .returning(|_| Ok(Some(counter_type())));
        let service = service_with(repository);

        assert!(
            service
                .validate(
                    &json!({"anything": true}),
                    "CounterLCD",
                    PropertyKind::ReportedData
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_unknown_type_is_invalid() {
        let mut repository = MockComponentTypeRepository::new();
        repository.expect_get().returning(|_| Ok(None));
        let service = service_with(repository);

        assert!(
            !service
                .validate(&json!({"counterID": 1}), "Nope", PropertyKind::Configuration)
                .await
        );
    }

    #[tokio::test]
    async fn test_repository_failure_is_invalid() {
        let mut repository = MockComponentTypeRepository::new();
        repository
            .expect_get()
            .returning(|_| Err(DomainError::Timeout("select".to_string())));
        let service = service_with(repository);

        assert!(
            !service
                .validate(
                    &json!({"counterID": 1}),
                    "CounterLCD",
                    PropertyKind::Configuration
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_unparsable_stored_schema_is_invalid() {
        let mut repository = MockComponentTypeRepository::new();
        repository.expect_get().returning(|_| {
            Ok(Some(ComponentType {
                configuration_schema: "{not json".to_string(),
                ..counter_type()
            }))
        });
        let service = service_with(repository);

        assert!(
            !service
                .validate(
                    &json!({"counterID": 1}),
                    "CounterLCD",
                    PropertyKind::Configuration
                )
                .await
        );
    }

    #[test]
    fn test_validator_errors_never_escape() {
        let mut validator = MockSchemaValidator::new();
        validator.expect_validate().returning(|_, _| {
            Err(SchemaValidationError {
                message: "Invalid JSON Schema".to_string(),
            })
        });
        let service = ComponentSchemaService::new(
            Arc::new(MockComponentTypeRepository::new()),
            Arc::new(validator),
        )
        .unwrap();

        assert!(!service.is_valid(&json!({}), &json!({"type": 12})));
    }

    #[test]
    fn test_registration_schema() {
        let service = service_with(MockComponentTypeRepository::new());

        let valid = json!({
            "orgID": 1,
            "typeName": "CounterLCD",
            "name_L1": "x",
            "name_L2": "x",
            "queueBranch_ID": 115,
            "identity": "id1",
            "address": "addr1",
        });
        assert!(service.is_valid_registration(&valid));

        let mut with_related = valid.clone();
        with_related["relatedClassName"] = json!("Counter");
        with_related["relatedObject_ID"] = json!(4);
        assert!(service.is_valid_registration(&with_related));

        let mut missing_address = valid.clone();
        missing_address.as_object_mut().unwrap().remove("address");
        assert!(!service.is_valid_registration(&missing_address));

        let mut extra = valid.clone();
        extra["color"] = json!("red");
        assert!(!service.is_valid_registration(&extra));

        let mut wrong_type = valid;
        wrong_type["orgID"] = json!("one");
        assert!(!service.is_valid_registration(&wrong_type));
    }
}

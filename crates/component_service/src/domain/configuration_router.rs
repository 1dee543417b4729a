use crate::domain::routing::{command_token, complete, property_data, required_type_name};
use crate::domain::{
    BroadcastBus, BroadcastTopic, CONFIGURATION_MODULE, ComponentSchemaService,
    ConfigurationCommand, ParameterExtractor,
};
use common::{
    Column, ComponentRepository, DomainResult, Envelope, PropertyKind, QueryParam,
    ResponsePayload, ResultCode,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads and writes a component's configuration blob
pub struct ConfigurationRouter {
    components: Arc<dyn ComponentRepository>,
    schemas: Arc<ComponentSchemaService>,
    extractor: Arc<dyn ParameterExtractor>,
    bus: BroadcastBus,
}

impl ConfigurationRouter {
    pub fn new(
        components: Arc<dyn ComponentRepository>,
        schemas: Arc<ComponentSchemaService>,
        extractor: Arc<dyn ParameterExtractor>,
        bus: BroadcastBus,
    ) -> Self {
        Self {
            components,
            schemas,
            extractor,
            bus,
        }
    }

    pub async fn process_message_request(&self, envelope: &mut Envelope) -> ResultCode {
        let command = match command_token(&envelope.topic_name, CONFIGURATION_MODULE)
            .parse::<ConfigurationCommand>()
        {
            Ok(command) => command,
            Err(e) => {
                warn!(topic = %envelope.topic_name, error = %e, "unrecognized configuration command");
                return ResultCode::Failed;
            }
        };
        debug!(command = ?command, "handling configuration command");

        let outcome = match command {
            ConfigurationCommand::SetConfig => self.set_config(&envelope.payload).await,
            ConfigurationCommand::GetConfig => self.get_config(&envelope.payload).await,
        };

        complete(CONFIGURATION_MODULE, envelope, outcome)
    }

    /// Validate `data` against the type's configuration schema, store it and
    /// announce the change
    pub async fn set_config(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let mut params = self.extractor.get_common_parameters(payload)?;
        let (data, text) = property_data(payload)?;
        let type_name = required_type_name(payload)?;

        if !self
            .schemas
            .validate(&data, type_name, PropertyKind::Configuration)
            .await
        {
            warn!(type_name = %type_name, "configuration rejected by schema");
            return Ok(ResponsePayload::failed());
        }

        params.push(QueryParam::text(Column::Configuration, text));
        let result = self.components.update_config(params).await?;

        if result.is_success() {
            self.bus.publish(
                BroadcastTopic::ConfigurationChanged,
                CONFIGURATION_MODULE,
                payload.clone(),
            );
        }

        Ok(ResponsePayload::from_result(result))
    }

    pub async fn get_config(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let params = self.extractor.get_common_parameters(payload)?;
        let data = self
            .components
            .get_column(params, Column::Configuration)
            .await?;
        Ok(ResponsePayload::from_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommonParameterExtractor;
    use common::{
        ComponentType, JsonSchemaValidator, MockComponentRepository, MockComponentTypeRepository,
        ParamValue,
    };
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    fn counter_types() -> MockComponentTypeRepository {
        let mut component_types = MockComponentTypeRepository::new();
        component_types.expect_get().returning(|_| {
            Ok(Some(ComponentType {
                id: 1,
                type_name: "CounterLCD".to_string(),
                caption_key: "counter_lcd".to_string(),
                configuration_schema: r#"{"type":"object","properties":{"counterID":{"type":"integer"}},"required":["counterID"],"additionalProperties":false}"#.to_string(),
                reported_data_schema: "{}".to_string(),
                created_at: None,
                updated_at: None,
            }))
        });
        component_types
    }

    fn router(components: MockComponentRepository) -> ConfigurationRouter {
        let schemas = ComponentSchemaService::new(
            Arc::new(counter_types()),
            Arc::new(JsonSchemaValidator::new()),
        )
        .unwrap();

        ConfigurationRouter::new(
            Arc::new(components),
            Arc::new(schemas),
            Arc::new(CommonParameterExtractor::new()),
            BroadcastBus::new(8),
        )
    }

    fn envelope(command: &str, payload: Value) -> Envelope {
        Envelope::new(
            "test",
            format!("ComponentService/Configuration/{}", command),
            payload,
        )
    }

    #[tokio::test]
    async fn test_set_config_stores_and_broadcasts() {
        let mut components = MockComponentRepository::new();
        components
            .expect_update_config()
            .withf(|params| {
                params
                    == &vec![
                        QueryParam::bigint(Column::Id, 5),
                        QueryParam::text(Column::TypeName, "CounterLCD"),
                        QueryParam::text(Column::Configuration, r#"{"counterID":131}"#),
                    ]
            })
            .times(1)
            .returning(|_| Ok(ResultCode::Success));
        let router = router(components);
        let mut receiver = router.bus.subscribe();

        let payload = json!({
            "componentID": 5,
            "typeName": "CounterLCD",
            "data": r#"{"counterID":131}"#,
        });
        let mut request = envelope("SetConfig", payload.clone());

        assert_eq!(
            router.process_message_request(&mut request).await,
            ResultCode::Success
        );
        assert_eq!(request.payload, json!({"result": 0}));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.topic, BroadcastTopic::ConfigurationChanged);
        assert_eq!(event.envelope.payload, payload);
        assert_eq!(event.envelope.source, "CS/ComponentService/Configuration");
    }

    #[tokio::test]
    async fn test_set_config_without_data_skips_write() {
        let mut components = MockComponentRepository::new();
        components.expect_update_config().never();
        let router = router(components);

        let mut request = envelope(
            "SetConfig",
            json!({"componentID": 5, "typeName": "CounterLCD"}),
        );
        assert_eq!(
            router.process_message_request(&mut request).await,
            ResultCode::Failed
        );
        assert_eq!(request.payload, json!({"result": -1}));
    }

    #[tokio::test]
    async fn test_set_config_schema_violation_skips_write() {
        let mut components = MockComponentRepository::new();
        components.expect_update_config().never();
        let router = router(components);
        let mut receiver = router.bus.subscribe();

        let mut request = envelope(
            "SetConfig",
            json!({"componentID": 5, "typeName": "CounterLCD", "data": {"counternumber": 131}}),
        );
        assert_eq!(
            router.process_message_request(&mut request).await,
            ResultCode::Failed
        );
        assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_broadcast() {
        let mut components = MockComponentRepository::new();
        components
            .expect_update_config()
            .times(1)
            .returning(|_| Ok(ResultCode::Failed));
        let router = router(components);
        let mut receiver = router.bus.subscribe();

        let mut request = envelope(
            "SetConfig",
            json!({"componentID": 5, "typeName": "CounterLCD", "data": {"counterID": 1}}),
        );
        assert_eq!(
            router.process_message_request(&mut request).await,
            ResultCode::Failed
        );
        assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_get_config_reads_configuration_column() {
        let mut components = MockComponentRepository::new();
        components
            .expect_get_column()
            .withf(|params, column| {
                *column == Column::Configuration
                    && params.len() == 1
                    && params[0].value == ParamValue::BigInt(Some(5))
            })
            .times(1)
            .returning(|_, _| Ok(Some(r#"[{"configuration":"{}"}]"#.to_string())));
        let router = router(components);

        let mut request = envelope("GetConfig", json!({"componentID": 5}));
        assert_eq!(
            router.process_message_request(&mut request).await,
            ResultCode::Success
        );
        assert_eq!(request.payload["data"], r#"[{"configuration":"{}"}]"#);
    }

    #[tokio::test]
    async fn test_unknown_command_fails() {
        let router = router(MockComponentRepository::new());

        let mut request = envelope("SetReport", json!({"componentID": 5}));
        assert_eq!(
            router.process_message_request(&mut request).await,
            ResultCode::Failed
        );
        assert_eq!(request.payload, json!({"componentID": 5}));
    }
}

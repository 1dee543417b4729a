use crate::domain::routing::complete;
use crate::domain::{ComponentSchemaService, REGISTRATION_MODULE, present};
use common::{
    Component, ComponentRepository, DomainError, DomainResult, Envelope, ResponsePayload,
    ResultCode, deserialize_integral, deserialize_optional_integral,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registration record as carried in the request's `data` field
#[derive(Debug, Deserialize)]
struct ComponentRegistration {
    #[serde(rename = "orgID", deserialize_with = "deserialize_integral")]
    org_id: i64,
    #[serde(rename = "typeName")]
    type_name: String,
    #[serde(rename = "name_L1")]
    name_l1: String,
    #[serde(rename = "name_L2")]
    name_l2: String,
    #[serde(rename = "name_L3")]
    name_l3: Option<String>,
    #[serde(rename = "name_L4")]
    name_l4: Option<String>,
    #[serde(rename = "queueBranch_ID", deserialize_with = "deserialize_integral")]
    queue_branch_id: i64,
    identity: String,
    address: String,
    #[serde(rename = "relatedClassName")]
    related_class_name: Option<String>,
    #[serde(
        rename = "relatedObject_ID",
        default,
        deserialize_with = "deserialize_optional_integral"
    )]
    related_object_id: Option<i64>,
}

impl From<ComponentRegistration> for Component {
    fn from(registration: ComponentRegistration) -> Self {
        let mut component = Component {
            org_id: registration.org_id,
            type_name: registration.type_name,
            name_l1: registration.name_l1,
            name_l2: registration.name_l2,
            name_l3: registration.name_l3.unwrap_or_default(),
            name_l4: registration.name_l4.unwrap_or_default(),
            queue_branch_id: registration.queue_branch_id,
            identity: registration.identity,
            address: registration.address,
            ..Default::default()
        };

        // The back-reference only counts when the class is named
        if let Some(class_name) = registration.related_class_name.filter(|c| !c.is_empty()) {
            component.related_class_name = class_name;
            component.related_object_id = registration.related_object_id.unwrap_or(-1);
        }

        component
    }
}

/// Creates new components from registration requests
pub struct RegistrationRouter {
    components: Arc<dyn ComponentRepository>,
    schemas: Arc<ComponentSchemaService>,
}

impl RegistrationRouter {
    pub fn new(components: Arc<dyn ComponentRepository>, schemas: Arc<ComponentSchemaService>) -> Self {
        Self { components, schemas }
    }

    pub async fn register_component(&self, envelope: &mut Envelope) -> ResultCode {
        let outcome = self.add_component(&envelope.payload).await;
        complete(REGISTRATION_MODULE, envelope, outcome)
    }

    /// Check `data` against the registration schema and persist it
    pub async fn add_component(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let data =
            present(payload, "data").ok_or_else(|| DomainError::MissingField("data".to_string()))?;
        let record = match data {
            Value::String(text) => serde_json::from_str(text)
                .map_err(|e| DomainError::InvalidJson("data".to_string(), e.to_string()))?,
            other => other.clone(),
        };

        if !self.schemas.is_valid_registration(&record) {
            warn!("registration rejected by schema");
            return Ok(ResponsePayload::failed());
        }

        let registration: ComponentRegistration = serde_json::from_value(record)?;
        debug!(type_name = %registration.type_name, identity = %registration.identity, "registering component");

        let result = self.components.create(registration.into()).await?;
        Ok(ResponsePayload::from_result(result))
    }
}

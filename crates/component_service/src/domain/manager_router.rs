use crate::domain::routing::{command_token, complete};
use crate::domain::{
    BroadcastBus, BroadcastTopic, MANAGER_MODULE, ManagerCommand, ParameterExtractor, present,
};
use common::{
    Column, ComponentRepository, ComponentTypeRepository, DomainError, DomainResult, Envelope,
    QueryParam, ResponsePayload, ResultCode,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Component and component type lookups, updates, deletes and command fan-out
pub struct ManagerRouter {
    components: Arc<dyn ComponentRepository>,
    component_types: Arc<dyn ComponentTypeRepository>,
    extractor: Arc<dyn ParameterExtractor>,
    bus: BroadcastBus,
}

impl ManagerRouter {
    pub fn new(
        components: Arc<dyn ComponentRepository>,
        component_types: Arc<dyn ComponentTypeRepository>,
        extractor: Arc<dyn ParameterExtractor>,
        bus: BroadcastBus,
    ) -> Self {
        Self {
            components,
            component_types,
            extractor,
            bus,
        }
    }

    pub async fn process_message_request(&self, envelope: &mut Envelope) -> ResultCode {
        let command = match command_token(&envelope.topic_name, MANAGER_MODULE)
            .parse::<ManagerCommand>()
        {
            Ok(command) => command,
            Err(e) => {
                warn!(topic = %envelope.topic_name, error = %e, "unrecognized manager command");
                return ResultCode::Failed;
            }
        };
        debug!(command = ?command, "handling manager command");

        let payload = &envelope.payload;
        let outcome = match command {
            ManagerCommand::GetComponents => self.get_components().await,
            ManagerCommand::GetComponent => self.get_component(payload).await,
            ManagerCommand::GetComponentsTypes => self.get_all_component_types().await,
            ManagerCommand::GetComponentType => self.get_component_type(payload).await,
            ManagerCommand::UpdateComponent => self.update_component(payload).await,
            ManagerCommand::DeleteComponents => self.delete_component(payload).await,
            ManagerCommand::ExecuteCommand => self.execute_command(payload),
        };

        complete(MANAGER_MODULE, envelope, outcome)
    }

    pub async fn get_components(&self) -> DomainResult<ResponsePayload> {
        let data = self.components.get_all().await?;
        Ok(ResponsePayload::from_data(data))
    }

    pub async fn get_component(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let params = self.extractor.get_common_parameters(payload)?;
        let data = self.components.get(params).await?;
        Ok(ResponsePayload::from_data(data))
    }

    pub async fn get_all_component_types(&self) -> DomainResult<ResponsePayload> {
        let data = self.component_types.get_all().await?;
        Ok(ResponsePayload::from_data(data))
    }

    /// The matched type serialized as a JSON string
    pub async fn get_component_type(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let params = self.extractor.get_common_parameters(payload)?;
        let data = match self.component_types.get(params).await? {
            Some(component_type) => Some(serde_json::to_string(&component_type)?),
            None => None,
        };
        Ok(ResponsePayload::from_data(data))
    }

    pub async fn update_component(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let params = self.extractor.get_common_parameters(payload)?;
        let result = self.components.update(params).await?;
        Ok(ResponsePayload::from_result(result))
    }

    /// Delete by `componentID`, a single id or a comma-separated list
    pub async fn delete_component(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let ids = present(payload, "componentID")
            .ok_or_else(|| DomainError::MissingField("componentID".to_string()))?;
        let params = vec![QueryParam::from_json(Column::Ids, ids)?];

        let result = self.components.delete(params).await?;
        Ok(ResponsePayload::from_result(result))
    }

    /// Fan the request payload out on the execute-command topic
    pub fn execute_command(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let delivered = self
            .bus
            .publish(BroadcastTopic::ExecuteCommand, MANAGER_MODULE, payload.clone());

        if delivered {
            Ok(ResponsePayload::success(None))
        } else {
            warn!("execute command had no listeners");
            Ok(ResponsePayload::failed())
        }
    }
}

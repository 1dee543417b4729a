use crate::domain::routing::{command_token, complete, property_data, required_type_name};
use crate::domain::{
    BroadcastBus, BroadcastTopic, REPORT_MODULE, ComponentSchemaService,
    ReportCommand, ParameterExtractor,
};
use common::{
    Column, ComponentRepository, DomainResult, Envelope, PropertyKind, QueryParam,
    ResponsePayload, ResultCode,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads and writes the data a component reports about itself
pub struct ReportRouter {
    components: Arc<dyn ComponentRepository>,
    schemas: Arc<ComponentSchemaService>,
    extractor: Arc<dyn ParameterExtractor>,
    bus: BroadcastBus,
}

impl ReportRouter {
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
        let command = match command_token(&envelope.topic_name, REPORT_MODULE)
            .parse::<ReportCommand>()
        {
            Ok(command) => command,
            Err(e) => {
                warn!(topic = %envelope.topic_name, error = %e, "unrecognized report command");
                return ResultCode::Failed;
            }
        };
        debug!(command = ?command, "handling report command");

        let outcome = match command {
            ReportCommand::SetReport => self.set_report(&envelope.payload).await,
            ReportCommand::GetReport => self.get_report(&envelope.payload).await,
        };

        complete(REPORT_MODULE, envelope, outcome)
    }

    /// Same flow as configuration, checked against the reported-data schema
    pub async fn set_report(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let mut params = self.extractor.get_common_parameters(payload)?;
        let (data, text) = property_data(payload)?;
        let type_name = required_type_name(payload)?;

        if !self
            .schemas
            .validate(&data, type_name, PropertyKind::ReportedData)
            .await
        {
            warn!(type_name = %type_name, "reported data rejected by schema");
            return Ok(ResponsePayload::failed());
        }

        params.push(QueryParam::text(Column::ReportedData, text));
        let result = self.components.update_report(params).await?;

        if result.is_success() {
            self.bus.publish(
                BroadcastTopic::ReportChanged,
                REPORT_MODULE,
                payload.clone(),
            );
        }

        Ok(ResponsePayload::from_result(result))
    }

    pub async fn get_report(&self, payload: &Value) -> DomainResult<ResponsePayload> {
        let params = self.extractor.get_common_parameters(payload)?;
        let data = self
            .components
            .get_column(params, Column::ReportedData)
            .await?;
        Ok(ResponsePayload::from_data(data))
    }
}

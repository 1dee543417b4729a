use crate::domain::{
    BroadcastBus, CommonParameterExtractor, ComponentSchemaService, ConfigurationRouter, Domain,
    ManagerRouter, RegistrationRouter, ReportRouter, is_truthy,
};
use bytes::Bytes;
use common::{
    ComponentRepository, ComponentTypeRepository, DomainError, DomainResult, Envelope,
    JsonSchemaValidator, MessageBroker, ResultCode,
};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

pub struct EntryRouterConfig {
    /// Subject that forwarded broadcasts are published on
    pub broadcast_subject: String,
    /// Service answering cross-entity lookups
    pub forward_module: String,
    /// Prepended to the entity named by a lookup target
    pub forward_topic_prefix: String,
    pub forward_timeout: Duration,
}

/// Single ingress for inbound envelopes and egress for forwarded requests and broadcasts
pub struct EntryRouter {
    registration: RegistrationRouter,
    manager: ManagerRouter,
    configuration: ConfigurationRouter,
    report: ReportRouter,
    broker: Arc<dyn MessageBroker>,
    config: EntryRouterConfig,
    source_id: OnceLock<String>,
}

impl EntryRouter {
    pub fn new(
        registration: RegistrationRouter,
        manager: ManagerRouter,
        configuration: ConfigurationRouter,
        report: ReportRouter,
        broker: Arc<dyn MessageBroker>,
        config: EntryRouterConfig,
    ) -> Self {
        Self {
            registration,
            manager,
            configuration,
            report,
            broker,
            config,
            source_id: OnceLock::new(),
        }
    }

    /// Wire the four command routers over shared repositories and the broadcast bus
    pub fn build(
        components: Arc<dyn ComponentRepository>,
        component_types: Arc<dyn ComponentTypeRepository>,
        broker: Arc<dyn MessageBroker>,
        bus: BroadcastBus,
        config: EntryRouterConfig,
    ) -> DomainResult<Self> {
        let extractor = Arc::new(CommonParameterExtractor::new());
        let schemas = Arc::new(ComponentSchemaService::new(
            Arc::clone(&component_types),
            Arc::new(JsonSchemaValidator::new()),
        )?);

        Ok(Self::new(
            RegistrationRouter::new(Arc::clone(&components), Arc::clone(&schemas)),
            ManagerRouter::new(
                Arc::clone(&components),
                component_types,
                extractor.clone(),
                bus.clone(),
            ),
            ConfigurationRouter::new(
                Arc::clone(&components),
                Arc::clone(&schemas),
                extractor.clone(),
                bus.clone(),
            ),
            ReportRouter::new(components, schemas, extractor, bus),
            broker,
            config,
        ))
    }

    /// Dispatch on the topic's domain segment.
    ///
    /// The request is answered in place: handlers replace its payload with the
    /// response. An unknown domain leaves the payload untouched.
    #[instrument(skip(self, request), fields(topic = %request.topic_name, message_id = %request.message_id))]
    pub async fn process_request(&self, request: &mut Envelope) -> ResultCode {
        let domain = match request
            .topic_segment(1)
            .ok_or_else(|| DomainError::UnknownDomain(request.topic_name.clone()))
            .and_then(str::parse::<Domain>)
        {
            Ok(domain) => domain,
            Err(e) => {
                warn!(error = %e, "unroutable request");
                return ResultCode::Failed;
            }
        };
        debug!(domain = ?domain, "routing request");

        match domain {
            Domain::Registration => self.registration.register_component(request).await,
            Domain::Manager => self.manager.process_message_request(request).await,
            Domain::Configuration => self.configuration.process_message_request(request).await,
            Domain::Report => self.report.process_message_request(request).await,
            Domain::Data => self.load_entities(request).await,
        }
    }

    pub fn broadcast_subject(&self) -> &str {
        &self.config.broadcast_subject
    }

    /// Publish `envelope` on `subject`
    pub async fn broadcast_message(&self, subject: &str, envelope: &Envelope) -> ResultCode {
        let body = match envelope.to_bytes() {
            Ok(body) => body,
            Err(e) => {
                error!(topic = %envelope.topic_name, error = %e, "failed to serialize broadcast");
                return ResultCode::Failed;
            }
        };

        match self.broker.publish(subject.to_string(), Bytes::from(body)).await {
            Ok(()) => ResultCode::Success,
            Err(e) => {
                error!(subject = %subject, topic = %envelope.topic_name, error = %e, "broadcast failed");
                ResultCode::Failed
            }
        }
    }

    /// Send `payload` to `module_name` in a fresh envelope and return the raw reply
    pub async fn send_to_module(
        &self,
        payload: Value,
        topic: &str,
        module_name: &str,
    ) -> DomainResult<Bytes> {
        let envelope = Envelope::new(self.get_source_id(), topic, payload);
        let body = Bytes::from(envelope.to_bytes()?);

        debug!(module = %module_name, topic = %topic, message_id = %envelope.message_id, "sending to module");
        match tokio::time::timeout(
            self.config.forward_timeout,
            self.broker.request(module_name.to_string(), body),
        )
        .await
        {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => Err(DomainError::BrokerError(format!("{:#}", e))),
            Err(_) => Err(DomainError::Timeout(format!("request to {}", module_name))),
        }
    }

    /// Resolve `payload.target` to a module topic, forward the request and lift
    /// the reply's payload into the request
    pub async fn load_entities(&self, request: &mut Envelope) -> ResultCode {
        match self.fetch_entities(&request.payload).await {
            Ok(payload) => {
                request.payload = payload;
                ResultCode::Success
            }
            Err(e) => {
                error!(topic = %request.topic_name, error = %e, "entity lookup failed");
                ResultCode::Failed
            }
        }
    }

    async fn fetch_entities(&self, payload: &Value) -> DomainResult<Value> {
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::MissingField("target".to_string()))?;
        let topic = self
            .get_module_name(target)
            .ok_or_else(|| DomainError::MalformedTarget(target.to_string()))?;

        let module = &self.config.forward_module;
        let reply = self.send_to_module(payload.clone(), &topic, module).await?;
        let reply = Envelope::from_slice(&reply)
            .map_err(|e| DomainError::InvalidReply(module.clone(), e.to_string()))?;

        if !is_truthy(&reply.payload) {
            return Err(DomainError::InvalidReply(
                module.clone(),
                "reply carried no payload".to_string(),
            ));
        }

        Ok(reply.payload)
    }

    /// `"Entity.Operation"` becomes the prefixed entity topic; anything without
    /// a dot or an entity name is malformed
    pub fn get_module_name(&self, target: &str) -> Option<String> {
        let (entity, _) = target.split_once('.')?;
        if entity.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.config.forward_topic_prefix, entity))
    }

    /// Process-lifetime originator id, generated on first use
    pub fn get_source_id(&self) -> &str {
        self.source_id.get_or_init(|| xid::new().to_string())
    }
}

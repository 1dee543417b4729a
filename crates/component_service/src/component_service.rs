use crate::domain::{BroadcastBus, EntryRouter, EntryRouterConfig};
use crate::nats::{BroadcastForwarder, ComponentRequestService};
use common::{
    ComponentRepository, ComponentTypeRepository, MessageBroker, NatsConsumeLoggingLayer,
    NatsConsumeLoggingService, NatsConsumeTracingLayer, NatsConsumeTracingService,
    RequestConsumer,
};
use component_runner::{AppProcess, BoxedResultFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tracing::info;

type RequestStack = NatsConsumeTracingService<NatsConsumeLoggingService<ComponentRequestService>>;

pub struct ComponentServiceConfig {
    pub request_subject: String,
    pub queue_group: Option<String>,
    pub broadcast_subject: String,
    pub forward_module: String,
    pub forward_topic_prefix: String,
    pub forward_timeout: Duration,
    pub broadcast_capacity: usize,
}

pub struct ComponentService {
    consumer: RequestConsumer<RequestStack>,
    forwarder: BroadcastForwarder,
}

impl ComponentService {
    pub async fn new(
        component_repository: Arc<dyn ComponentRepository>,
        component_type_repository: Arc<dyn ComponentTypeRepository>,
        broker: Arc<dyn MessageBroker>,
        config: ComponentServiceConfig,
    ) -> anyhow::Result<Self> {
        info!("Initializing component service module");

        let bus = BroadcastBus::new(config.broadcast_capacity);
        // Subscribe before any request can publish
        let receiver = bus.subscribe();

        let router = Arc::new(EntryRouter::build(
            component_repository,
            component_type_repository,
            Arc::clone(&broker),
            bus,
            EntryRouterConfig {
                broadcast_subject: config.broadcast_subject,
                forward_module: config.forward_module,
                forward_topic_prefix: config.forward_topic_prefix,
                forward_timeout: config.forward_timeout,
            },
        )?);

        let forwarder = BroadcastForwarder::new(Arc::clone(&router), receiver);

        let service = ServiceBuilder::new()
            .layer(NatsConsumeTracingLayer::new())
            .layer(NatsConsumeLoggingLayer::new())
            .service(ComponentRequestService::new(router));

        let consumer = RequestConsumer::new(
            broker,
            &config.request_subject,
            config.queue_group,
            service,
        )
        .await?;

        info!(subject = %config.request_subject, "Component service initialized");

        Ok(Self {
            consumer,
            forwarder,
        })
    }

    /// The forwarder ignores the runner's token and stops once the consumer has
    /// drained its in-flight requests.
    pub fn into_runner_processes(self) -> Vec<(String, AppProcess)> {
        let consumer = self.consumer;
        let forwarder = self.forwarder;
        let forwarder_stop = CancellationToken::new();
        let consumer_done = forwarder_stop.clone();

        let consumer_process: AppProcess =
            Box::new(move |ctx: CancellationToken| -> BoxedResultFuture {
                Box::pin(async move {
                    // Cancels on every exit path, panics included
                    let _stop_forwarder = consumer_done.drop_guard();
                    consumer.run(ctx).await
                })
            });
        let forwarder_process: AppProcess =
            Box::new(move |_ctx: CancellationToken| -> BoxedResultFuture {
                Box::pin(async move { forwarder.run(forwarder_stop).await })
            });

        vec![
            ("component_request_consumer".to_string(), consumer_process),
            ("component_broadcast_forwarder".to_string(), forwarder_process),
        ]
    }
}

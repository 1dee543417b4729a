use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::nats::trace_context::extract_trace_context;
use crate::nats::{ConsumeRequest, ConsumeResponse};
use tower::{Layer, Service};
use tracing::{Instrument, info_span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Tower layer opening a span per inbound request, parented to the publisher's trace
#[derive(Clone, Default)]
pub struct NatsConsumeTracingLayer;

impl NatsConsumeTracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for NatsConsumeTracingLayer {
    type Service = NatsConsumeTracingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        NatsConsumeTracingService { inner: service }
    }
}

/// Service that wraps request handling in a `nats_consume` span
#[derive(Clone)]
pub struct NatsConsumeTracingService<S> {
    inner: S,
}

impl<S> Service<ConsumeRequest> for NatsConsumeTracingService<S>
where
    S: Service<ConsumeRequest, Response = ConsumeResponse> + Clone + Send + 'static,
    S::Error: std::fmt::Display + Send,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: ConsumeRequest) -> Self::Future {
        let span = info_span!(
            target: "nats",
            "nats_consume",
            otel.name = %format!("{} receive", req.subject),
            messaging.system = "nats",
            messaging.operation = "receive",
            messaging.destination.name = %req.subject,
            messaging.message.body.size = req.payload.len(),
        );

        if let Some(headers) = &req.headers {
            span.set_parent(extract_trace_context(headers));
        }

        let mut inner = self.inner.clone();

        Box::pin(async move { inner.call(req).await }.instrument(span))
    }
}

use crate::domain::EntryRouter;
use common::{ConsumeRequest, ConsumeResponse, Envelope};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::{debug, error, warn};

/// Tower service answering one inbound envelope through the entry router.
///
/// The reply is the request envelope with its payload replaced by the
/// response. Bodies that are not envelopes are dropped unanswered.
#[derive(Clone)]
pub struct ComponentRequestService {
    router: Arc<EntryRouter>,
}

impl ComponentRequestService {
    pub fn new(router: Arc<EntryRouter>) -> Self {
        Self { router }
    }
}

impl Service<ConsumeRequest> for ComponentRequestService {
    type Response = ConsumeResponse;
    type Error = anyhow::Error;
    type Future = BoxFuture<'static, Result<ConsumeResponse, anyhow::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ConsumeRequest) -> Self::Future {
        let router = Arc::clone(&self.router);

        Box::pin(async move {
            let mut envelope = match Envelope::from_slice(&req.payload) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(subject = %req.subject, error = %e, "failed to parse request envelope");
                    return Ok(ConsumeResponse::dropped(format!("Parse error: {}", e)));
                }
            };

            let result = router.process_request(&mut envelope).await;
            debug!(
                topic = %envelope.topic_name,
                message_id = %envelope.message_id,
                result = ?result,
                "request processed"
            );

            match envelope.to_bytes() {
                Ok(body) => Ok(ConsumeResponse::reply(body)),
                Err(e) => {
                    error!(topic = %envelope.topic_name, error = %e, "failed to serialize reply");
                    Err(e.into())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BroadcastBus, EntryRouterConfig};
    use bytes::Bytes;
    use common::{MockComponentRepository, MockComponentTypeRepository, MockMessageBroker};
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    fn service(components: MockComponentRepository) -> ComponentRequestService {
        let router = EntryRouter::build(
            Arc::new(components),
            Arc::new(MockComponentTypeRepository::new()),
            Arc::new(MockMessageBroker::new()),
            BroadcastBus::new(8),
            EntryRouterConfig {
                broadcast_subject: "ComponentService.broadcast".to_string(),
                forward_module: "CVMServer".to_string(),
                forward_topic_prefix: "CVMServer/".to_string(),
                forward_timeout: Duration::from_secs(1),
            },
        )
        .unwrap();
        ComponentRequestService::new(Arc::new(router))
    }

    fn request(body: Vec<u8>) -> ConsumeRequest {
        ConsumeRequest::new(
            "ComponentService".to_string(),
            Bytes::from(body),
            None,
            Some("_INBOX.reply".to_string()),
        )
    }

    #[tokio::test]
    async fn test_replies_with_mutated_envelope() {
        let mut components = MockComponentRepository::new();
        components
            .expect_get_all()
            .returning(|| Ok(Some(r#"[{"id":1}]"#.to_string())));

        let envelope = Envelope::new("caller", "ComponentService/Manager/GetComponents", json!({}));
        let response = service(components)
            .oneshot(request(envelope.to_bytes().unwrap()))
            .await
            .unwrap();

        let ConsumeResponse::Reply(body) = response else {
            panic!("expected a reply");
        };
        let reply = Envelope::from_slice(&body).unwrap();
        assert_eq!(reply.message_id, envelope.message_id);
        assert_eq!(reply.topic_name, envelope.topic_name);
        assert_eq!(reply.payload, json!({"result": 0, "data": r#"[{"id":1}]"#}));
    }

    #[tokio::test]
    async fn test_unroutable_request_is_echoed() {
        let envelope = Envelope::new("caller", "ComponentService/Unknown/Thing", json!({"a": 1}));
        let response = service(MockComponentRepository::new())
            .oneshot(request(envelope.to_bytes().unwrap()))
            .await
            .unwrap();

        let ConsumeResponse::Reply(body) = response else {
            panic!("expected a reply");
        };
        assert_eq!(Envelope::from_slice(&body).unwrap().payload, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_garbage_body_is_dropped() {
        let response = service(MockComponentRepository::new())
            .oneshot(request(b"not json".to_vec()))
            .await
            .unwrap();

        assert!(response.is_dropped());
    }
}

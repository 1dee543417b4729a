use async_nats::HeaderMap;
use bytes::Bytes;

/// Request type for consuming a single NATS message through Tower.
///
/// This owns all the message data, allowing it to be passed through
/// Tower middleware layers without lifetime concerns.
#[derive(Debug, Clone)]
pub struct ConsumeRequest {
    /// The NATS subject the message was published to
    pub subject: String,
    /// The message payload
    pub payload: Bytes,
    /// Optional headers (used for trace context propagation)
    pub headers: Option<HeaderMap>,
    /// Reply subject when the publisher expects an answer
    pub reply: Option<String>,
}

impl ConsumeRequest {
    pub fn new(
        subject: String,
        payload: Bytes,
        headers: Option<HeaderMap>,
        reply: Option<String>,
    ) -> Self {
        Self {
            subject,
            payload,
            headers,
            reply,
        }
    }
}

/// Response type for message consumption.
#[derive(Debug, Clone)]
pub enum ConsumeResponse {
    /// Message was handled; the body goes back on the reply subject if there is one
    Reply(Bytes),
    /// Message was dropped without an answer
    Dropped(Option<String>),
}

impl ConsumeResponse {
    pub fn reply(body: impl Into<Bytes>) -> Self {
        Self::Reply(body.into())
    }

    pub fn dropped(reason: impl Into<String>) -> Self {
        Self::Dropped(Some(reason.into()))
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply(_))
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

use serde::{Deserialize, Serialize};

/// Prefix prepended to every originator id in `Envelope::source`
pub const SOURCE_PREFIX: &str = "CS/";

/// Two-valued outcome returned by every public operation of the service.
///
/// Serialized as the bare integer (`0` / `-1`) so replies stay wire compatible
/// with the other platform services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum ResultCode {
    Success,
    Failed,
}

impl ResultCode {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Map an affected-row count reported by a stored procedure
    pub fn from_affected_rows(rows: i64) -> Self {
        if rows > 0 { Self::Success } else { Self::Failed }
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::Success => 0,
            ResultCode::Failed => -1,
        }
    }
}

impl TryFrom<i32> for ResultCode {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            -1 => Ok(Self::Failed),
            other => Err(format!("unknown result code {}", other)),
        }
    }
}

/// Payload that replaces the request payload once a handler completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub result: ResultCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ResponsePayload {
    pub fn success(data: Option<String>) -> Self {
        Self {
            result: ResultCode::Success,
            data,
        }
    }

    pub fn failed() -> Self {
        Self {
            result: ResultCode::Failed,
            data: None,
        }
    }

    /// Response for a read: `Success` with the data, or `Failed` when nothing was found
    pub fn from_data(data: Option<String>) -> Self {
        match data {
            Some(data) => Self::success(Some(data)),
            None => Self::failed(),
        }
    }

    pub fn from_result(result: ResultCode) -> Self {
        Self { result, data: None }
    }

    pub fn into_value(self) -> serde_json::Value {
        // Both fields are plain data; serialization cannot fail
        serde_json::to_value(&self).unwrap_or(serde_json::Value::Null)
    }
}

/// Message wrapper exchanged over the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Creation time in epoch milliseconds
    #[serde(default)]
    pub time: i64,
    #[serde(rename = "messageID", default)]
    pub message_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(
        rename = "correlationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correlation_id: Option<String>,
    #[serde(rename = "topicName", default)]
    pub topic_name: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Build a fresh envelope stamped with the current time and a new message id
    pub fn new(source_id: &str, topic_name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            time: chrono::Utc::now().timestamp_millis(),
            message_id: xid::new().to_string(),
            source: format!("{}{}", SOURCE_PREFIX, source_id),
            correlation_id: None,
            topic_name: topic_name.into(),
            payload,
        }
    }

    /// The `/`-delimited segment of the topic at `index`
    pub fn topic_segment(&self, index: usize) -> Option<&str> {
        self.topic_name.split('/').nth(index)
    }

    pub fn set_response(&mut self, response: ResponsePayload) {
        self.payload = response.into_value();
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

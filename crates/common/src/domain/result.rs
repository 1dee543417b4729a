use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Request payload is missing")]
    MissingPayload,

    #[error("Required field is missing: {0}")]
    MissingField(String),

    #[error("Invalid JSON in field {0}: {1}")]
    InvalidJson(String, String),

    #[error("Invalid value for parameter {0}: {1}")]
    InvalidParameter(String, String),

    #[error("Query condition requires at least one parameter")]
    MissingCondition,

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed forwarding target: {0}")]
    MalformedTarget(String),

    #[error("Invalid reply from {0}: {1}")]
    InvalidReply(String, String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Broker error: {0}")]
    BrokerError(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Subject inbound request envelopes arrive on
    #[serde(default = "default_nats_request_subject")]
    pub nats_request_subject: String,

    /// Queue group shared by service replicas; empty disables it
    #[serde(default = "default_nats_queue_group")]
    pub nats_queue_group: String,

    /// Subject change notifications and commands are published on
    #[serde(default = "default_broadcast_subject")]
    pub broadcast_subject: String,

    /// Service answering cross-entity lookups
    #[serde(default = "default_forward_module")]
    pub forward_module: String,

    #[serde(default = "default_forward_topic_prefix")]
    pub forward_topic_prefix: String,

    /// Reply deadline for forwarded lookups in milliseconds
    #[serde(default = "default_forward_timeout_ms")]
    pub forward_timeout_ms: u64,

    /// Capacity of the in-process broadcast channel
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// Startup timeout for initialization operations in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    // PostgreSQL configuration
    /// PostgreSQL host
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    /// PostgreSQL port
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    /// PostgreSQL database name
    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    /// PostgreSQL username
    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    /// PostgreSQL password
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    #[serde(default = "default_postgres_max_pool_size")]
    pub postgres_max_pool_size: usize,

    /// Deadline for every database call in milliseconds
    #[serde(default = "default_postgres_query_timeout_ms")]
    pub postgres_query_timeout_ms: u64,

    // OpenTelemetry configuration
    #[serde(default = "default_otel_enabled")]
    pub otel_enabled: bool,

    /// OTLP gRPC endpoint
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_nats_request_subject() -> String {
    "ComponentService".to_string()
}

fn default_nats_queue_group() -> String {
    "component-service".to_string()
}

fn default_broadcast_subject() -> String {
    "ComponentService.broadcast".to_string()
}

fn default_forward_module() -> String {
    "CVMServer".to_string()
}

fn default_forward_topic_prefix() -> String {
    "CVMServer/".to_string()
}

fn default_forward_timeout_ms() -> u64 {
    5_000
}

fn default_broadcast_capacity() -> usize {
    256
}

fn default_startup_timeout_secs() -> u64 {
    30
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "components".to_string()
}

fn default_postgres_username() -> String {
    "components".to_string()
}

fn default_postgres_password() -> String {
    "components".to_string()
}

fn default_postgres_max_pool_size() -> usize {
    10
}

fn default_postgres_query_timeout_ms() -> u64 {
    5_000
}

fn default_otel_enabled() -> bool {
    false
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "component-service".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("COMPONENT_SERVICE"))
            .build()?
            .try_deserialize()
    }

    pub fn queue_group(&self) -> Option<String> {
        let group = self.nats_queue_group.trim();
        (!group.is_empty()).then(|| group.to_string())
    }
}

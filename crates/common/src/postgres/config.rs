use serde::{Deserialize, Serialize};

/// PostgreSQL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_pool_size: usize,
    /// Upper bound on a single call, including pool checkout
    pub query_timeout_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "components".to_string(),
            username: "components".to_string(),
            password: "components".to_string(),
            max_pool_size: 10,
            query_timeout_ms: 5000,
        }
    }
}

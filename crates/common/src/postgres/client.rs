use crate::domain::{DomainError, DomainResult};
use crate::postgres::PostgresConfig;
use anyhow::Result;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use std::future::Future;
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::{debug, warn};

/// PostgreSQL client wrapper with connection pooling
#[derive(Clone)]
pub struct PostgresClient {
    pool: Pool,
    query_timeout: Duration,
}

impl PostgresClient {
    /// Creates a new PostgreSQL client with connection pooling
    pub fn new(config: &PostgresConfig) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.database.clone());
        cfg.user = Some(config.username.clone());
        cfg.password = Some(config.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        cfg.pool = Some(PoolConfig::new(config.max_pool_size));

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        Ok(Self {
            pool,
            query_timeout: Duration::from_millis(config.query_timeout_ms),
        })
    }

    /// Pings the database to verify connectivity
    pub async fn ping(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.execute("SELECT 1", &[]).await?;
        debug!("postgreSQL connection successful");
        Ok(())
    }

    /// Gets a connection from the pool; it returns to the pool when dropped
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }

    /// Run a database call under the configured query timeout
    pub async fn bounded<T, F>(&self, operation: &str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.query_timeout.as_millis() as u64,
                    "database call timed out"
                );
                Err(DomainError::Timeout(operation.to_string()))
            }
        }
    }
}

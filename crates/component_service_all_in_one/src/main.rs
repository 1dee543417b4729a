mod config;

use common::{
    NatsClient, PostgresClient, PostgresComponentRepository, PostgresComponentTypeRepository,
    PostgresConfig, TelemetryConfig, TelemetryProviders, init_telemetry, shutdown_telemetry,
};
use component_runner::Runner;
use component_service::{ComponentService, ComponentServiceConfig};
use crate::config::ServiceConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    }) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        otel_endpoint = %config.otel_endpoint,
        "Starting component service"
    );
    debug!("Configuration: {:?}", config);

    let (postgres_client, nats_client) = match initialize_shared_dependencies(&config).await {
        Ok(deps) => deps,
        Err(e) => {
            error!("Failed to initialize shared dependencies: {:#}", e);
            shutdown_telemetry(telemetry_providers);
            std::process::exit(1);
        }
    };

    let component_service = match ComponentService::new(
        Arc::new(PostgresComponentRepository::new(postgres_client.clone())),
        Arc::new(PostgresComponentTypeRepository::new(postgres_client)),
        nats_client.create_broker(),
        ComponentServiceConfig {
            request_subject: config.nats_request_subject.clone(),
            queue_group: config.queue_group(),
            broadcast_subject: config.broadcast_subject.clone(),
            forward_module: config.forward_module.clone(),
            forward_topic_prefix: config.forward_topic_prefix.clone(),
            forward_timeout: Duration::from_millis(config.forward_timeout_ms),
            broadcast_capacity: config.broadcast_capacity,
        },
    )
    .await
    {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to initialize component service: {:#}", e);
            shutdown_telemetry(telemetry_providers);
            std::process::exit(1);
        }
    };

    let mut runner = Runner::new();
    for (name, process) in component_service.into_runner_processes() {
        runner = runner.with_boxed_process(name, process);
    }

    let runner = runner
        .with_closer(move || async move {
            info!("Running cleanup tasks...");
            if let Err(e) = nats_client.close().await {
                error!("Failed to close NATS connection: {:#}", e);
            }

            // Flush pending traces last so the lines above are exported
            shutdown_telemetry(telemetry_providers);
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10));

    if runner.run().await.is_err() {
        std::process::exit(1);
    }
}

async fn initialize_shared_dependencies(
    config: &ServiceConfig,
) -> anyhow::Result<(PostgresClient, NatsClient)> {
    let startup_timeout = Duration::from_secs(config.startup_timeout_secs);

    info!("Initializing PostgreSQL...");
    let postgres_client = PostgresClient::new(&PostgresConfig {
        host: config.postgres_host.clone(),
        port: config.postgres_port,
        database: config.postgres_database.clone(),
        username: config.postgres_username.clone(),
        password: config.postgres_password.clone(),
        max_pool_size: config.postgres_max_pool_size,
        query_timeout_ms: config.postgres_query_timeout_ms,
    })?;
    tokio::time::timeout(startup_timeout, postgres_client.ping())
        .await
        .map_err(|_| anyhow::anyhow!("PostgreSQL not reachable within {:?}", startup_timeout))??;

    info!("Initializing NATS...");
    let nats_client = NatsClient::connect(&config.nats_url, startup_timeout).await?;

    Ok((postgres_client, nats_client))
}

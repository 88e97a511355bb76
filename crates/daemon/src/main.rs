//! Formflux Document Engine - Main Entry Point
//! JSON-RPC surface + background worker over a durable job store

mod config;
mod telemetry;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use config::Config;
use formflux_api_rpc::{RpcServer, RpcServerConfig};
use formflux_connectors::{GeminiClient, GeminiConfig, OmdbCatalog, OmdbConfig, TtlCache};
use formflux_core::application::worker::{shutdown_channel, work_channel, Worker};
use formflux_core::application::{DocumentPipeline, JobLifecycle, MovieSearch, SearchConfig};
use formflux_core::port::id_provider::UuidProvider;
use formflux_core::port::time_provider::SystemTimeProvider;
use formflux_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("FORMFLUX_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("formflux=info"))
        .expect("Failed to create env filter");

    // Optional rolling file log alongside stdout; the guard must outlive main
    let mut _log_guard = None;
    let file_layer = match std::env::var("FORMFLUX_LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(&dir, "formflux.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            _log_guard = Some(guard);
            Some(fmt::layer().json().with_writer(writer))
        }
        Err(_) => None,
    };

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Formflux Document Engine v{} starting...", VERSION);

    // 1.1. Initialize OpenTelemetry (optional)
    if let Err(e) = telemetry::init_telemetry() {
        tracing::warn!(error = ?e, "Failed to initialize OpenTelemetry (continuing without it)");
    }

    // 2. Load configuration
    let config = Config::from_env()?;

    info!(db_path = %config.db_path, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&config.db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let job_store = Arc::new(SqliteJobStore::new(pool.clone()));

    let (queue_handle, work_receiver) = work_channel(config.queue_capacity);

    let lifecycle = Arc::new(JobLifecycle::new(
        job_store,
        Arc::new(queue_handle),
        id_provider,
        time_provider.clone(),
    ));

    let inference = Arc::new(GeminiClient::new(GeminiConfig::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    )));
    let pipeline = Arc::new(DocumentPipeline::new(lifecycle.clone(), inference));

    let catalog = Arc::new(OmdbCatalog::new(OmdbConfig::new(
        config.omdb_url.clone(),
        config.omdb_api_key.clone(),
    )));
    let cache = Arc::new(TtlCache::new(time_provider.clone()));
    let search = Arc::new(MovieSearch::new(
        catalog,
        cache,
        SearchConfig {
            cache_ttl: config.cache_ttl,
            max_concurrency: config.max_concurrency,
            ..Default::default()
        },
    ));

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let rpc_server = RpcServer::new(rpc_config, lifecycle.clone(), search);
    let rpc_handle = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 6. Start Worker (job processing loop)
    info!("Starting worker...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let worker = Worker::new(
        work_receiver,
        pipeline,
        lifecycle.clone(),
        config.worker_timeout,
    );

    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker.run(shutdown_rx).await {
            tracing::error!(error = ?e, "Worker failed");
        }
    });

    info!("System ready. Waiting for documents...");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), worker_handle).await;

    info!("Shutdown complete.");

    Ok(())
}

//! Jobdock - Main Entry Point
//!
//! Composition root: configuration, logging, storage adapters, services and
//! the JSON-RPC server.

mod logging;
mod settings;

use anyhow::{Context, Result};
use jobdock_api_rpc::{RpcServer, RpcServerConfig};
use jobdock_core::application::{JobService, QueueService};
use jobdock_core::port::id_provider::UuidProvider;
use jobdock_core::port::time_provider::SystemTimeProvider;
use jobdock_core::VERSION;
use jobdock_infra_fs::LocalFileStorage;
use jobdock_infra_sqlite::{create_pool, run_migrations, SqliteJobRepository, SqliteQueueRepository};
use settings::Settings;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let settings = Settings::load()?;
    let _log_guard = logging::init(settings.log_format, settings.log_dir.as_deref())?;

    info!(version = VERSION, env = %settings.env, "Jobdock starting...");

    // 2. Database
    info!(database_url = %settings.database_url, "Initializing database...");
    let pool = create_pool(&settings.database_url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 3. Artifact storage
    let file_storage = LocalFileStorage::new(&settings.storage_root)
        .await
        .context("Storage initialization failed")?;
    info!(storage_root = %file_storage.root().display(), "Artifact storage ready");

    // 4. Dependency wiring
    let time_provider = Arc::new(SystemTimeProvider);
    let queue_service = Arc::new(QueueService::new(
        Arc::new(SqliteQueueRepository::new(pool.clone())),
        time_provider.clone(),
    ));
    let job_repo = Arc::new(SqliteJobRepository::new(pool.clone()));
    let job_service = Arc::new(JobService::new(
        queue_service.clone(),
        job_repo.clone(),
        job_repo,
        Arc::new(file_storage),
        Arc::new(UuidProvider),
        time_provider,
    ));

    // 5. JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: settings.rpc_host.clone(),
        port: settings.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, queue_service, job_service)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(%addr, "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}

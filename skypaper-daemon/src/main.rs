mod ipc;
mod update;
mod watchers;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::info;

use skypaper_core::backend::create_backend;
use skypaper_core::cache::ConfigCache;
use skypaper_core::config::Config;
use skypaper_core::paths::SkypaperPaths;
use skypaper_core::satellite::{ConfigFetcher, SatelliteClient};

use update::engine::UpdateEngine;
use update::orchestrator::UpdateOrchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skypaper_daemon=info".into()),
        )
        .init();

    let paths = SkypaperPaths::new()?;
    paths.ensure_dirs()?;

    let config = Config::load_or_default(&paths);
    info!(
        backend = %config.general.backend,
        satellite = %config.satellite.url,
        "starting skypaper-daemon"
    );

    let backend = create_backend(&config);
    let fetcher: Arc<dyn ConfigFetcher> = Arc::new(SatelliteClient::new(
        config.satellite.url.clone(),
        config.satellite.fetch_timeout_duration(),
    )?);
    let cache = Arc::new(ConfigCache::new(Arc::clone(&fetcher)));

    let orchestrator = Arc::new(UpdateOrchestrator::new(
        Arc::clone(&cache),
        fetcher,
        backend,
        config.general.default_view.clone(),
        paths.images_dir(),
        config.update.max_config_age_duration(),
    ));

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // spawn the pipeline worker
    tokio::spawn(Arc::clone(&orchestrator).run_worker(shutdown_rx.clone()));

    // spawn monitor topology watcher
    let monitor_tx = cmd_tx.clone();
    tokio::spawn(async move {
        watchers::listen_monitor_events(monitor_tx).await;
    });

    // spawn resume watcher
    let resume_tx = cmd_tx.clone();
    tokio::spawn(async move {
        watchers::watch_resume(resume_tx).await;
    });

    // spawn IPC server
    let ipc_shutdown = shutdown_rx.clone();
    let ipc_tx = cmd_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = ipc::serve_ipc(ipc_tx, ipc_shutdown).await {
            tracing::error!("IPC server error: {e}");
        }
    });

    // spawn the trigger engine
    let engine = UpdateEngine::new(
        Arc::clone(&orchestrator),
        cache,
        config.update.heartbeat_duration(),
    );
    let engine_handle = tokio::spawn(async move {
        engine.run(cmd_rx, shutdown_rx).await;
    });

    // wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("received ctrl+c, shutting down");
    let _ = shutdown_tx.send(true);

    // wait for engine to finish
    let _ = engine_handle.await;

    // clean up socket
    let socket = SkypaperPaths::socket_path();
    if socket.exists() {
        let _ = std::fs::remove_file(socket);
    }

    info!("skypaper-daemon stopped");
    Ok(())
}

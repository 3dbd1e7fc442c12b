use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use skypaper_core::cache::ConfigCache;
use skypaper_core::models::Initiator;
use skypaper_core::satellite::SatelliteConfig;

use super::orchestrator::UpdateOrchestrator;
use super::DaemonCommand;

/// Funnels every trigger source into the orchestrator: the heartbeat
/// timer lives here, everything else arrives over the command channel.
pub struct UpdateEngine {
    orchestrator: Arc<UpdateOrchestrator>,
    cache: Arc<ConfigCache>,
    heartbeat: Duration,
}

impl UpdateEngine {
    pub fn new(
        orchestrator: Arc<UpdateOrchestrator>,
        cache: Arc<ConfigCache>,
        heartbeat: Duration,
    ) -> Self {
        Self {
            orchestrator,
            cache,
            heartbeat,
        }
    }

    pub async fn run(
        self,
        mut cmd_rx: mpsc::Receiver<DaemonCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        // restore the wallpaper right away at login
        self.orchestrator.request_update(Initiator::Heartbeat);

        let mut timer = interval(self.heartbeat);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // skip the first immediate tick
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.orchestrator.request_update(Initiator::Heartbeat);
                }
                Some(cmd) = cmd_rx.recv() => {
                    match cmd {
                        DaemonCommand::Status { respond } => {
                            let _ = respond.send(self.orchestrator.status());
                        }
                        DaemonCommand::GetConfig { respond } => {
                            // may hit the network, keep the loop free
                            tokio::spawn(serve_config(Arc::clone(&self.cache), respond));
                        }
                        DaemonCommand::SetView { view_id } => {
                            self.orchestrator.set_view(view_id);
                            self.orchestrator.request_update(Initiator::User);
                        }
                        DaemonCommand::Update { initiator } => {
                            self.orchestrator.request_update(initiator);
                        }
                        DaemonCommand::Quit => {
                            info!("quit command received");
                            return;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown signal received");
                    return;
                }
            }
        }
    }
}

/// Serve the cached config; fetch once when the cache is empty. A
/// failed fetch answers with "no config" rather than an error.
async fn serve_config(
    cache: Arc<ConfigCache>,
    respond: oneshot::Sender<Option<Arc<SatelliteConfig>>>,
) {
    let config = match cache.get() {
        Some(config) => Some(config),
        None => cache.refresh().await.ok(),
    };
    let _ = respond.send(config);
}

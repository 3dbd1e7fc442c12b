use std::time::Duration;

use chrono::Local;
use futures_lite::StreamExt;
use hyprland::event_listener::{Event, EventStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use skypaper_core::models::Initiator;

use crate::update::DaemonCommand;

/// Listens for Hyprland monitor topology events and forwards them as
/// display-change update requests.
pub async fn listen_monitor_events(cmd_tx: mpsc::Sender<DaemonCommand>) {
    let mut stream = EventStream::new();

    while let Some(event) = stream.next().await {
        match event {
            Ok(Event::MonitorAdded(_)) | Ok(Event::MonitorRemoved(_)) => {
                debug!("monitor topology changed");
                if cmd_tx
                    .send(DaemonCommand::Update {
                        initiator: Initiator::DisplayChange,
                    })
                    .await
                    .is_err()
                {
                    error!("cmd channel closed, stopping monitor watcher");
                    break;
                }
            }
            Ok(_) => {} // ignore other events
            Err(e) => {
                error!("hyprland event error: {e}");
                break;
            }
        }
    }
}

const RESUME_PROBE: Duration = Duration::from_secs(60);
const RESUME_SLACK_SECS: i64 = 90;

/// Detects resume from suspend by watching for wall-clock gaps.
///
/// The probe sleeps on the monotonic clock, which does not advance
/// while the machine is suspended; after resume the wall clock has
/// jumped far past the probe interval.
pub async fn watch_resume(cmd_tx: mpsc::Sender<DaemonCommand>) {
    let mut last = Local::now();

    loop {
        tokio::time::sleep(RESUME_PROBE).await;
        let now = Local::now();
        let gap = (now - last).num_seconds() - RESUME_PROBE.as_secs() as i64;

        if gap > RESUME_SLACK_SECS {
            info!(gap_secs = gap, "resume from suspend detected");
            if cmd_tx
                .send(DaemonCommand::Update {
                    initiator: Initiator::PowerResume,
                })
                .await
                .is_err()
            {
                error!("cmd channel closed, stopping resume watcher");
                return;
            }
        }
        last = now;
    }
}

pub mod engine;
pub mod lock;
pub mod orchestrator;

use std::sync::Arc;

use tokio::sync::oneshot;

use skypaper_core::ipc::DaemonStatus;
use skypaper_core::models::Initiator;
use skypaper_core::satellite::SatelliteConfig;

pub enum DaemonCommand {
    Status {
        respond: oneshot::Sender<DaemonStatus>,
    },
    GetConfig {
        respond: oneshot::Sender<Option<Arc<SatelliteConfig>>>,
    },
    SetView {
        view_id: String,
    },
    Update {
        initiator: Initiator,
    },
    Quit,
}

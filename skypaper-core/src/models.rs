use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Why an update run was requested. Carried through the pipeline for
/// logging and the refresh policy; never affects lock correctness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Initiator {
    Heartbeat,
    DisplayChange,
    PowerResume,
    User,
}

impl Initiator {
    pub const ALL: &[Initiator] = &[
        Initiator::Heartbeat,
        Initiator::DisplayChange,
        Initiator::PowerResume,
        Initiator::User,
    ];

    /// Whether a run for this initiator must always fetch fresh
    /// satellite config, regardless of cache age.
    pub fn forces_refresh(self) -> bool {
        matches!(self, Initiator::User | Initiator::DisplayChange)
    }
}

impl std::fmt::Display for Initiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heartbeat => write!(f, "heartbeat"),
            Self::DisplayChange => write!(f, "display_change"),
            Self::PowerResume => write!(f, "power_resume"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Initiator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "heartbeat" => Ok(Self::Heartbeat),
            "display_change" => Ok(Self::DisplayChange),
            "power_resume" => Ok(Self::PowerResume),
            "user" => Ok(Self::User),
            other => Err(format!("unknown initiator: {other}")),
        }
    }
}

/// One pending update intent. Ephemeral: created by a trigger source,
/// consumed by the orchestrator, never persisted.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub initiator: Initiator,
    pub requested_at: DateTime<Local>,
}

impl UpdateRequest {
    pub fn new(initiator: Initiator) -> Self {
        Self {
            initiator,
            requested_at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

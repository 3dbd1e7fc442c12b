pub mod hyprpaper;
pub mod monitor;
pub mod swww;

use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;

use crate::config::{BackendType, Config};
use crate::error::{Result, SkypaperError};
use crate::models::MonitorInfo;

#[async_trait]
pub trait WallpaperBackend: Send + Sync {
    /// Apply an image to one monitor. Re-applying the current image is
    /// a no-op from the user's perspective and must not error.
    async fn set_wallpaper(&self, path: &Path, monitor: &str) -> Result<()>;
    /// Current display topology.
    async fn monitors(&self) -> Result<Vec<MonitorInfo>>;
    fn name(&self) -> &str;
}

pub fn create_backend(config: &Config) -> Box<dyn WallpaperBackend> {
    match config.general.backend {
        BackendType::Hyprpaper => Box::new(hyprpaper::HyprpaperBackend::new()),
        BackendType::Swww => Box::new(swww::SwwwBackend::new(config.general.transition.clone())),
    }
}

/// Ceiling for backend subprocess calls so a hung compositor cannot
/// stall the update queue.
pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) async fn run_command(
    mut cmd: Command,
    what: &str,
    timeout: Duration,
) -> Result<Output> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(output) => {
            output.map_err(|e| SkypaperError::Backend(format!("failed to run {what}: {e}")))
        }
        Err(_) => Err(SkypaperError::Backend(format!(
            "{what} timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_command_times_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let err = run_command(cmd, "sleep", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_run_command_captures_output() {
        let mut cmd = Command::new("echo");
        cmd.arg("ok");
        let output = run_command(cmd, "echo", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ok");
    }

    #[tokio::test]
    async fn test_run_command_missing_binary() {
        let cmd = Command::new("definitely-not-a-real-binary");
        let err = run_command(cmd, "missing", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to run missing"));
    }
}

use serde::Deserialize;
use tokio::process::Command;

use crate::error::{Result, SkypaperError};
use crate::models::MonitorInfo;

/// Detect connected monitors via `hyprctl monitors -j`.
pub async fn detect_monitors() -> Result<Vec<MonitorInfo>> {
    let mut cmd = Command::new("hyprctl");
    cmd.args(["monitors", "-j"]);
    let output = super::run_command(cmd, "hyprctl monitors", super::COMMAND_TIMEOUT).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SkypaperError::Backend(format!(
            "hyprctl monitors failed: {stderr}"
        )));
    }

    let json = String::from_utf8_lossy(&output.stdout);
    parse_monitors(&json)
}

fn parse_monitors(json: &str) -> Result<Vec<MonitorInfo>> {
    let raw: Vec<HyprMonitor> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|m| MonitorInfo {
            name: m.name,
            width: m.width,
            height: m.height,
            scale: m.scale,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct HyprMonitor {
    name: String,
    width: u32,
    height: u32,
    scale: f64,
}

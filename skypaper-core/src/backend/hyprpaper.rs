use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Result, SkypaperError};
use crate::models::MonitorInfo;

use super::{monitor, WallpaperBackend};

pub struct HyprpaperBackend;

impl HyprpaperBackend {
    pub fn new() -> Self {
        Self
    }

    async fn hyprctl(args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("hyprctl");
        cmd.args(args);
        let output = super::run_command(cmd, "hyprctl", super::COMMAND_TIMEOUT).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SkypaperError::Backend(format!("hyprctl failed: {stderr}")));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for HyprpaperBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WallpaperBackend for HyprpaperBackend {
    async fn set_wallpaper(&self, path: &Path, monitor: &str) -> Result<()> {
        let path_str = path.to_string_lossy();

        // preload the wallpaper
        Self::hyprctl(&["hyprpaper", "preload", &path_str]).await?;

        // set wallpaper on specific monitor
        let wallpaper_arg = format!("{monitor},{path_str}");
        Self::hyprctl(&["hyprpaper", "wallpaper", &wallpaper_arg]).await?;

        // unload all unused wallpapers to free memory
        Self::hyprctl(&["hyprpaper", "unload", "all"]).await?;

        Ok(())
    }

    async fn monitors(&self) -> Result<Vec<MonitorInfo>> {
        monitor::detect_monitors().await
    }

    fn name(&self) -> &str {
        "hyprpaper"
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    #[test]
    fn test_hyprpaper_command_args() {
        // Verify the argument format for hyprpaper commands
        let path = PathBuf::from("/cache/images/ab12cd.jpg");
        let monitor = "DP-1";
        let path_str = path.to_string_lossy();

        let wallpaper_arg = format!("{monitor},{path_str}");
        assert_eq!(wallpaper_arg, "DP-1,/cache/images/ab12cd.jpg");
    }
}

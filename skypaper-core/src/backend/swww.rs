use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::TransitionConfig;
use crate::error::{Result, SkypaperError};
use crate::models::MonitorInfo;

use super::{monitor, WallpaperBackend};

pub struct SwwwBackend {
    transition: TransitionConfig,
}

impl SwwwBackend {
    pub fn new(transition: TransitionConfig) -> Self {
        Self { transition }
    }

    fn build_command(&self, path: &Path, output: &str) -> Command {
        let mut cmd = Command::new("swww");
        cmd.arg("img").arg(path);
        cmd.arg("--outputs").arg(output);
        cmd.arg("--transition-type").arg(&self.transition.r#type);
        cmd.arg("--transition-duration")
            .arg(self.transition.duration.to_string());
        cmd.arg("--transition-fps")
            .arg(self.transition.fps.to_string());
        cmd
    }
}

#[async_trait]
impl WallpaperBackend for SwwwBackend {
    async fn set_wallpaper(&self, path: &Path, monitor: &str) -> Result<()> {
        let cmd = self.build_command(path, monitor);
        let output = super::run_command(cmd, "swww", super::COMMAND_TIMEOUT).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SkypaperError::Backend(format!("swww failed: {stderr}")));
        }
        Ok(())
    }

    async fn monitors(&self) -> Result<Vec<MonitorInfo>> {
        monitor::detect_monitors().await
    }

    fn name(&self) -> &str {
        "swww"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_swww_command_args() {
        let transition = TransitionConfig {
            r#type: "fade".into(),
            duration: 2.0,
            fps: 60,
        };
        let backend = SwwwBackend::new(transition);
        let path = PathBuf::from("/cache/images/ab12cd.jpg");

        let cmd = backend.build_command(&path, "DP-1");
        let prog = cmd.as_std().get_program().to_string_lossy().to_string();
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert_eq!(prog, "swww");
        assert_eq!(args[0], "img");
        assert_eq!(args[1], "/cache/images/ab12cd.jpg");
        assert!(args.contains(&"--outputs".to_string()));
        assert!(args.contains(&"DP-1".to_string()));
        assert!(args.contains(&"--transition-type".to_string()));
        assert!(args.contains(&"fade".to_string()));
        assert!(args.contains(&"--transition-duration".to_string()));
        assert!(args.contains(&"2".to_string()));
        assert!(args.contains(&"--transition-fps".to_string()));
        assert!(args.contains(&"60".to_string()));
    }
}

use std::path::PathBuf;

use crate::error::{Result, SkypaperError};

#[derive(Debug, Clone)]
pub struct SkypaperPaths {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl SkypaperPaths {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SkypaperError::Config("cannot resolve XDG config dir".into()))?
            .join("skypaper");

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| SkypaperError::Config("cannot resolve XDG cache dir".into()))?
            .join("skypaper");

        Ok(Self {
            config_dir,
            cache_dir,
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Downloaded satellite images, named by content address.
    pub fn images_dir(&self) -> PathBuf {
        self.cache_dir.join("images")
    }

    pub fn socket_path() -> PathBuf {
        let uid = unsafe { libc::getuid() };
        PathBuf::from(format!("/tmp/skypaper-{uid}.sock"))
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.cache_dir, &self.images_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

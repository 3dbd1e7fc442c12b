use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkypaperError};
use crate::paths::SkypaperPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub satellite: SatelliteSection,
    pub update: UpdateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            satellite: SatelliteSection::default(),
            update: UpdateConfig::default(),
        }
    }
}

impl Config {
    pub fn load(paths: &SkypaperPaths) -> Result<Self> {
        let path = paths.config_file();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SkypaperError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &SkypaperPaths) -> Self {
        Self::load(paths).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub backend: BackendType,
    /// View applied until the user picks one over IPC.
    pub default_view: String,
    pub transition: TransitionConfig,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::Hyprpaper,
            default_view: "auto".into(),
            transition: TransitionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteSection {
    /// Remote satellite config endpoint.
    pub url: String,
    pub fetch_timeout: String,
}

impl Default for SatelliteSection {
    fn default() -> Self {
        Self {
            url: "https://skypaper.dev/api/v1/config.json".into(),
            fetch_timeout: "30s".into(),
        }
    }
}

impl SatelliteSection {
    pub fn fetch_timeout_duration(&self) -> Duration {
        parse_interval(&self.fetch_timeout).unwrap_or(Duration::from_secs(30))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub heartbeat_interval: String,
    /// Cached config older than this is refetched on heartbeat/resume
    /// runs. User and display-change runs always refetch.
    pub max_config_age: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: "10m".into(),
            max_config_age: "1h".into(),
        }
    }
}

impl UpdateConfig {
    pub fn heartbeat_duration(&self) -> Duration {
        parse_interval(&self.heartbeat_interval).unwrap_or(Duration::from_secs(600))
    }

    pub fn max_config_age_duration(&self) -> Duration {
        parse_interval(&self.max_config_age).unwrap_or(Duration::from_secs(3600))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub r#type: String,
    pub duration: f64,
    pub fps: u32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            r#type: "fade".into(),
            duration: 2.0,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    Hyprpaper,
    Swww,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hyprpaper => write!(f, "hyprpaper"),
            Self::Swww => write!(f, "swww"),
        }
    }
}

/// Parse interval string like "30m", "1h", "90s" into Duration.
pub fn parse_interval(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, suffix) = if s.ends_with('s') {
        (&s[..s.len() - 1], 's')
    } else if s.ends_with('m') {
        (&s[..s.len() - 1], 'm')
    } else if s.ends_with('h') {
        (&s[..s.len() - 1], 'h')
    } else {
        // default to seconds if no suffix
        (s, 's')
    };

    let num: u64 = num_str.parse().ok()?;
    let secs = match suffix {
        's' => num,
        'm' => num * 60,
        'h' => num * 3600,
        _ => return None,
    };

    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("30m"), Some(Duration::from_secs(1800)));
        assert_eq!(parse_interval("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_interval("90s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_interval("60"), Some(Duration::from_secs(60)));
        assert_eq!(parse_interval(""), None);
        assert_eq!(parse_interval("abc"), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.backend, BackendType::Hyprpaper);
        assert_eq!(config.general.default_view, "auto");
        assert_eq!(config.update.heartbeat_duration(), Duration::from_secs(600));
        assert_eq!(
            config.update.max_config_age_duration(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            config.satellite.fetch_timeout_duration(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[general]
backend = "swww"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.backend, BackendType::Swww);
        // defaults still applied
        assert_eq!(config.update.heartbeat_interval, "10m");
        assert!(config.satellite.url.starts_with("https://"));
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[general]
backend = "hyprpaper"
default_view = "east_pacific"

[general.transition]
type = "wipe"
duration = 1.5
fps = 30

[satellite]
url = "https://config.example.com/satellite.json"
fetch_timeout = "10s"

[update]
heartbeat_interval = "5m"
max_config_age = "30m"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.default_view, "east_pacific");
        assert_eq!(config.general.transition.r#type, "wipe");
        assert_eq!(config.satellite.url, "https://config.example.com/satellite.json");
        assert_eq!(
            config.satellite.fetch_timeout_duration(),
            Duration::from_secs(10)
        );
        assert_eq!(config.update.heartbeat_duration(), Duration::from_secs(300));
        assert_eq!(
            config.update.max_config_age_duration(),
            Duration::from_secs(1800)
        );
    }
}

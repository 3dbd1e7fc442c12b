use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkypaperError};

/// The remote satellite payload: every view the user can pick, each
/// with one image variant per supported resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteConfig {
    pub views: Vec<ViewConfig>,
    #[serde(default)]
    pub default_view: Option<String>,
}

impl SatelliteConfig {
    /// Resolve a view id, falling back to the payload's default view
    /// and then to the first listed view.
    pub fn resolve_view(&self, id: &str) -> Option<&ViewConfig> {
        self.views
            .iter()
            .find(|v| v.id == id)
            .or_else(|| {
                self.default_view
                    .as_deref()
                    .and_then(|d| self.views.iter().find(|v| v.id == d))
            })
            .or_else(|| self.views.first())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub id: String,
    pub name: String,
    pub variants: Vec<ImageVariant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageVariant {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// Seam between the cache/orchestrator and the remote source; tests
/// inject fakes here.
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    async fn fetch(&self) -> Result<SatelliteConfig>;
    async fn download(&self, url: &str) -> Result<bytes::Bytes>;
}

pub struct SatelliteClient {
    url: String,
    client: reqwest::Client,
}

impl SatelliteClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl ConfigFetcher for SatelliteClient {
    async fn fetch(&self) -> Result<SatelliteConfig> {
        let config: SatelliteConfig = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SkypaperError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| SkypaperError::Fetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| SkypaperError::Fetch(format!("invalid payload: {e}")))?;
        Ok(config)
    }

    async fn download(&self, url: &str) -> Result<bytes::Bytes> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes)
    }
}

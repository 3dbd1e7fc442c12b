use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use skypaper_core::assign::{assign_wallpapers, Assignment};
use skypaper_core::backend::WallpaperBackend;
use skypaper_core::cache::ConfigCache;
use skypaper_core::error::{Result, SkypaperError};
use skypaper_core::ipc::DaemonStatus;
use skypaper_core::models::{Initiator, UpdateRequest};
use skypaper_core::satellite::{ConfigFetcher, SatelliteConfig};

use super::lock::UpdateLock;

struct LastRun {
    initiator: Initiator,
    at: DateTime<Local>,
    ok: bool,
}

/// The single authoritative path from "something thinks the wallpaper
/// should change" to "the backend call has been issued".
///
/// `request_update` is non-blocking from any trigger source; the
/// pipeline itself executes on the dedicated worker task, one run at a
/// time, draining coalesced tails before going idle.
pub struct UpdateOrchestrator {
    lock: UpdateLock,
    cache: Arc<ConfigCache>,
    fetcher: Arc<dyn ConfigFetcher>,
    backend: Box<dyn WallpaperBackend>,
    view: RwLock<String>,
    images_dir: PathBuf,
    max_config_age: Duration,
    last_run: Mutex<Option<LastRun>>,
}

impl UpdateOrchestrator {
    pub fn new(
        cache: Arc<ConfigCache>,
        fetcher: Arc<dyn ConfigFetcher>,
        backend: Box<dyn WallpaperBackend>,
        default_view: String,
        images_dir: PathBuf,
        max_config_age: Duration,
    ) -> Self {
        Self {
            lock: UpdateLock::new(),
            cache,
            fetcher,
            backend,
            view: RwLock::new(default_view),
            images_dir,
            max_config_age,
            last_run: Mutex::new(None),
        }
    }

    /// Queue an update run. Returns immediately; the run is coalesced
    /// with any not-yet-started request.
    pub fn request_update(&self, initiator: Initiator) {
        debug!(initiator = %initiator, "update requested");
        self.lock.submit(UpdateRequest::new(initiator));
    }

    pub fn set_view(&self, view_id: impl Into<String>) {
        let view_id = view_id.into();
        info!(view = %view_id, "view selection changed");
        *self.view.write().expect("view lock poisoned") = view_id;
    }

    pub fn current_view(&self) -> String {
        self.view.read().expect("view lock poisoned").clone()
    }

    pub fn status(&self) -> DaemonStatus {
        let last = self.last_run.lock().expect("last run lock poisoned");
        DaemonStatus {
            running: true,
            updating: self.lock.is_running(),
            current_view: self.current_view(),
            config_available: self.cache.get().is_some(),
            last_initiator: last.as_ref().map(|r| r.initiator),
            last_run: last.as_ref().map(|r| r.at.to_rfc3339()),
            last_run_ok: last.as_ref().map(|r| r.ok),
        }
    }

    /// Worker loop: park until a request arrives, then drain the lock.
    /// Every failure is recovered here; nothing escapes the task.
    pub async fn run_worker(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = self.lock.wait() => {}
                _ = shutdown.changed() => {
                    info!("update worker shutting down");
                    return;
                }
            }

            while let Some(request) = self.lock.take() {
                let initiator = request.initiator;
                let waited_ms = (Local::now() - request.requested_at).num_milliseconds();
                debug!(initiator = %initiator, waited_ms, "starting update run");
                let ok = match self.run_once(&request).await {
                    Ok(applied) => {
                        info!(initiator = %initiator, applied, "wallpaper update finished");
                        true
                    }
                    Err(e) => {
                        warn!(initiator = %initiator, "wallpaper update failed: {e}");
                        false
                    }
                };
                *self.last_run.lock().expect("last run lock poisoned") = Some(LastRun {
                    initiator,
                    at: Local::now(),
                    ok,
                });
            }
        }
    }

    /// One pipeline run: config, view, topology, assignment, apply.
    async fn run_once(&self, request: &UpdateRequest) -> Result<usize> {
        let config = self.current_config(request.initiator).await?;
        let view = self.current_view();

        let monitors = self.backend.monitors().await?;
        let assignments =
            assign_wallpapers(&config, &view, &monitors).ok_or(SkypaperError::NoConfig)?;

        if assignments.is_empty() {
            debug!("no connected monitors, nothing to apply");
            return Ok(0);
        }

        let mut applied = 0;
        for assignment in &assignments {
            match self.apply_one(assignment).await {
                Ok(()) => applied += 1,
                Err(e) => {
                    // one bad monitor must not block the others
                    warn!(monitor = %assignment.monitor, "failed to apply wallpaper: {e}");
                }
            }
        }

        // every monitor rejected the update: surface the failure
        if applied == 0 {
            return Err(SkypaperError::Backend(
                "no display accepted the update".into(),
            ));
        }
        Ok(applied)
    }

    /// Cached config, refreshed per the initiator policy. A refresh
    /// failure degrades to the last good config when one exists.
    async fn current_config(&self, initiator: Initiator) -> Result<Arc<SatelliteConfig>> {
        let cached = self.cache.get();

        if let Some(config) = &cached {
            let stale = self
                .cache
                .age()
                .map(|age| age > self.max_config_age)
                .unwrap_or(true);
            if !initiator.forces_refresh() && !stale && !self.cache.last_refresh_failed() {
                return Ok(Arc::clone(config));
            }
        }

        match self.cache.refresh().await {
            Ok(config) => Ok(config),
            Err(e) => match cached {
                Some(config) => {
                    warn!("satellite config refresh failed, using cached: {e}");
                    Ok(config)
                }
                None => {
                    warn!("satellite config refresh failed with no cache: {e}");
                    Err(SkypaperError::NoConfig)
                }
            },
        }
    }

    /// Make sure the image is on disk, then hand it to the backend.
    async fn apply_one(&self, assignment: &Assignment) -> Result<()> {
        let path = self.image_path(&assignment.url);
        if !path.exists() {
            let bytes = self.fetcher.download(&assignment.url).await?;
            tokio::fs::write(&path, &bytes).await?;
            debug!(path = %path.display(), "image downloaded");
        }
        self.backend.set_wallpaper(&path, &assignment.monitor).await
    }

    /// Content-addressed cache file for an image url.
    fn image_path(&self, url: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        let ext = url
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| ext.len() <= 4)
            .unwrap_or("img");
        self.images_dir.join(format!("{digest}.{ext}"))
    }
}

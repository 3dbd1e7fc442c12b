use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::satellite::{ConfigFetcher, SatelliteConfig};

struct Slot {
    config: Arc<SatelliteConfig>,
    fetched_at: Instant,
}

/// Holds the latest known-good satellite configuration.
///
/// Readers always see either the previous complete payload or the new
/// one, never a partial replacement. Overlapping `refresh` calls share
/// one outstanding fetch: the gate serializes fetches and the
/// generation counter lets a caller that waited out someone else's
/// fetch return the fresh value without a second network round-trip.
pub struct ConfigCache {
    fetcher: Arc<dyn ConfigFetcher>,
    slot: RwLock<Option<Slot>>,
    generation: AtomicU64,
    fetch_gate: tokio::sync::Mutex<()>,
    last_failed: AtomicBool,
}

impl ConfigCache {
    pub fn new(fetcher: Arc<dyn ConfigFetcher>) -> Self {
        Self {
            fetcher,
            slot: RwLock::new(None),
            generation: AtomicU64::new(0),
            fetch_gate: tokio::sync::Mutex::new(()),
            last_failed: AtomicBool::new(false),
        }
    }

    /// Cached configuration, if any. Never fetches.
    pub fn get(&self) -> Option<Arc<SatelliteConfig>> {
        self.slot
            .read()
            .expect("config cache lock poisoned")
            .as_ref()
            .map(|s| Arc::clone(&s.config))
    }

    /// Time since the last successful fetch.
    pub fn age(&self) -> Option<Duration> {
        self.slot
            .read()
            .expect("config cache lock poisoned")
            .as_ref()
            .map(|s| s.fetched_at.elapsed())
    }

    pub fn last_refresh_failed(&self) -> bool {
        self.last_failed.load(Ordering::Acquire)
    }

    /// Fetch a fresh configuration. On success the cached value is
    /// replaced atomically; on failure the cache keeps whatever it had.
    pub async fn refresh(&self) -> Result<Arc<SatelliteConfig>> {
        let start_gen = self.generation.load(Ordering::Acquire);
        let _gate = self.fetch_gate.lock().await;

        // someone else refreshed while we waited for the gate
        if self.generation.load(Ordering::Acquire) != start_gen {
            if let Some(config) = self.get() {
                debug!("satellite config refresh de-duplicated");
                return Ok(config);
            }
        }

        match self.fetcher.fetch().await {
            Ok(config) => {
                let config = Arc::new(config);
                *self.slot.write().expect("config cache lock poisoned") = Some(Slot {
                    config: Arc::clone(&config),
                    fetched_at: Instant::now(),
                });
                self.generation.fetch_add(1, Ordering::AcqRel);
                self.last_failed.store(false, Ordering::Release);
                Ok(config)
            }
            Err(e) => {
                self.last_failed.store(true, Ordering::Release);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::SkypaperError;
    use crate::satellite::ViewConfig;

    struct FakeFetcher {
        calls: AtomicUsize,
        fail: AtomicBool,
        delay: Duration,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                delay: Duration::ZERO,
            }
        }

        fn payload(marker: &str) -> SatelliteConfig {
            SatelliteConfig {
                views: vec![ViewConfig {
                    id: marker.into(),
                    name: marker.into(),
                    variants: Vec::new(),
                }],
                default_view: None,
            }
        }
    }

    #[async_trait]
    impl ConfigFetcher for FakeFetcher {
        async fn fetch(&self) -> Result<SatelliteConfig> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(SkypaperError::Fetch("unreachable".into()));
            }
            Ok(Self::payload(&format!("v{n}")))
        }

        async fn download(&self, _url: &str) -> Result<bytes::Bytes> {
            Ok(bytes::Bytes::from_static(b"image"))
        }
    }

    #[tokio::test]
    async fn test_get_empty_before_refresh() {
        let cache = ConfigCache::new(Arc::new(FakeFetcher::new()));
        assert!(cache.get().is_none());
        assert!(cache.age().is_none());
    }

    #[tokio::test]
    async fn test_refresh_replaces_cached_value() {
        let fetcher = Arc::new(FakeFetcher::new());
        let cache = ConfigCache::new(fetcher.clone());

        let first = cache.refresh().await.unwrap();
        assert_eq!(first.views[0].id, "v0");
        assert_eq!(cache.get().unwrap().views[0].id, "v0");

        let second = cache.refresh().await.unwrap();
        assert_eq!(second.views[0].id, "v1");
        assert_eq!(cache.get().unwrap().views[0].id, "v1");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_old_value() {
        let fetcher = Arc::new(FakeFetcher::new());
        let cache = ConfigCache::new(fetcher.clone());

        cache.refresh().await.unwrap();
        fetcher.fail.store(true, Ordering::SeqCst);

        assert!(cache.refresh().await.is_err());
        assert!(cache.last_refresh_failed());
        // last good value still served
        assert_eq!(cache.get().unwrap().views[0].id, "v0");

        fetcher.fail.store(false, Ordering::SeqCst);
        cache.refresh().await.unwrap();
        assert!(!cache.last_refresh_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refreshes_share_one_fetch() {
        let fetcher = Arc::new(FakeFetcher {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delay: Duration::from_millis(100),
        });
        let cache = Arc::new(ConfigCache::new(fetcher.clone()));

        let a = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.refresh().await.unwrap().views[0].id.clone() }
        });
        let b = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.refresh().await.unwrap().views[0].id.clone() }
        });

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a, "v0");
        assert_eq!(b, "v0");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }
}

use std::sync::Mutex;

use tokio::sync::Notify;
use tracing::debug;

use skypaper_core::models::UpdateRequest;

struct Inner {
    running: bool,
    pending: Option<UpdateRequest>,
}

/// Serializes update runs and coalesces redundant requests.
///
/// Trigger sources `submit` from any task; a single worker alternates
/// between `wait` and draining `take`. At most one request sits in the
/// pending slot: a newer submission replaces an older one that has not
/// started yet, so the latest intent always wins. While a run is in
/// flight the slot acts as the queued tail, executed once the run
/// completes.
pub struct UpdateLock {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl UpdateLock {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                running: false,
                pending: None,
            }),
            notify: Notify::new(),
        }
    }

    /// Queue a request. Non-blocking; never starts a second concurrent
    /// run.
    pub fn submit(&self, request: UpdateRequest) {
        let initiator = request.initiator;
        let replaced = {
            let mut inner = self.inner.lock().expect("update lock poisoned");
            inner.pending.replace(request)
        };
        if let Some(old) = replaced {
            debug!(
                superseded = %old.initiator,
                initiator = %initiator,
                "coalesced pending update request"
            );
        }
        self.notify.notify_one();
    }

    /// Worker side: pull the next request and mark the lock running,
    /// or fall back to idle when nothing is pending.
    pub fn take(&self) -> Option<UpdateRequest> {
        let mut inner = self.inner.lock().expect("update lock poisoned");
        match inner.pending.take() {
            Some(request) => {
                inner.running = true;
                Some(request)
            }
            None => {
                inner.running = false;
                None
            }
        }
    }

    /// Worker side: park until a request is submitted.
    pub async fn wait(&self) {
        self.notify.notified().await;
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().expect("update lock poisoned").running
    }
}

impl Default for UpdateLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skypaper_core::models::Initiator;

    fn req(initiator: Initiator) -> UpdateRequest {
        UpdateRequest::new(initiator)
    }

    #[test]
    fn test_idle_take_is_empty() {
        let lock = UpdateLock::new();
        assert!(lock.take().is_none());
        assert!(!lock.is_running());
    }

    #[test]
    fn test_submit_then_take_runs() {
        let lock = UpdateLock::new();
        lock.submit(req(Initiator::Heartbeat));

        let taken = lock.take().unwrap();
        assert_eq!(taken.initiator, Initiator::Heartbeat);
        assert!(lock.is_running());

        // run complete, nothing queued
        assert!(lock.take().is_none());
        assert!(!lock.is_running());
    }

    #[test]
    fn test_latest_pending_request_wins() {
        let lock = UpdateLock::new();
        lock.submit(req(Initiator::Heartbeat));
        lock.submit(req(Initiator::DisplayChange));
        lock.submit(req(Initiator::User));

        // three submissions before the worker woke: exactly one run,
        // tagged with the last initiator
        let taken = lock.take().unwrap();
        assert_eq!(taken.initiator, Initiator::User);
        assert!(lock.take().is_none());
    }

    #[test]
    fn test_requests_during_run_become_one_tail() {
        let lock = UpdateLock::new();
        lock.submit(req(Initiator::Heartbeat));
        let first = lock.take().unwrap();
        assert_eq!(first.initiator, Initiator::Heartbeat);

        // a burst arrives while the run is in flight
        lock.submit(req(Initiator::DisplayChange));
        lock.submit(req(Initiator::PowerResume));
        lock.submit(req(Initiator::User));

        // exactly one tail run, tagged with the latest initiator
        let tail = lock.take().unwrap();
        assert_eq!(tail.initiator, Initiator::User);
        assert!(lock.is_running());

        assert!(lock.take().is_none());
        assert!(!lock.is_running());
    }

    #[test]
    fn test_runs_never_exceed_requests() {
        let lock = UpdateLock::new();
        for _ in 0..5 {
            lock.submit(req(Initiator::Heartbeat));
        }

        let mut runs = 0;
        while lock.take().is_some() {
            runs += 1;
        }
        // a burst submitted while idle collapses into a single run
        assert_eq!(runs, 1);
        assert!(!lock.is_running());
    }

    #[tokio::test]
    async fn test_wait_wakes_on_submit() {
        let lock = std::sync::Arc::new(UpdateLock::new());
        let waiter = {
            let lock = lock.clone();
            tokio::spawn(async move {
                lock.wait().await;
                lock.take().map(|r| r.initiator)
            })
        };
        lock.submit(req(Initiator::User));
        assert_eq!(waiter.await.unwrap(), Some(Initiator::User));
    }
}

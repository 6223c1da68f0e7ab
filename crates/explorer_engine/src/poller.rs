use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use explorer_logging::{explorer_debug, explorer_info};
use tokio_util::sync::CancellationToken;

/// A periodic request registered for one path.
#[derive(Debug, Clone)]
pub struct PollRequest {
    pub interval: Duration,
    dispose: CancellationToken,
}

/// Shared map of polled paths; at most one request per path.
#[derive(Debug, Clone, Default)]
pub struct PollRegistry {
    requests: Arc<Mutex<HashMap<String, PollRequest>>>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PollRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lock().contains_key(path)
    }

    pub fn interval(&self, path: &str) -> Option<Duration> {
        self.lock().get(path).map(|r| r.interval)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Runs registered requests on their interval until disposed.
#[derive(Debug, Clone, Default)]
pub struct Poller {
    registry: PollRegistry,
}

impl Poller {
    pub fn new(registry: PollRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PollRegistry {
        &self.registry
    }

    /// Spawns a task that waits `interval`, runs `request`, and repeats.
    ///
    /// Returns `false` when `path` is already polled. Must be called from
    /// within a tokio runtime.
    pub fn add_request<F, Fut>(&self, path: &str, interval: Duration, request: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let dispose = CancellationToken::new();
        {
            let mut requests = self.registry.lock();
            if requests.contains_key(path) {
                return false;
            }
            requests.insert(
                path.to_string(),
                PollRequest {
                    interval,
                    dispose: dispose.clone(),
                },
            );
        }
        explorer_info!("Polling {} every {:?}", path, interval);

        let path = path.to_string();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = dispose.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                if dispose.is_cancelled() {
                    break;
                }
                request().await;
            }
            explorer_debug!("Polling task for {} finished", path);
        });
        true
    }

    /// Stops polling `path`. The entry leaves the registry right away; a
    /// request already running finishes first.
    pub fn dispose(&self, path: &str) -> bool {
        match self.registry.lock().remove(path) {
            Some(request) => {
                request.dispose.cancel();
                explorer_info!("Stopped polling {}", path);
                true
            }
            None => false,
        }
    }

    /// Starts polling `path` or, when it is already polled, stops it.
    /// Returns whether the path is polled afterwards.
    pub fn toggle<F, Fut>(&self, path: &str, interval: Duration, request: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.dispose(path) {
            return false;
        }
        self.add_request(path, interval, request)
    }

    pub fn dispose_all(&self) {
        let drained: Vec<PollRequest> = self.registry.lock().drain().map(|(_, r)| r).collect();
        for request in drained {
            request.dispose.cancel();
        }
    }
}

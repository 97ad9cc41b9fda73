//! Asynchronous cache invalidation.
//!
//! # Responsibilities
//! - Turn registry change notifications into queued events
//! - Drain the queue on a single background task
//! - Clear every registered cache for the changed frontend
//!
//! # Design Decisions
//! - Registry writers only `try_send`; a full queue is reported, not awaited
//! - One cache failing (error or panic) for one frontend is logged and
//!   counted; the loop carries on with the next cache and the next event
//! - On shutdown the queue is drained before the worker exits

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::frontend::FrontendName;
use crate::observability::metrics;
use crate::registry::{ChangeListener, FrontendChange};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidationError {
    #[error("cache {cache} failed to clear entries for frontend '{frontend}': {reason}")]
    Failed {
        cache: &'static str,
        frontend: FrontendName,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnqueueError {
    #[error("invalidation queue full, dropped event for frontend '{0}'")]
    QueueFull(FrontendName),

    #[error("invalidation worker stopped, dropped event for frontend '{0}'")]
    Closed(FrontendName),
}

/// A cache holding entries keyed by frontend name.
pub trait FrontendCache: Send + Sync {
    /// Label used in logs and metrics.
    fn cache_name(&self) -> &'static str;

    /// Drop every entry belonging to `frontend`.
    fn invalidate(&self, frontend: &FrontendName) -> Result<(), InvalidationError>;
}

/// Create a bounded invalidation queue.
pub fn channel(capacity: usize) -> (InvalidationSender, InvalidationWorker) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        InvalidationSender { tx },
        InvalidationWorker {
            rx,
            caches: Vec::new(),
        },
    )
}

/// Producer half; subscribe it to the registry.
#[derive(Debug, Clone)]
pub struct InvalidationSender {
    tx: mpsc::Sender<FrontendChange>,
}

impl InvalidationSender {
    pub fn enqueue(&self, change: FrontendChange) -> Result<(), EnqueueError> {
        self.tx.try_send(change).map_err(|e| match e {
            mpsc::error::TrySendError::Full(c) => EnqueueError::QueueFull(c.name),
            mpsc::error::TrySendError::Closed(c) => EnqueueError::Closed(c.name),
        })
    }
}

impl ChangeListener for InvalidationSender {
    fn on_change(&self, change: &FrontendChange) {
        if let Err(e) = self.enqueue(change.clone()) {
            let reason = match e {
                EnqueueError::QueueFull(_) => "queue_full",
                EnqueueError::Closed(_) => "closed",
            };
            tracing::warn!(error = %e, "Cache invalidation event dropped; caches may serve stale entries");
            metrics::record_invalidation_dropped(reason);
        }
    }
}

/// Totals reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvalidationStats {
    pub events: u64,
    pub failures: u64,
}

/// Consumer half; owns the caches it clears.
pub struct InvalidationWorker {
    rx: mpsc::Receiver<FrontendChange>,
    caches: Vec<Arc<dyn FrontendCache>>,
}

impl InvalidationWorker {
    pub fn with_cache(mut self, cache: Arc<dyn FrontendCache>) -> Self {
        self.caches.push(cache);
        self
    }

    /// Process events until shutdown (then drain) or until every sender
    /// is gone.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> InvalidationStats {
        let mut stats = InvalidationStats::default();
        tracing::info!(caches = self.caches.len(), "Cache invalidation worker starting");

        loop {
            tokio::select! {
                change = self.rx.recv() => match change {
                    Some(change) => self.handle(&change, &mut stats),
                    None => break,
                },
                _ = shutdown.recv() => {
                    self.rx.close();
                    while let Some(change) = self.rx.recv().await {
                        self.handle(&change, &mut stats);
                    }
                    break;
                }
            }
        }

        tracing::info!(
            events = stats.events,
            failures = stats.failures,
            "Cache invalidation worker stopped"
        );
        stats
    }

    fn handle(&self, change: &FrontendChange, stats: &mut InvalidationStats) {
        stats.events += 1;
        stats.failures += self.invalidate_all(&change.name) as u64;
    }

    /// Clear `frontend` from every cache. Returns the number of failures.
    pub fn invalidate_all(&self, frontend: &FrontendName) -> usize {
        let mut failures = 0;
        for cache in &self.caches {
            let name = cache.cache_name();
            match catch_unwind(AssertUnwindSafe(|| cache.invalidate(frontend))) {
                Ok(Ok(())) => {
                    tracing::debug!(cache = name, frontend = %frontend, "Cache entries invalidated");
                    metrics::record_invalidation(name, "ok");
                }
                Ok(Err(e)) => {
                    failures += 1;
                    tracing::error!(cache = name, frontend = %frontend, error = %e, "Cache invalidation failed");
                    metrics::record_invalidation(name, "error");
                }
                Err(_) => {
                    failures += 1;
                    tracing::error!(cache = name, frontend = %frontend, "Cache invalidation panicked");
                    metrics::record_invalidation(name, "panic");
                }
            }
        }
        failures
    }
}

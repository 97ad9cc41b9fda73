//! Frontend registry.
//!
//! # Data Flow
//! ```text
//! admin API / config sync
//!     → add_or_update / remove (writers serialized by a mutex)
//!     → build new RegistrySnapshot from the current one
//!     → atomic swap (ArcSwap)
//!     → notify ChangeListeners (cache invalidation)
//!
//! request tasks
//!     → get_all() (lock-free load of the current snapshot)
//! ```
//!
//! # Design Decisions
//! - Copy-on-write: every write publishes a whole new snapshot, so readers
//!   see the old registry or the new one, never a mix
//! - Snapshots keep registration order; an update keeps the original
//!   position, which makes "first registered wins" tie-breaks stable
//! - A second default frontend is accepted but never active; the conflict
//!   is logged and counted, the write does not fail
//! - Injectable component, no process-wide singleton

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::frontend::{Frontend, FrontendName};
use crate::observability::metrics;

/// What happened to a frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Upserted,
    Removed,
}

/// Registry change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendChange {
    pub name: FrontendName,
    pub kind: ChangeKind,
}

/// Receives registry change notifications.
///
/// Called on the writer's task after the new snapshot is published.
/// Implementations must not block.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, change: &FrontendChange);
}

impl<F> ChangeListener for F
where
    F: Fn(&FrontendChange) + Send + Sync,
{
    fn on_change(&self, change: &FrontendChange) {
        self(change)
    }
}

/// Immutable view of every registered frontend, in registration order.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    frontends: Vec<Arc<Frontend>>,
    index: HashMap<FrontendName, usize>,
}

impl RegistrySnapshot {
    fn from_vec(frontends: Vec<Arc<Frontend>>) -> Self {
        let index = frontends
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().clone(), i))
            .collect();
        Self { frontends, index }
    }

    pub fn get(&self, name: &FrontendName) -> Option<&Arc<Frontend>> {
        self.index.get(name).map(|&i| &self.frontends[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Frontend>> {
        self.frontends.iter()
    }

    pub fn len(&self) -> usize {
        self.frontends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontends.is_empty()
    }

    /// The active default frontend: the first registered one without criteria.
    pub fn default_frontend(&self) -> Option<&Arc<Frontend>> {
        self.frontends.iter().find(|f| f.is_default())
    }
}

impl<'a> IntoIterator for &'a RegistrySnapshot {
    type Item = &'a Arc<Frontend>;
    type IntoIter = std::slice::Iter<'a, Arc<Frontend>>;

    fn into_iter(self) -> Self::IntoIter {
        self.frontends.iter()
    }
}

/// Result of [`FrontendRegistry::add_or_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// An entry with the same name existed and was replaced.
    pub replaced: bool,
    /// Set when the written frontend is a default but an earlier default
    /// stays active.
    pub shadowed_by: Option<FrontendName>,
}

struct RegistryInner {
    snapshot: ArcSwap<RegistrySnapshot>,
    write_lock: Mutex<()>,
    listeners: Mutex<Vec<Arc<dyn ChangeListener>>>,
}

/// Thread-safe, copy-on-write collection of frontends. Cheap to clone.
#[derive(Clone)]
pub struct FrontendRegistry {
    inner: Arc<RegistryInner>,
}

impl FrontendRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                snapshot: ArcSwap::from_pointee(RegistrySnapshot::default()),
                write_lock: Mutex::new(()),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self, listener: Arc<dyn ChangeListener>) {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Insert or replace the entry for `frontend.name()`.
    pub fn add_or_update(&self, frontend: impl Into<Arc<Frontend>>) -> UpsertOutcome {
        let frontend = frontend.into();
        let name = frontend.name().clone();

        let outcome = {
            let _guard = self.write_lock();
            let current = self.inner.snapshot.load_full();

            let mut frontends = current.frontends.clone();
            let replaced = match current.index.get(&name) {
                Some(&i) => {
                    frontends[i] = frontend.clone();
                    true
                }
                None => {
                    frontends.push(frontend.clone());
                    false
                }
            };

            let next = RegistrySnapshot::from_vec(frontends);
            let shadowed_by = if frontend.is_default() {
                next.default_frontend()
                    .map(|active| active.name().clone())
                    .filter(|active| *active != name)
            } else {
                None
            };
            let count = next.len();
            self.inner.snapshot.store(Arc::new(next));
            metrics::record_registry_size(count);

            UpsertOutcome { replaced, shadowed_by }
        };

        if let Some(active) = &outcome.shadowed_by {
            tracing::warn!(
                frontend = %name,
                active_default = %active,
                "Duplicate default frontend registered; the first registered default stays active"
            );
            metrics::record_default_conflict();
        }
        tracing::info!(frontend = %name, replaced = outcome.replaced, "Frontend registered");

        self.notify(FrontendChange {
            name,
            kind: ChangeKind::Upserted,
        });
        outcome
    }

    /// Remove the entry for `name`. Absent names are not an error.
    pub fn remove(&self, name: &FrontendName) -> Option<Arc<Frontend>> {
        let removed = self.remove_matching(name, |_| true);

        if removed.is_some() {
            tracing::info!(frontend = %name, "Frontend removed");
        } else {
            tracing::debug!(frontend = %name, "Remove requested for unknown frontend");
        }

        self.notify(FrontendChange {
            name: name.clone(),
            kind: ChangeKind::Removed,
        });
        removed
    }

    /// Remove the entry for `name` only if it is still `expected`.
    ///
    /// Returns `false` when the name is absent or has been replaced by a
    /// different instance since `expected` was written.
    pub fn remove_if_current(&self, name: &FrontendName, expected: &Arc<Frontend>) -> bool {
        let removed = self.remove_matching(name, |current| Arc::ptr_eq(current, expected));
        if removed.is_none() {
            return false;
        }

        tracing::info!(frontend = %name, "Frontend removed");
        self.notify(FrontendChange {
            name: name.clone(),
            kind: ChangeKind::Removed,
        });
        true
    }

    fn remove_matching(
        &self,
        name: &FrontendName,
        should_remove: impl FnOnce(&Arc<Frontend>) -> bool,
    ) -> Option<Arc<Frontend>> {
        let _guard = self.write_lock();
        let current = self.inner.snapshot.load_full();

        let &i = current.index.get(name)?;
        if !should_remove(&current.frontends[i]) {
            return None;
        }
        let mut frontends = current.frontends.clone();
        let removed = frontends.remove(i);
        let next = RegistrySnapshot::from_vec(frontends);
        let count = next.len();
        self.inner.snapshot.store(Arc::new(next));
        metrics::record_registry_size(count);
        Some(removed)
    }

    /// Current snapshot. Never blocks, never observes a partial write.
    pub fn get_all(&self) -> Arc<RegistrySnapshot> {
        self.inner.snapshot.load_full()
    }

    pub fn get(&self, name: &FrontendName) -> Option<Arc<Frontend>> {
        self.inner.snapshot.load().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.snapshot.load().is_empty()
    }

    fn write_lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, change: FrontendChange) {
        let listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.on_change(&change);
        }
    }
}

impl Default for FrontendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrontendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontendRegistry")
            .field("frontends", &self.len())
            .finish()
    }
}

impl FromIterator<Frontend> for FrontendRegistry {
    fn from_iter<I: IntoIterator<Item = Frontend>>(iter: I) -> Self {
        let registry = Self::new();
        for frontend in iter {
            registry.add_or_update(frontend);
        }
        registry
    }
}

//! Per-request frontend decision.
//!
//! Written once by the resolution middleware, read any number of times by
//! later stages. Reading before it was written is a pipeline-ordering bug
//! and fails with [`ContextError::NotResolved`] instead of pretending no
//! frontend was selected.

use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::frontend::Frontend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("frontend resolution has not run for this request")]
    NotResolved,

    #[error("frontend resolution already ran for this request")]
    AlreadyResolved,
}

/// The frontend selected for one request, or `None` for "no match".
#[derive(Debug, Clone, Default)]
pub struct RequestFrontendContext {
    selected: OnceLock<Option<Arc<Frontend>>>,
}

impl RequestFrontendContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that already holds a decision.
    pub fn resolved(selected: Option<Arc<Frontend>>) -> Self {
        let context = Self::new();
        let _ = context.selected.set(selected);
        context
    }

    /// Record the resolver's decision. Only the first call succeeds.
    pub fn set(&self, selected: Option<Arc<Frontend>>) -> Result<(), ContextError> {
        self.selected
            .set(selected)
            .map_err(|_| ContextError::AlreadyResolved)
    }

    pub fn is_resolved(&self) -> bool {
        self.selected.get().is_some()
    }

    /// The selected frontend; `Ok(None)` when nothing matched.
    pub fn selected(&self) -> Result<Option<&Arc<Frontend>>, ContextError> {
        self.selected
            .get()
            .map(Option::as_ref)
            .ok_or(ContextError::NotResolved)
    }
}

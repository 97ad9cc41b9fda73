//! Frontend lookup for a request.
//!
//! # Responsibilities
//! - Load the current registry snapshot
//! - Pick the single most specific matching frontend, or explicit no-match
//! - Warn when a frontend missed only because of path case
//!
//! # Design Decisions
//! - Pure computation over an immutable snapshot, no locks, no I/O
//! - O(n) scan in registration order; a strictly higher rank is required to
//!   replace the current best, so the first registered frontend wins ties
//! - The default frontend falls out of the ranking as the lowest tier

use std::sync::Arc;

use crate::frontend::Frontend;
use crate::observability::metrics;
use crate::registry::{FrontendRegistry, RegistrySnapshot};
use crate::routing::context::{ContextError, RequestFrontendContext};
use crate::routing::matcher::{matches_ignoring_path_case, Matcher, RequestTarget, Specificity};

/// Selects frontends for requests against a live registry.
#[derive(Debug, Clone)]
pub struct FrontendResolver {
    registry: FrontendRegistry,
}

impl FrontendResolver {
    pub fn new(registry: FrontendRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FrontendRegistry {
        &self.registry
    }

    /// Resolve against the current registry snapshot.
    pub fn resolve(&self, target: &RequestTarget) -> Option<Arc<Frontend>> {
        let snapshot = self.registry.get_all();
        let selected = select(&snapshot, target).cloned();

        if snapshot.is_empty() {
            tracing::debug!("No frontends registered");
            metrics::record_resolution("empty");
        } else if let Some(frontend) = &selected {
            metrics::record_resolution(if frontend.is_default() { "default" } else { "matched" });
        } else {
            tracing::debug!(
                host = %target.host,
                path = %target.path,
                "No frontend matched request"
            );
            metrics::record_resolution("none");
        }

        for near_miss in path_case_mismatches(&snapshot, target) {
            metrics::record_path_case_mismatch();
            tracing::warn!(
                frontend = %near_miss.name(),
                configured_path = near_miss.criteria().path().unwrap_or_default(),
                request_path = %target.path,
                selected = selected.as_ref().map(|f| f.name().as_str()).unwrap_or("<none>"),
                "Request path differs from a frontend path only by case; cookie paths are case-sensitive"
            );
        }

        selected
    }

    /// Resolve and record the decision in the request's context.
    pub fn resolve_into(
        &self,
        target: &RequestTarget,
        context: &RequestFrontendContext,
    ) -> Result<Option<Arc<Frontend>>, ContextError> {
        if context.is_resolved() {
            return Err(ContextError::AlreadyResolved);
        }
        let selected = self.resolve(target);
        context.set(selected.clone())?;
        Ok(selected)
    }
}

/// Most specific frontend in `snapshot` matching `target`.
pub fn select<'a>(snapshot: &'a RegistrySnapshot, target: &RequestTarget) -> Option<&'a Arc<Frontend>> {
    let mut best: Option<(Specificity, &Arc<Frontend>)> = None;

    for frontend in snapshot {
        let criteria = frontend.criteria();
        if !criteria.matches(target) {
            continue;
        }
        let rank = Specificity::of(criteria);
        match best {
            Some((best_rank, _)) if rank <= best_rank => {}
            _ => best = Some((rank, frontend)),
        }
    }

    best.map(|(_, frontend)| frontend)
}

/// Frontends that would have matched `target` had path case been ignored.
pub fn path_case_mismatches<'a>(
    snapshot: &'a RegistrySnapshot,
    target: &'a RequestTarget,
) -> impl Iterator<Item = &'a Arc<Frontend>> + 'a {
    snapshot
        .iter()
        .filter(move |f| matches_ignoring_path_case(f.criteria(), target))
}

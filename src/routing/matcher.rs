//! Frontend matching logic.
//!
//! # Responsibilities
//! - Describe the routing-relevant parts of a request (`RequestTarget`)
//! - Match host/scheme/port (case-insensitive) and path (case-sensitive)
//! - Rank matching criteria by specificity
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - Path matching is case-sensitive and segment-aligned
//! - Empty criteria = always matches (the default frontend)
//! - No regex to guarantee O(n) matching

use std::cmp::Ordering;

use crate::frontend::criteria::{path_has_prefix, path_has_prefix_ignore_case};
use crate::frontend::{HostMatch, SelectionCriteria};

/// Routing-relevant parts of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub scheme: String,
    pub host: String,
    /// Explicit port from the Host header, if any.
    pub port: Option<u16>,
    pub path: String,
}

impl RequestTarget {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        port: Option<u16>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
            path: path.into(),
        }
    }
}

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, target: &RequestTarget) -> bool;
}

impl Matcher for HostMatch {
    fn matches(&self, target: &RequestTarget) -> bool {
        HostMatch::matches(self, &target.scheme, &target.host, target.port)
    }
}

/// Both the host (if set) and the path (if set) must match.
impl Matcher for SelectionCriteria {
    fn matches(&self, target: &RequestTarget) -> bool {
        let host_ok = self.host().map_or(true, |h| Matcher::matches(h, target));
        let path_ok = self.path().map_or(true, |p| path_has_prefix(&target.path, p));
        host_ok && path_ok
    }
}

/// True when the criteria would match if path case were ignored, but do
/// not match as configured.
pub fn matches_ignoring_path_case(criteria: &SelectionCriteria, target: &RequestTarget) -> bool {
    let Some(path) = criteria.path() else {
        return false;
    };
    let host_ok = criteria.host().map_or(true, |h| Matcher::matches(h, target));
    host_ok && !path_has_prefix(&target.path, path) && path_has_prefix_ignore_case(&target.path, path)
}

/// Specificity tier, least specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Default,
    Path,
    Host,
    HostAndPath,
}

/// How specific a set of criteria is. Higher ranks win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Specificity {
    pub tier: Tier,
    /// Length of the configured path, 0 when there is none.
    pub path_len: usize,
}

impl Specificity {
    pub fn of(criteria: &SelectionCriteria) -> Self {
        let tier = match (criteria.host().is_some(), criteria.path().is_some()) {
            (true, true) => Tier::HostAndPath,
            (true, false) => Tier::Host,
            (false, true) => Tier::Path,
            (false, false) => Tier::Default,
        };
        Self {
            tier,
            path_len: criteria.path().map_or(0, str::len),
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then(self.path_len.cmp(&other.path_len))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

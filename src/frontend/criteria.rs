//! Selection criteria: which requests a frontend applies to.
//!
//! # Responsibilities
//! - `HostMatch`: scheme + host + port, compared case-insensitively
//! - `SelectionCriteria`: optional path prefix plus optional `HostMatch`
//!
//! # Design Decisions
//! - Host and scheme are normalized to lowercase once, at construction,
//!   so derived equality is the case-insensitive equality
//! - Paths keep their case; path matching is case-sensitive
//! - Paths match on segment boundaries: `/app` covers `/app` and `/app/x`,
//!   never `/application`

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::frontend::error::FrontendError;

/// Scheme, host and port a request must arrive on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HostMatch {
    scheme: String,
    host: String,
    port: u16,
}

impl HostMatch {
    pub fn new(scheme: impl AsRef<str>, host: impl AsRef<str>, port: u16) -> Self {
        Self {
            scheme: scheme.as_ref().to_ascii_lowercase(),
            host: host.as_ref().to_ascii_lowercase(),
            port,
        }
    }

    /// Build from an absolute URI such as `https://app.example.com:8443`.
    ///
    /// A missing port falls back to the scheme's well-known port.
    pub fn from_uri(uri: &str) -> Result<Self, FrontendError> {
        let invalid = |reason: &str| FrontendError::InvalidUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(uri).map_err(|e| invalid(&e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| invalid("URI has no host"))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| invalid("URI has no port and scheme has no default port"))?;

        Ok(Self::new(parsed.scheme(), host, port))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// True when the request arrived on this scheme and host, and either
    /// carried no explicit port or carried this one.
    pub fn matches(&self, scheme: &str, host: &str, port: Option<u16>) -> bool {
        self.host.eq_ignore_ascii_case(host)
            && self.scheme.eq_ignore_ascii_case(scheme)
            && port.map_or(true, |p| p == self.port)
    }
}

impl fmt::Display for HostMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Optional host and path constraints. Neither set means "default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SelectionCriteria {
    path: Option<String>,
    host: Option<HostMatch>,
}

impl SelectionCriteria {
    /// Criteria that match every request.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(path: Option<&str>, host: Option<HostMatch>) -> Result<Self, FrontendError> {
        Ok(Self {
            path: path.map(normalize_path).transpose()?.flatten(),
            host,
        })
    }

    pub fn for_path(path: &str) -> Result<Self, FrontendError> {
        Self::new(Some(path), None)
    }

    pub fn for_host(host: HostMatch) -> Self {
        Self {
            path: None,
            host: Some(host),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn host(&self) -> Option<&HostMatch> {
        self.host.as_ref()
    }

    /// False for the default (catch-all) criteria.
    pub fn has_value(&self) -> bool {
        self.path.is_some() || self.host.is_some()
    }

    pub(crate) fn with_path(mut self, path: Option<String>) -> Self {
        self.path = path;
        self
    }

    pub(crate) fn with_host(mut self, host: Option<HostMatch>) -> Self {
        self.host = host;
        self
    }
}

/// Validate a configured path. `Ok(None)` means "no path restriction".
pub(crate) fn normalize_path(raw: &str) -> Result<Option<String>, FrontendError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if raw.trim().is_empty() {
        return Err(FrontendError::BlankPath);
    }
    if !raw.starts_with('/') {
        return Err(FrontendError::PathMustStartWithSlash(raw.to_string()));
    }

    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(FrontendError::RootPath);
    }
    Ok(Some(trimmed.to_string()))
}

/// Case-sensitive, segment-aligned prefix test.
pub(crate) fn path_has_prefix(request_path: &str, prefix: &str) -> bool {
    match request_path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Same as [`path_has_prefix`] but ignoring ASCII case.
pub(crate) fn path_has_prefix_ignore_case(request_path: &str, prefix: &str) -> bool {
    let (head, rest) = match request_path.get(..prefix.len()) {
        Some(head) => (head, &request_path[prefix.len()..]),
        None => return false,
    };
    head.eq_ignore_ascii_case(prefix) && (rest.is_empty() || rest.starts_with('/'))
}

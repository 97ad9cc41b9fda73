//! The `Frontend` entity.
//!
//! A frontend is an immutable value. Updates go through the `with_*`
//! methods, which consume the value and hand back a new one; instances
//! shared across request tasks live behind `Arc` and are replaced wholesale
//! in the registry, never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::auth::{CookieCustomizer, CookieOptions, OidcCustomizer, OidcOptions};
use crate::frontend::criteria::{normalize_path, HostMatch, SelectionCriteria};
use crate::frontend::error::FrontendError;
use crate::frontend::name::FrontendName;

/// Prefix of the cookie authentication scheme derived from a frontend name.
pub const COOKIE_SCHEME_PREFIX: &str = "cookie_";

/// Prefix of the OIDC authentication scheme derived from a frontend name.
pub const OIDC_SCHEME_PREFIX: &str = "oidc_";

pub fn cookie_scheme_for(name: &FrontendName) -> String {
    format!("{COOKIE_SCHEME_PREFIX}{name}")
}

pub fn oidc_scheme_for(name: &FrontendName) -> String {
    format!("{OIDC_SCHEME_PREFIX}{name}")
}

/// Opaque plugin data carried by a frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendExtension {
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A logical web application served by the gateway.
#[derive(Clone)]
pub struct Frontend {
    name: FrontendName,
    criteria: SelectionCriteria,
    cookie_scheme: String,
    oidc_scheme: String,
    cookie_customizer: Option<CookieCustomizer>,
    oidc_customizer: Option<OidcCustomizer>,
    index_html_source: Option<Url>,
    static_assets_source: Option<Url>,
    extensions: Vec<FrontendExtension>,
}

impl Frontend {
    pub fn new(name: FrontendName) -> Self {
        Self {
            cookie_scheme: cookie_scheme_for(&name),
            oidc_scheme: oidc_scheme_for(&name),
            name,
            criteria: SelectionCriteria::any(),
            cookie_customizer: None,
            oidc_customizer: None,
            index_html_source: None,
            static_assets_source: None,
            extensions: Vec::new(),
        }
    }

    /// Validate `name` and build an unbound frontend.
    pub fn named(name: &str) -> Result<Self, FrontendError> {
        Ok(Self::new(FrontendName::parse(name)?))
    }

    pub fn name(&self) -> &FrontendName {
        &self.name
    }

    pub fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    pub fn cookie_scheme(&self) -> &str {
        &self.cookie_scheme
    }

    pub fn oidc_scheme(&self) -> &str {
        &self.oidc_scheme
    }

    pub fn cookie_customizer(&self) -> Option<&CookieCustomizer> {
        self.cookie_customizer.as_ref()
    }

    pub fn oidc_customizer(&self) -> Option<&OidcCustomizer> {
        self.oidc_customizer.as_ref()
    }

    pub fn index_html_source(&self) -> Option<&Url> {
        self.index_html_source.as_ref()
    }

    pub fn static_assets_source(&self) -> Option<&Url> {
        self.static_assets_source.as_ref()
    }

    pub fn extensions(&self) -> &[FrontendExtension] {
        &self.extensions
    }

    /// True when this frontend has no selection criteria.
    pub fn is_default(&self) -> bool {
        !self.criteria.has_value()
    }

    /// Bind selection criteria. Fails if criteria were already bound.
    pub fn with_selection_criteria(self, criteria: SelectionCriteria) -> Result<Self, FrontendError> {
        if self.criteria.has_value() {
            return Err(self.already_set("criteria"));
        }
        Ok(self.force_selection_criteria(criteria))
    }

    /// Replace whatever criteria are bound.
    pub fn force_selection_criteria(mut self, criteria: SelectionCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Restrict to requests arriving on the host in `uri`.
    pub fn with_host(self, uri: &str) -> Result<Self, FrontendError> {
        let host = HostMatch::from_uri(uri)?;
        self.with_host_match(host)
    }

    pub fn with_host_match(mut self, host: HostMatch) -> Result<Self, FrontendError> {
        if self.criteria.host().is_some() {
            return Err(self.already_set("host"));
        }
        self.criteria = self.criteria.with_host(Some(host));
        Ok(self)
    }

    /// Restrict to requests under `path`.
    pub fn with_path(mut self, path: &str) -> Result<Self, FrontendError> {
        if self.criteria.path().is_some() {
            return Err(self.already_set("path"));
        }
        let path = normalize_path(path)?;
        self.criteria = self.criteria.with_path(path);
        Ok(self)
    }

    pub fn with_cookie_customizer<F>(mut self, customize: F) -> Self
    where
        F: Fn(&mut CookieOptions) + Send + Sync + 'static,
    {
        self.cookie_customizer = Some(Arc::new(customize));
        self
    }

    pub fn with_oidc_customizer<F>(mut self, customize: F) -> Self
    where
        F: Fn(&mut OidcOptions) + Send + Sync + 'static,
    {
        self.oidc_customizer = Some(Arc::new(customize));
        self
    }

    pub fn with_index_html(mut self, uri: &str) -> Result<Self, FrontendError> {
        self.index_html_source = Some(parse_source("index_html", uri)?);
        Ok(self)
    }

    pub fn with_static_assets(mut self, uri: &str) -> Result<Self, FrontendError> {
        self.static_assets_source = Some(parse_source("static_assets", uri)?);
        Ok(self)
    }

    pub fn with_extension(mut self, extension: FrontendExtension) -> Self {
        self.extensions.push(extension);
        self
    }

    fn already_set(&self, component: &'static str) -> FrontendError {
        FrontendError::CriteriaAlreadySet {
            name: self.name.clone(),
            component,
        }
    }
}

fn parse_source(field: &'static str, uri: &str) -> Result<Url, FrontendError> {
    Url::parse(uri).map_err(|e| FrontendError::InvalidSourceUri {
        field,
        uri: uri.to_string(),
        reason: e.to_string(),
    })
}

/// Value equality over name, criteria, index page source and extensions.
/// Customization hooks are closures and take no part in it.
impl PartialEq for Frontend {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.criteria == other.criteria
            && self.index_html_source == other.index_html_source
            && self.extensions == other.extensions
    }
}

impl fmt::Debug for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frontend")
            .field("name", &self.name)
            .field("criteria", &self.criteria)
            .field("cookie_scheme", &self.cookie_scheme)
            .field("oidc_scheme", &self.oidc_scheme)
            .field("cookie_customizer", &self.cookie_customizer.is_some())
            .field("oidc_customizer", &self.oidc_customizer.is_some())
            .field("index_html_source", &self.index_html_source)
            .field("static_assets_source", &self.static_assets_source)
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Serializable view of a frontend for diagnostics and the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct FrontendSummary {
    pub name: FrontendName,
    pub host: Option<String>,
    pub path: Option<String>,
    pub is_default: bool,
    pub cookie_scheme: String,
    pub oidc_scheme: String,
    pub index_html: Option<String>,
    pub static_assets: Option<String>,
    pub extensions: Vec<FrontendExtension>,
}

impl From<&Frontend> for FrontendSummary {
    fn from(frontend: &Frontend) -> Self {
        Self {
            name: frontend.name.clone(),
            host: frontend.criteria.host().map(ToString::to_string),
            path: frontend.criteria.path().map(str::to_string),
            is_default: frontend.is_default(),
            cookie_scheme: frontend.cookie_scheme.clone(),
            oidc_scheme: frontend.oidc_scheme.clone(),
            index_html: frontend.index_html_source.as_ref().map(Url::to_string),
            static_assets: frontend.static_assets_source.as_ref().map(Url::to_string),
            extensions: frontend.extensions.clone(),
        }
    }
}

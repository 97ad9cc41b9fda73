//! Cookie handler options per frontend.
//!
//! # Order of application
//! 1. Global defaults (HTTP-only, secure same-as-request, SameSite=Strict)
//! 2. Frontend-scoped name and path
//! 3. The frontend's cookie customizer
//! 4. The global override hook
//!
//! Later stages win.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::frontend::Frontend;

/// Cookie name used when no frontend is selected.
pub const DEFAULT_COOKIE_NAME: &str = "__Host-bff-auth";

/// Prefix for host-scoped cookies (no path restriction, `Path=/`).
pub const HOST_COOKIE_PREFIX: &str = "__Host-bff-auth-";

/// Prefix for path-scoped cookies. `__Host-` requires `Path=/`, so these
/// use `__Secure-`.
pub const PATH_COOKIE_PREFIX: &str = "__Secure-bff-auth-";

/// Hook that adjusts cookie options.
pub type CookieCustomizer = Arc<dyn Fn(&mut CookieOptions) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurePolicy {
    SameAsRequest,
    Always,
    Never,
}

/// Options the cookie authentication handler runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    pub name: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub http_only: bool,
    pub secure: SecurePolicy,
    pub same_site: SameSite,
    pub max_age_secs: Option<u64>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        let mut options = Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: Some("/".to_string()),
            domain: None,
            http_only: false,
            secure: SecurePolicy::Never,
            same_site: SameSite::Lax,
            max_age_secs: None,
        };
        apply_global_defaults(&mut options);
        options
    }
}

/// Stage 1: the global baseline every cookie starts from.
pub fn apply_global_defaults(options: &mut CookieOptions) {
    options.http_only = true;
    options.secure = SecurePolicy::SameAsRequest;
    options.same_site = SameSite::Strict;
}

/// Apply every stage to `options` in place. Idempotent.
pub fn configure_cookie_options(
    frontend: Option<&Frontend>,
    global_override: Option<&CookieCustomizer>,
    options: &mut CookieOptions,
) {
    apply_global_defaults(options);

    match frontend {
        Some(frontend) => {
            match frontend.criteria().path() {
                Some(path) => {
                    options.name = format!("{PATH_COOKIE_PREFIX}{}", frontend.name());
                    options.path = Some(path.to_string());
                }
                None => {
                    options.name = format!("{HOST_COOKIE_PREFIX}{}", frontend.name());
                    options.path = Some("/".to_string());
                }
            }
            if let Some(customize) = frontend.cookie_customizer() {
                customize(options);
            }
        }
        None => {
            options.name = DEFAULT_COOKIE_NAME.to_string();
            options.path = Some("/".to_string());
        }
    }

    if let Some(customize) = global_override {
        customize(options);
    }
}

/// Pure form of [`configure_cookie_options`].
pub fn compute_cookie_options(
    frontend: Option<&Frontend>,
    base: &CookieOptions,
    global_override: Option<&CookieCustomizer>,
) -> CookieOptions {
    let mut options = base.clone();
    configure_cookie_options(frontend, global_override, &mut options);
    options
}

/// Cookie overrides from configuration. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub same_site: Option<SameSite>,
    pub secure: Option<SecurePolicy>,
    pub http_only: Option<bool>,
    pub domain: Option<String>,
    pub max_age_secs: Option<u64>,
}

impl CookieSettings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, options: &mut CookieOptions) {
        if let Some(same_site) = self.same_site {
            options.same_site = same_site;
        }
        if let Some(secure) = self.secure {
            options.secure = secure;
        }
        if let Some(http_only) = self.http_only {
            options.http_only = http_only;
        }
        if let Some(domain) = &self.domain {
            options.domain = Some(domain.clone());
        }
        if let Some(max_age) = self.max_age_secs {
            options.max_age_secs = Some(max_age);
        }
    }

    /// Turn into a hook, or `None` when nothing is overridden.
    pub fn into_customizer(self) -> Option<CookieCustomizer> {
        if self.is_empty() {
            return None;
        }
        Some(Arc::new(move |options: &mut CookieOptions| self.apply(options)))
    }
}

//! Glue between the per-request frontend decision and the authentication
//! handlers.
//!
//! The authentication layer asks for options by scheme name. The binder
//! owns `cookie_<name>` / `oidc_<name>` for the selected frontend and the
//! two fixed default schemes when nothing was selected; any other scheme
//! is left untouched.
//!
//! Computed options are memoised per scheme. Each entry remembers the
//! frontend instance it was computed from and is recomputed when the
//! registry has since replaced that frontend, so the invalidation queue
//! only reclaims memory and never gates correctness.

use dashmap::DashMap;
use std::sync::Arc;

use crate::auth::cookie::{configure_cookie_options, CookieCustomizer, CookieOptions, CookieSettings};
use crate::auth::oidc::{configure_oidc_options, OidcCustomizer, OidcOptions, OidcSettings};
use crate::auth::{DEFAULT_COOKIE_SCHEME, DEFAULT_OIDC_SCHEME};
use crate::cache::invalidation::{FrontendCache, InvalidationError};
use crate::frontend::model::{cookie_scheme_for, oidc_scheme_for};
use crate::frontend::{Frontend, FrontendName};
use crate::routing::{ContextError, RequestFrontendContext};

/// Process-wide hooks applied around every frontend's own hooks.
#[derive(Clone, Default)]
pub struct AuthDefaults {
    /// Runs after the frontend's cookie customizer.
    pub cookie_override: Option<CookieCustomizer>,
    /// Runs before any frontend-specific OIDC settings.
    pub oidc_defaults: Option<OidcCustomizer>,
}

impl AuthDefaults {
    pub fn from_settings(cookie: CookieSettings, oidc: OidcSettings) -> Self {
        Self {
            cookie_override: cookie.into_customizer(),
            oidc_defaults: oidc.into_customizer(),
        }
    }
}

struct Cached<T> {
    source: Option<Arc<Frontend>>,
    options: Arc<T>,
}

impl<T> Cached<T> {
    fn is_current(&self, selected: Option<&Arc<Frontend>>) -> bool {
        match (&self.source, selected) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Computes cookie and OIDC options for the frontend selected on a request.
#[derive(Default)]
pub struct AuthOptionsBinder {
    defaults: AuthDefaults,
    cookies: DashMap<String, Cached<CookieOptions>>,
    oidc: DashMap<String, Cached<OidcOptions>>,
}

impl AuthOptionsBinder {
    pub fn new(defaults: AuthDefaults) -> Self {
        Self {
            defaults,
            cookies: DashMap::new(),
            oidc: DashMap::new(),
        }
    }

    /// Configure `options` for `scheme` in place.
    ///
    /// Returns `Ok(false)` and leaves `options` alone when `scheme` does not
    /// belong to this request's frontend.
    pub fn configure_cookie(
        &self,
        scheme: &str,
        context: &RequestFrontendContext,
        options: &mut CookieOptions,
    ) -> Result<bool, ContextError> {
        let selected = context.selected()?;
        if cookie_scheme(selected) != scheme {
            return Ok(false);
        }
        configure_cookie_options(
            selected.map(Arc::as_ref),
            self.defaults.cookie_override.as_ref(),
            options,
        );
        Ok(true)
    }

    /// OIDC counterpart of [`configure_cookie`](Self::configure_cookie).
    pub fn configure_oidc(
        &self,
        scheme: &str,
        context: &RequestFrontendContext,
        options: &mut OidcOptions,
    ) -> Result<bool, ContextError> {
        let selected = context.selected()?;
        if oidc_scheme(selected) != scheme {
            return Ok(false);
        }
        configure_oidc_options(
            selected.map(Arc::as_ref),
            self.defaults.oidc_defaults.as_ref(),
            options,
        );
        Ok(true)
    }

    /// Cookie options for this request's frontend, memoised per scheme.
    pub fn cookie_options(&self, context: &RequestFrontendContext) -> Result<Arc<CookieOptions>, ContextError> {
        let selected = context.selected()?;
        let scheme = cookie_scheme(selected);

        if let Some(entry) = self.cookies.get(&scheme) {
            if entry.is_current(selected) {
                return Ok(entry.options.clone());
            }
        }

        let mut options = CookieOptions::default();
        configure_cookie_options(
            selected.map(Arc::as_ref),
            self.defaults.cookie_override.as_ref(),
            &mut options,
        );
        let options = Arc::new(options);
        self.cookies.insert(
            scheme,
            Cached {
                source: selected.cloned(),
                options: options.clone(),
            },
        );
        Ok(options)
    }

    /// OIDC options for this request's frontend, memoised per scheme.
    pub fn oidc_options(&self, context: &RequestFrontendContext) -> Result<Arc<OidcOptions>, ContextError> {
        let selected = context.selected()?;
        let scheme = oidc_scheme(selected);

        if let Some(entry) = self.oidc.get(&scheme) {
            if entry.is_current(selected) {
                return Ok(entry.options.clone());
            }
        }

        let mut options = OidcOptions::default();
        configure_oidc_options(
            selected.map(Arc::as_ref),
            self.defaults.oidc_defaults.as_ref(),
            &mut options,
        );
        let options = Arc::new(options);
        self.oidc.insert(
            scheme,
            Cached {
                source: selected.cloned(),
                options: options.clone(),
            },
        );
        Ok(options)
    }

    /// Number of memoised option sets, cookie and OIDC combined.
    pub fn cached_len(&self) -> usize {
        self.cookies.len() + self.oidc.len()
    }
}

fn cookie_scheme(selected: Option<&Arc<Frontend>>) -> String {
    selected.map_or_else(|| DEFAULT_COOKIE_SCHEME.to_string(), |f| f.cookie_scheme().to_string())
}

fn oidc_scheme(selected: Option<&Arc<Frontend>>) -> String {
    selected.map_or_else(|| DEFAULT_OIDC_SCHEME.to_string(), |f| f.oidc_scheme().to_string())
}

impl FrontendCache for AuthOptionsBinder {
    fn cache_name(&self) -> &'static str {
        "auth_options"
    }

    fn invalidate(&self, frontend: &FrontendName) -> Result<(), InvalidationError> {
        self.cookies.remove(&cookie_scheme_for(frontend));
        self.oidc.remove(&oidc_scheme_for(frontend));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cookie::SameSite;

    fn context_for(frontend: Option<Frontend>) -> RequestFrontendContext {
        RequestFrontendContext::resolved(frontend.map(Arc::new))
    }

    #[test]
    fn test_unresolved_context_fails_loudly() {
        let binder = AuthOptionsBinder::default();
        let context = RequestFrontendContext::new();
        let mut options = CookieOptions::default();

        assert_eq!(
            binder.configure_cookie("cookie", &context, &mut options),
            Err(ContextError::NotResolved)
        );
        assert!(binder.cookie_options(&context).is_err());
    }

    #[test]
    fn test_configure_only_owned_scheme() {
        let binder = AuthOptionsBinder::default();
        let context = context_for(Some(Frontend::named("shop").unwrap().with_path("/shop").unwrap()));

        let mut options = CookieOptions::default();
        assert!(!binder.configure_cookie("cookie_other", &context, &mut options).unwrap());
        assert_eq!(options, CookieOptions::default());

        assert!(binder.configure_cookie("cookie_shop", &context, &mut options).unwrap());
        assert_eq!(options.name, "__Secure-bff-auth-shop");

        let mut oidc = OidcOptions::default();
        assert!(binder.configure_oidc("oidc_shop", &context, &mut oidc).unwrap());
        assert_eq!(oidc.sign_in_scheme.as_deref(), Some("cookie_shop"));
    }

    #[test]
    fn test_default_schemes_without_frontend() {
        let binder = AuthOptionsBinder::default();
        let context = context_for(None);

        let mut options = CookieOptions::default();
        assert!(binder.configure_cookie(DEFAULT_COOKIE_SCHEME, &context, &mut options).unwrap());
        let mut oidc = OidcOptions::default();
        assert!(binder.configure_oidc(DEFAULT_OIDC_SCHEME, &context, &mut oidc).unwrap());
        assert!(!binder.configure_oidc("oidc_shop", &context, &mut oidc).unwrap());
    }

    #[test]
    fn test_global_override_applies_to_every_frontend() {
        let defaults = AuthDefaults::from_settings(
            CookieSettings {
                same_site: Some(SameSite::Lax),
                ..Default::default()
            },
            OidcSettings::default(),
        );
        let binder = AuthOptionsBinder::new(defaults);

        let a = binder.cookie_options(&context_for(Some(Frontend::named("a").unwrap()))).unwrap();
        let none = binder.cookie_options(&context_for(None)).unwrap();
        assert_eq!(a.same_site, SameSite::Lax);
        assert_eq!(none.same_site, SameSite::Lax);
    }

    #[test]
    fn test_options_memoised_per_frontend_instance() {
        let binder = AuthOptionsBinder::default();
        let frontend = Arc::new(Frontend::named("shop").unwrap().with_path("/shop").unwrap());
        let context = RequestFrontendContext::resolved(Some(frontend.clone()));

        let first = binder.cookie_options(&context).unwrap();
        let second = binder.cookie_options(&RequestFrontendContext::resolved(Some(frontend))).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // A replaced frontend instance is recomputed even before invalidation.
        let moved = Arc::new(Frontend::named("shop").unwrap().with_path("/store").unwrap());
        let third = binder.cookie_options(&RequestFrontendContext::resolved(Some(moved))).unwrap();
        assert_eq!(third.path.as_deref(), Some("/store"));
    }

    #[test]
    fn test_invalidate_evicts_both_schemes() {
        let binder = AuthOptionsBinder::default();
        let context = context_for(Some(Frontend::named("shop").unwrap()));
        binder.cookie_options(&context).unwrap();
        binder.oidc_options(&context).unwrap();
        assert_eq!(binder.cached_len(), 2);

        binder.invalidate(&FrontendName::parse("shop").unwrap()).unwrap();
        assert_eq!(binder.cached_len(), 0);
    }
}

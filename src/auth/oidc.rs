//! OIDC handler options per frontend.
//!
//! # Order of application
//! 1. Built-in defaults (code flow, PKCE, token saving)
//! 2. Global OIDC defaults (identity provider settings from configuration)
//! 3. With a frontend selected:
//!    - callback paths moved under the frontend path unless customized
//!    - sign-in and sign-out scheme linked to the frontend's cookie scheme
//!    - the frontend's OIDC customizer

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::DEFAULT_COOKIE_SCHEME;
use crate::frontend::Frontend;

pub const DEFAULT_CALLBACK_PATH: &str = "/signin-oidc";
pub const DEFAULT_SIGNED_OUT_CALLBACK_PATH: &str = "/signout-callback-oidc";

/// Hook that adjusts OIDC options.
pub type OidcCustomizer = Arc<dyn Fn(&mut OidcOptions) + Send + Sync>;

/// Options the OIDC handler runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcOptions {
    pub authority: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    pub response_type: String,
    pub use_pkce: bool,
    pub save_tokens: bool,
    pub callback_path: String,
    pub signed_out_callback_path: String,
    pub sign_in_scheme: Option<String>,
    pub sign_out_scheme: Option<String>,
}

impl Default for OidcOptions {
    fn default() -> Self {
        Self {
            authority: None,
            client_id: None,
            client_secret: None,
            scopes: vec!["openid".to_string(), "profile".to_string()],
            response_type: "code".to_string(),
            use_pkce: true,
            save_tokens: true,
            callback_path: DEFAULT_CALLBACK_PATH.to_string(),
            signed_out_callback_path: DEFAULT_SIGNED_OUT_CALLBACK_PATH.to_string(),
            sign_in_scheme: Some(DEFAULT_COOKIE_SCHEME.to_string()),
            sign_out_scheme: Some(DEFAULT_COOKIE_SCHEME.to_string()),
        }
    }
}

fn apply_builtin_defaults(options: &mut OidcOptions) {
    options.response_type = "code".to_string();
    options.use_pkce = true;
    options.save_tokens = true;
}

/// Apply every stage to `options` in place. Idempotent.
pub fn configure_oidc_options(
    frontend: Option<&Frontend>,
    global_defaults: Option<&OidcCustomizer>,
    options: &mut OidcOptions,
) {
    apply_builtin_defaults(options);
    if let Some(customize) = global_defaults {
        customize(options);
    }

    let Some(frontend) = frontend else {
        return;
    };

    if let Some(prefix) = frontend.criteria().path() {
        if options.callback_path == DEFAULT_CALLBACK_PATH {
            options.callback_path = format!("{prefix}{DEFAULT_CALLBACK_PATH}");
        }
        if options.signed_out_callback_path == DEFAULT_SIGNED_OUT_CALLBACK_PATH {
            options.signed_out_callback_path = format!("{prefix}{DEFAULT_SIGNED_OUT_CALLBACK_PATH}");
        }
    }

    options.sign_in_scheme = Some(frontend.cookie_scheme().to_string());
    options.sign_out_scheme = Some(frontend.cookie_scheme().to_string());

    if let Some(customize) = frontend.oidc_customizer() {
        customize(options);
    }
}

/// Pure form of [`configure_oidc_options`].
pub fn compute_oidc_options(
    frontend: Option<&Frontend>,
    base: &OidcOptions,
    global_defaults: Option<&OidcCustomizer>,
) -> OidcOptions {
    let mut options = base.clone();
    configure_oidc_options(frontend, global_defaults, &mut options);
    options
}

/// Identity provider settings from configuration. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcSettings {
    pub authority: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub callback_path: Option<String>,
    pub signed_out_callback_path: Option<String>,
}

impl OidcSettings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, options: &mut OidcOptions) {
        if let Some(authority) = &self.authority {
            options.authority = Some(authority.clone());
        }
        if let Some(client_id) = &self.client_id {
            options.client_id = Some(client_id.clone());
        }
        if let Some(secret) = &self.client_secret {
            options.client_secret = Some(secret.clone());
        }
        if let Some(scopes) = &self.scopes {
            options.scopes = scopes.clone();
        }
        if let Some(path) = &self.callback_path {
            options.callback_path = path.clone();
        }
        if let Some(path) = &self.signed_out_callback_path {
            options.signed_out_callback_path = path.clone();
        }
    }

    pub fn into_customizer(self) -> Option<OidcCustomizer> {
        if self.is_empty() {
            return None;
        }
        Some(Arc::new(move |options: &mut OidcOptions| self.apply(options)))
    }
}

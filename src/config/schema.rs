//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::{CookieSettings, OidcSettings};
use crate::frontend::{Frontend, FrontendError, FrontendExtension};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, request scheme).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Process-wide authentication defaults.
    pub auth: AuthConfig,

    /// Cache invalidation queue settings.
    pub invalidation: InvalidationConfig,

    /// Index page cache settings.
    pub index_html: IndexHtmlConfig,

    /// Frontends registered at startup.
    pub frontends: Vec<FrontendConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Scheme assumed for requests whose URI carries none.
    pub default_scheme: String,

    /// Take the request scheme from `X-Forwarded-Proto` when present.
    pub trust_forwarded_proto: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            default_scheme: "http".to_string(),
            trust_forwarded_proto: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin API under `/admin`.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    #[serde(skip_serializing)]
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
        }
    }
}

/// Global cookie overrides and OIDC defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Applied after every frontend's own cookie settings.
    pub cookie: CookieSettings,

    /// Identity provider defaults, applied before frontend settings.
    pub oidc: OidcSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InvalidationConfig {
    /// Capacity of the invalidation event queue.
    pub queue_capacity: usize,
}

impl Default for InvalidationConfig {
    fn default() -> Self {
        Self { queue_capacity: 1024 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IndexHtmlConfig {
    /// Timeout for loading an index page, in milliseconds.
    pub fetch_timeout_ms: u64,
}

impl IndexHtmlConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for IndexHtmlConfig {
    fn default() -> Self {
        Self { fetch_timeout_ms: 5000 }
    }
}

/// A `[[frontends]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FrontendConfig {
    /// Unique frontend name.
    pub name: String,

    #[serde(flatten)]
    pub definition: FrontendDefinition,
}

impl FrontendConfig {
    pub fn to_frontend(&self) -> Result<Frontend, FrontendError> {
        self.definition.to_frontend(&self.name)
    }
}

/// Everything about a frontend except its name. Also the admin API body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FrontendDefinition {
    /// Absolute URI whose scheme, host and port requests must arrive on.
    pub host: Option<String>,

    /// Path prefix requests must fall under.
    pub path: Option<String>,

    /// Index page source URI.
    pub index_html: Option<String>,

    /// Static asset source URI.
    pub static_assets: Option<String>,

    /// Cookie settings for this frontend.
    pub cookie: CookieSettings,

    /// Identity provider settings for this frontend.
    pub oidc: OidcSettings,

    /// Opaque plugin data.
    pub extensions: Vec<FrontendExtension>,
}

impl FrontendDefinition {
    /// Build and validate a frontend named `name`.
    pub fn to_frontend(&self, name: &str) -> Result<Frontend, FrontendError> {
        let mut frontend = Frontend::named(name)?;

        if let Some(host) = &self.host {
            frontend = frontend.with_host(host)?;
        }
        if let Some(path) = &self.path {
            frontend = frontend.with_path(path)?;
        }
        if let Some(uri) = &self.index_html {
            frontend = frontend.with_index_html(uri)?;
        }
        if let Some(uri) = &self.static_assets {
            frontend = frontend.with_static_assets(uri)?;
        }
        if let Some(customize) = self.cookie.clone().into_customizer() {
            frontend = frontend.with_cookie_customizer(move |options| customize(options));
        }
        if let Some(customize) = self.oidc.clone().into_customizer() {
            frontend = frontend.with_oidc_customizer(move |options| customize(options));
        }
        for extension in &self.extensions {
            frontend = frontend.with_extension(extension.clone());
        }

        Ok(frontend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{compute_cookie_options, compute_oidc_options, CookieOptions, OidcOptions, SameSite};

    const SAMPLE: &str = r#"
        [listener]
        bind_address = "127.0.0.1:9000"

        [auth.oidc]
        authority = "https://idp.example.com"
        client_id = "bff"

        [[frontends]]
        name = "shop"
        host = "https://shop.example.com"
        path = "/app"
        index_html = "https://cdn.example.com/shop/index.html"

        [frontends.cookie]
        same_site = "lax"

        [frontends.oidc]
        client_id = "shop-client"

        [[frontends]]
        name = "fallback"
    "#;

    #[test]
    fn test_parse_sample() {
        let config: GatewayConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.default_scheme, "http");
        assert_eq!(config.frontends.len(), 2);
        assert_eq!(config.frontends[0].definition.path.as_deref(), Some("/app"));
        assert_eq!(config.auth.oidc.client_id.as_deref(), Some("bff"));
        assert_eq!(config.invalidation.queue_capacity, 1024);
    }

    #[test]
    fn test_definition_builds_frontend() {
        let config: GatewayConfig = toml::from_str(SAMPLE).unwrap();
        let shop = config.frontends[0].to_frontend().unwrap();

        assert_eq!(shop.criteria().path(), Some("/app"));
        assert_eq!(shop.criteria().host().unwrap().host(), "shop.example.com");
        assert!(shop.index_html_source().is_some());

        let cookie = compute_cookie_options(Some(&shop), &CookieOptions::default(), None);
        assert_eq!(cookie.same_site, SameSite::Lax);

        let oidc = compute_oidc_options(Some(&shop), &OidcOptions::default(), None);
        assert_eq!(oidc.client_id.as_deref(), Some("shop-client"));

        let fallback = config.frontends[1].to_frontend().unwrap();
        assert!(fallback.is_default());
    }

    #[test]
    fn test_invalid_definition() {
        let definition = FrontendDefinition {
            path: Some("/".into()),
            ..Default::default()
        };
        assert_eq!(definition.to_frontend("x").unwrap_err(), FrontendError::RootPath);
        assert!(FrontendDefinition::default().to_frontend("bad name").is_err());
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Build every configured frontend to surface configuration errors at
//!   startup rather than on a request
//! - Detect duplicate frontend names
//! - Validate value ranges (addresses parse, capacities and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::frontend::FrontendError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("frontend #{index} ('{name}'): {error}")]
    Frontend {
        index: usize,
        name: String,
        error: FrontendError,
    },

    #[error("frontend name '{0}' is configured more than once")]
    DuplicateFrontend(String),

    #[error("invalid {field} address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.default_scheme must be http or https, got {0:?}")]
    InvalidScheme(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingApiKey,
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if !matches!(config.listener.default_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::InvalidScheme(config.listener.default_scheme.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.invalidation.queue_capacity == 0 {
        errors.push(ValidationError::Zero("invalidation.queue_capacity"));
    }
    if config.index_html.fetch_timeout_ms == 0 {
        errors.push(ValidationError::Zero("index_html.fetch_timeout_ms"));
    }
    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }

    let mut seen = HashSet::new();
    for (index, frontend) in config.frontends.iter().enumerate() {
        if let Err(error) = frontend.to_frontend() {
            errors.push(ValidationError::Frontend {
                index,
                name: frontend.name.clone(),
                error,
            });
        }
        if !seen.insert(frontend.name.as_str()) {
            errors.push(ValidationError::DuplicateFrontend(frontend.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

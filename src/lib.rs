//! Multi-tenant backend-for-frontend gateway core.
//!
//! One process serves several frontends. Each request is matched to at
//! most one frontend by host and path, and that decision drives which
//! cookie and OIDC settings apply and which index page is served.

pub mod admin;
pub mod auth;
pub mod cache;
pub mod config;
pub mod frontend;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use frontend::{Frontend, FrontendName, HostMatch, SelectionCriteria};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use registry::FrontendRegistry;
pub use routing::{FrontendResolver, RequestFrontendContext, RequestTarget};

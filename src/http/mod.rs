//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace/timeout/request-id layers)
//!     → middleware/frontend.rs (build RequestTarget, resolve frontend,
//!       store RequestFrontendContext)
//!     → handlers (index page, diagnostics, admin API)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::{X_FORWARDED_PROTO, X_REQUEST_ID};
pub use server::{build_router, AppState, GatewayServer, FRONTEND_INFO_PATH};

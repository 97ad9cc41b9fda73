//! Authentication option binding.
//!
//! # Data Flow
//! ```text
//! authentication layer asks options for scheme "cookie_<name>" / "oidc_<name>"
//!     → binder.rs (reads RequestFrontendContext)
//!     → cookie.rs / oidc.rs (defaults → frontend → global hooks)
//!     → options handed back to the handler
//! ```
//!
//! # Design Decisions
//! - Option computation is a plain function of (frontend, base options)
//! - Binders are idempotent; the authentication layer may call them again
//! - The OIDC scheme signs in/out through the same frontend's cookie scheme

pub mod binder;
pub mod cookie;
pub mod oidc;

pub use binder::{AuthDefaults, AuthOptionsBinder};
pub use cookie::{
    compute_cookie_options, CookieCustomizer, CookieOptions, CookieSettings, SameSite, SecurePolicy,
};
pub use oidc::{compute_oidc_options, OidcCustomizer, OidcOptions, OidcSettings};

/// Cookie scheme used when no frontend is selected.
pub const DEFAULT_COOKIE_SCHEME: &str = "cookie";

/// OIDC scheme used when no frontend is selected.
pub const DEFAULT_OIDC_SCHEME: &str = "oidc";

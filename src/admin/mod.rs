//! Runtime frontend management.
//!
//! Frontends added here live next to the configured ones and survive
//! config reloads; a config entry with the same name replaces them on the
//! next reload that changes it. Replacing a configured frontend here hands
//! it over: removing it from the config file later leaves it registered.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::get,
    Router,
};

use crate::http::server::AppState;
use self::auth::admin_auth_middleware;
use self::handlers::*;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/frontends", get(list_frontends))
        .route(
            "/admin/frontends/{name}",
            get(get_frontend).put(put_frontend).delete(delete_frontend),
        )
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

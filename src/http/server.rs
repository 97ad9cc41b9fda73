//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, frontend resolution)
//! - Serve the selected frontend's index page
//! - Expose the per-request frontend decision for diagnostics
//! - Mount the admin API when enabled
//! - Bind server to listener and drain on shutdown

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::auth::{AuthOptionsBinder, CookieOptions, OidcOptions};
use crate::cache::IndexHtmlCache;
use crate::config::{AdminConfig, ListenerConfig};
use crate::frontend::FrontendSummary;
use crate::http::middleware::resolve_frontend;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::registry::FrontendRegistry;
use crate::routing::{FrontendResolver, RequestFrontendContext};

/// Path of the diagnostics endpoint describing the request's frontend.
pub const FRONTEND_INFO_PATH: &str = "/_bff/frontend";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: FrontendResolver,
    pub binder: Arc<AuthOptionsBinder>,
    pub index_html: Arc<IndexHtmlCache>,
    pub listener: Arc<ListenerConfig>,
    pub admin: Arc<AdminConfig>,
}

impl AppState {
    pub fn registry(&self) -> &FrontendRegistry {
        self.resolver.registry()
    }
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    pub fn new(state: AppState, request_timeout: Duration) -> Self {
        Self {
            router: build_router(state, request_timeout),
        }
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let mut router = Router::new()
        .route(FRONTEND_INFO_PATH, get(describe_frontend))
        .fallback(serve_index)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_frontend));

    if state.admin.enabled {
        router = router.merge(admin::router(state.clone()));
    }

    router
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}

#[derive(Debug, Serialize)]
pub struct FrontendInfo {
    pub frontend: Option<FrontendSummary>,
    pub cookie: CookieOptions,
    pub oidc: OidcOptions,
}

async fn describe_frontend(
    State(state): State<AppState>,
    context: RequestFrontendContext,
) -> Result<Json<FrontendInfo>, (StatusCode, String)> {
    let internal = |e: crate::routing::ContextError| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string());

    let frontend = context.selected().map_err(internal)?.map(|f| FrontendSummary::from(f.as_ref()));
    let cookie = (*state.binder.cookie_options(&context).map_err(internal)?).clone();
    let oidc = (*state.binder.oidc_options(&context).map_err(internal)?).clone();

    Ok(Json(FrontendInfo { frontend, cookie, oidc }))
}

async fn serve_index(
    State(state): State<AppState>,
    context: RequestFrontendContext,
    request: axum::extract::Request,
) -> Response {
    let selected = match context.selected() {
        Ok(selected) => selected.cloned(),
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };
    let Some(frontend) = selected else {
        return (StatusCode::NOT_FOUND, "No frontend matched").into_response();
    };

    match state.index_html.get(&frontend).await {
        Ok(Some(page)) => Html(page.to_string()).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Frontend has no index page").into_response(),
        Err(e) => {
            tracing::error!(
                request_id = %request_id(request.headers()),
                frontend = %frontend.name(),
                error = %e,
                "Index page unavailable"
            );
            (StatusCode::BAD_GATEWAY, "Index page unavailable").into_response()
        }
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::FrontendDefinition;
use crate::frontend::{FrontendName, FrontendSummary};
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub frontends: usize,
    pub default_frontend: Option<FrontendName>,
    pub cached_auth_options: usize,
    pub cached_index_pages: usize,
}

#[derive(Serialize)]
pub struct UpsertResponse {
    pub frontend: FrontendSummary,
    pub replaced: bool,
    /// Set when another default frontend already takes precedence.
    pub shadowed_by: Option<FrontendName>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn bad_request(error: impl ToString) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody { error: error.to_string() }),
    )
        .into_response()
}

fn parse_name(raw: &str) -> Result<FrontendName, Response> {
    FrontendName::parse(raw).map_err(bad_request)
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let snapshot = state.registry().get_all();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        frontends: snapshot.len(),
        default_frontend: snapshot.default_frontend().map(|f| f.name().clone()),
        cached_auth_options: state.binder.cached_len(),
        cached_index_pages: state.index_html.len(),
    })
}

/// All frontends in registration order.
pub async fn list_frontends(State(state): State<AppState>) -> Json<Vec<FrontendSummary>> {
    let snapshot = state.registry().get_all();
    Json(snapshot.iter().map(|f| FrontendSummary::from(f.as_ref())).collect())
}

pub async fn get_frontend(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let name = match parse_name(&name) {
        Ok(name) => name,
        Err(response) => return response,
    };
    match state.registry().get(&name) {
        Some(frontend) => Json(FrontendSummary::from(frontend.as_ref())).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn put_frontend(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(definition): Json<FrontendDefinition>,
) -> Response {
    let frontend = match definition.to_frontend(&name) {
        Ok(frontend) => frontend,
        Err(e) => return bad_request(e),
    };
    let summary = FrontendSummary::from(&frontend);

    let outcome = state.registry().add_or_update(frontend);
    tracing::info!(
        frontend = %summary.name,
        replaced = outcome.replaced,
        "Frontend upserted via admin API"
    );

    let status = if outcome.replaced {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (
        status,
        Json(UpsertResponse {
            frontend: summary,
            replaced: outcome.replaced,
            shadowed_by: outcome.shadowed_by,
        }),
    )
        .into_response()
}

/// Idempotent: removing an unknown name still succeeds.
pub async fn delete_frontend(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let name = match parse_name(&name) {
        Ok(name) => name,
        Err(response) => return response,
    };
    if state.registry().remove(&name).is_some() {
        tracing::info!(frontend = %name, "Frontend removed via admin API");
    }
    StatusCode::NO_CONTENT.into_response()
}

//! Frontend resolution middleware.
//!
//! Runs once per request before any handler: builds the request target,
//! asks the resolver for a frontend and stores the decision as a
//! [`RequestFrontendContext`] request extension. Handlers take the context
//! as an extractor.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::routing::{RequestFrontendContext, RequestTarget};

pub async fn resolve_frontend(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let target = RequestTarget::from_request_parts(request.uri(), request.headers(), &state.listener);
    let context = RequestFrontendContext::new();

    match state.resolver.resolve_into(&target, &context) {
        Ok(selected) => {
            tracing::debug!(
                request_id = %request_id(request.headers()),
                host = %target.host,
                path = %target.path,
                frontend = selected.as_ref().map(|f| f.name().as_str()).unwrap_or("<none>"),
                "Frontend resolved"
            );
        }
        Err(e) => {
            tracing::error!(request_id = %request_id(request.headers()), error = %e, "Frontend resolution failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Frontend resolution failed").into_response();
        }
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Missing context means the handler is mounted outside the resolution
/// middleware.
impl<S> FromRequestParts<S> for RequestFrontendContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestFrontendContext>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!(path = %parts.uri.path(), "Handler ran without frontend resolution");
                (StatusCode::INTERNAL_SERVER_ERROR, "Frontend context missing")
            })
    }
}

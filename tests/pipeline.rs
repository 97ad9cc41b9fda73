//! Requests through the full router: resolution middleware, handlers and
//! the admin API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use bff_gateway::config::{FrontendDefinition, GatewayConfig};
use bff_gateway::http::build_router;
use bff_gateway::lifecycle::init_subsystems;

mod common;
use common::*;

const API_KEY: &str = "test-admin-key";

fn gateway(admin: bool) -> (Router, std::path::PathBuf) {
    let page = temp_file("bff-pipeline", "<html>shop</html>");

    let mut config = GatewayConfig::default();
    config.admin.enabled = admin;
    config.admin.api_key = API_KEY.to_string();
    config.frontends = vec![
        frontend_config(
            "shop",
            FrontendDefinition {
                host: Some("http://shop.test".into()),
                path: Some("/app".into()),
                index_html: Some(file_uri(&page)),
                ..Default::default()
            },
        ),
        frontend_config(
            "portal",
            FrontendDefinition {
                host: Some("http://portal.test".into()),
                ..Default::default()
            },
        ),
    ];

    let subsystems = init_subsystems(&config);
    (build_router(subsystems.state, Duration::from_secs(5)), page)
}

fn get(host: &str, path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("host", host)
        .body(Body::empty())
        .unwrap()
}

fn admin_request(method: &str, path: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header("host", "admin.test")
        .header("authorization", format!("Bearer {API_KEY}"));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn test_index_page_for_matched_frontend() {
    let (app, page) = gateway(false);

    let response = app.clone().oneshot(get("shop.test", "/app/orders/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "<html>shop</html>");

    // Host matches but path does not: no frontend, no index page.
    let response = app.oneshot(get("shop.test", "/other")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_file(&page).unwrap_or_default();
}

#[tokio::test]
async fn test_frontend_without_index_page() {
    let (app, page) = gateway(false);

    let response = app.oneshot(get("portal.test", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Frontend has no index page");

    std::fs::remove_file(&page).unwrap_or_default();
}

#[tokio::test]
async fn test_diagnostics_reflect_selected_frontend() {
    let (app, page) = gateway(false);

    let response = app.clone().oneshot(get("portal.test", "/_bff/frontend")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["frontend"]["name"], "portal");
    assert_eq!(json["frontend"]["cookie_scheme"], "cookie_portal");
    assert_eq!(json["cookie"]["name"], "__Host-bff-auth-portal");
    assert_eq!(json["cookie"]["path"], "/");

    // No match degrades to the default options rather than an error.
    let response = app.oneshot(get("unknown.test", "/_bff/frontend")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["frontend"].is_null());
    assert_eq!(json["cookie"]["name"], "__Host-bff-auth");

    std::fs::remove_file(&page).unwrap_or_default();
}

#[tokio::test]
async fn test_request_id_is_preserved() {
    let (app, page) = gateway(false);

    let request = Request::builder()
        .uri("/_bff/frontend")
        .header("host", "portal.test")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");

    std::fs::remove_file(&page).unwrap_or_default();
}

#[tokio::test]
async fn test_admin_disabled_by_default() {
    let (app, page) = gateway(false);

    let response = app.oneshot(admin_request("GET", "/admin/frontends", None)).await.unwrap();
    // Falls through to the index handler; admin.test matches no frontend.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_file(&page).unwrap_or_default();
}

#[tokio::test]
async fn test_admin_requires_api_key() {
    let (app, page) = gateway(true);

    let request = Request::builder()
        .uri("/admin/status")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(admin_request("GET", "/admin/status", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["frontends"], 2);
    assert!(json["default_frontend"].is_null());

    std::fs::remove_file(&page).unwrap_or_default();
}

#[tokio::test]
async fn test_admin_frontend_lifecycle() {
    let (app, page) = gateway(true);

    let response = app
        .clone()
        .oneshot(admin_request("PUT", "/admin/frontends/docs", Some(serde_json::json!({ "path": "/docs" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["frontend"]["path"], "/docs");
    assert_eq!(json["replaced"], false);

    // Visible to the very next request.
    let response = app.clone().oneshot(get("any.test", "/docs/intro")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Frontend has no index page");
    let response = app
        .clone()
        .oneshot(admin_request("GET", "/admin/frontends/docs", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/admin/frontends", None))
        .await
        .unwrap();
    let names: Vec<String> = body_json(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["shop", "portal", "docs"]);

    let response = app
        .clone()
        .oneshot(admin_request("PUT", "/admin/frontends/broken", Some(serde_json::json!({ "path": "/" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].as_str().unwrap().contains('/'));

    let response = app
        .clone()
        .oneshot(admin_request("DELETE", "/admin/frontends/docs", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(admin_request("DELETE", "/admin/frontends/docs", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(admin_request("GET", "/admin/frontends/docs", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_file(&page).unwrap_or_default();
}

#[tokio::test]
async fn test_second_default_reports_shadowing() {
    let (app, page) = gateway(true);

    for (name, expected) in [("first", Value::Null), ("second", Value::from("first"))] {
        let response = app
            .clone()
            .oneshot(admin_request(
                "PUT",
                &format!("/admin/frontends/{name}"),
                Some(serde_json::json!({})),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["shadowed_by"], expected);
    }

    let response = app.oneshot(get("unknown.test", "/_bff/frontend")).await.unwrap();
    assert_eq!(body_json(response).await["frontend"]["name"], "first");

    std::fs::remove_file(&page).unwrap_or_default();
}

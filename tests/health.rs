mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use sqlx::postgres::PgPoolOptions;
use chrono::{Duration, Utc};
use storefront_admin_api::{
    app::build_router,
    domain::assets::ObjectMetadata,
    routes::health::health_check,
    state::AppState,
    storage::{BlobStore, sign_object_path},
};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.service, "storefront-admin-api");
}

// The pool never connects; these requests are decided before any query.
fn offline_state(storage: &std::path::Path) -> AppState {
    let url = "postgres://postgres@127.0.0.1:1/unused";
    let pool = PgPoolOptions::new().connect_lazy(url).expect("lazy pool");
    AppState::new(pool, common::test_config(url, storage))
}

fn offline_app() -> axum::Router {
    let storage = std::env::temp_dir().join("storefront-admin-api-tests");
    build_router(offline_state(&storage))
}

async fn status_of(request: Request<Body>) -> StatusCode {
    offline_app().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn router_serves_health_and_json_404() {
    let ok = Request::get("/health").body(Body::empty()).unwrap();
    assert_eq!(status_of(ok).await, StatusCode::OK);

    let missing = Request::get("/nope").body(Body::empty()).unwrap();
    assert_eq!(status_of(missing).await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let role = Request::post("/api/admin/users/role")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"userId":"8f14e45f-ceea-467f-a8f5-6b7a1c1b2a3c","role":"admin"}"#,
        ))
        .unwrap();
    assert_eq!(status_of(role).await, StatusCode::UNAUTHORIZED);

    let status = Request::patch("/api/admin/orders/8f14e45f-ceea-467f-a8f5-6b7a1c1b2a3c/status")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"status":"paid"}"#))
        .unwrap();
    assert_eq!(status_of(status).await, StatusCode::UNAUTHORIZED);

    let cleanup = Request::post("/api/admin/storage/cleanup")
        .header("x-cron-secret", "wrong")
        .body(Body::empty())
        .unwrap();
    assert_eq!(status_of(cleanup).await, StatusCode::UNAUTHORIZED);

    let cart = Request::get("/api/cart").body(Body::empty()).unwrap();
    assert_eq!(status_of(cart).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_download_links_are_forbidden() {
    let request = Request::get("/api/storage/object?token=not-a-jwt")
        .body(Body::empty())
        .unwrap();
    assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn uploaded_html_is_served_as_an_attachment() {
    let dir = tempfile::tempdir().unwrap();
    let state = offline_state(dir.path());
    let metadata = ObjectMetadata::temporary(Utc::now(), Duration::minutes(5), Some("text/html".into()));
    state
        .storage
        .upload("temp/page", b"<script>alert(1)</script>".to_vec(), metadata)
        .await
        .unwrap();
    let (token, _) = sign_object_path("test-secret", "temp/page", Duration::minutes(5)).unwrap();

    let request = Request::get(format!("/api/storage/object?token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = build_router(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["content-type"], "text/html");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["content-disposition"], "attachment");
}

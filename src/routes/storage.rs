use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    dto::storage::{SignedObjectQuery, UploadResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::storage_service,
    state::AppState,
};

pub fn uploads_router() -> Router<AppState> {
    Router::new().route("/", post(upload))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/object", get(download))
}

#[utoipa::path(
    post,
    path = "/api/uploads",
    request_body(content = String, description = "Raw file bytes", content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Temporary object stored", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Empty body"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Storage"
)]
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ApiResponse<UploadResponse>>)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let resp = storage_service::upload_temporary(&state, &user, content_type, body.to_vec()).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/storage/object",
    params(
        ("token" = String, Query, description = "Signed object token")
    ),
    responses(
        (status = 200, description = "Object bytes, served as an attachment"),
        (status = 403, description = "Invalid or expired link"),
        (status = 404, description = "Object not found")
    ),
    tag = "Storage"
)]
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<SignedObjectQuery>,
) -> AppResult<Response> {
    let (bytes, content_type) = storage_service::download_signed(&state, &query.token).await?;
    Ok((download_headers(content_type), bytes).into_response())
}

/// Uploader-supplied types are never rendered inline on this origin.
fn download_headers(content_type: Option<String>) -> [(HeaderName, HeaderValue); 3] {
    let content_type = content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    [
        (header::CONTENT_TYPE, content_type),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::CONTENT_DISPOSITION, HeaderValue::from_static("attachment")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downloads_are_attachments_without_sniffing() {
        let headers = download_headers(Some("text/html".into()));
        assert_eq!(headers[0].1, "text/html");
        assert_eq!(headers[1], (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")));
        assert_eq!(headers[2].1, "attachment");

        let fallback = download_headers(Some("bad\nvalue".into()));
        assert_eq!(fallback[0].1, "application/octet-stream");
    }
}

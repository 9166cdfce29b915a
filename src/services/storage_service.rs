use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit_best_effort},
    domain::assets::{CleanupReport, ObjectMetadata, is_expired},
    dto::storage::UploadResponse,
    error::{AppError, AppResult},
    middleware::auth::{AccessContext, AuthUser},
    response::{ApiResponse, Meta},
    state::AppState,
    storage::{BlobStore, StorageError, TEMP_PREFIX, sign_object_path, verify_object_token},
};

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Store an upload under the temporary prefix and hand back a signed read link.
pub async fn upload_temporary(
    state: &AppState,
    user: &AuthUser,
    content_type: Option<String>,
    bytes: Vec<u8>,
) -> AppResult<ApiResponse<UploadResponse>> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Upload body is empty".into()));
    }

    let now = Utc::now();
    let path = format!("{}/{}", TEMP_PREFIX, Uuid::new_v4().simple());
    let metadata = ObjectMetadata::temporary(
        now,
        Duration::seconds(state.config.temp_upload_ttl_secs),
        content_type,
    );
    let size = bytes.len();
    state.storage.upload(&path, bytes, metadata).await?;

    let (token, expires_at) = sign_object_path(
        &state.config.jwt_secret,
        &path,
        Duration::seconds(state.config.signed_url_ttl_secs),
    )?;

    tracing::info!(user_id = %user.user_id, path = %path, size, "temporary upload stored");

    Ok(ApiResponse::success(
        "Uploaded",
        UploadResponse {
            signed_url: format!("/api/storage/object?token={token}"),
            path,
            expires_at,
        },
        Some(Meta::empty()),
    ))
}

/// Bytes and content type for the object a signed token points at.
pub async fn download_signed(
    state: &AppState,
    token: &str,
) -> AppResult<(Vec<u8>, Option<String>)> {
    let path = verify_object_token(&state.config.jwt_secret, token).map_err(|err| match err {
        StorageError::Signing(_) | StorageError::InvalidPath(_) => {
            AppError::Forbidden("invalid or expired link".into())
        }
        other => AppError::from(other),
    })?;
    let (bytes, metadata) = state.storage.download(&path).await?;
    Ok((bytes, metadata.and_then(|m| m.content_type)))
}

/// Delete every expired object under the temporary prefix.
pub async fn run_cleanup<S: BlobStore>(store: &S, now: DateTime<Utc>) -> AppResult<CleanupReport> {
    let objects = store.list(TEMP_PREFIX).await?;
    let expired: Vec<String> = objects
        .into_iter()
        .filter(|object| is_expired(object, now))
        .map(|object| object.path)
        .collect();

    if expired.is_empty() {
        return Ok(CleanupReport::from_results::<StorageError>(Vec::new()));
    }

    let results = store.delete_many(&expired).await;
    let report = CleanupReport::from_results(results);
    if let Some(errors) = &report.errors {
        tracing::warn!(failed = errors.len(), "some temporary objects could not be deleted");
    }
    Ok(report)
}

/// Scheduled jobs authenticate with the shared cron secret instead of a session.
pub fn cron_authorized(configured: Option<&str>, presented: Option<&str>) -> bool {
    matches!((configured, presented), (Some(expected), Some(given)) if expected == given)
}

pub async fn cleanup(
    state: &AppState,
    access: &AccessContext,
    cron_secret: Option<&str>,
) -> AppResult<ApiResponse<CleanupReport>> {
    if !cron_authorized(state.config.cron_secret.as_deref(), cron_secret) {
        access.require_admin()?;
    }

    let report = run_cleanup(&state.storage, Utc::now()).await?;
    tracing::info!(
        deleted = report.deleted,
        total = report.total,
        "temporary storage cleanup finished"
    );

    log_audit_best_effort(
        &state.pool,
        access.actor_id(),
        AuditAction::StorageCleanup,
        "storage",
        serde_json::json!({ "deleted": report.deleted, "total": report.total }),
    )
    .await;

    let message = if report.total == 0 {
        "No expired files"
    } else {
        "Cleanup finished"
    };
    Ok(ApiResponse::success(message, report, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalBlobStore;

    #[test]
    fn cron_secret_must_match_configured_value() {
        assert!(cron_authorized(Some("s3cret"), Some("s3cret")));
        assert!(!cron_authorized(Some("s3cret"), Some("guess")));
        assert!(!cron_authorized(Some("s3cret"), None));
        assert!(!cron_authorized(None, Some("anything")));
        assert!(!cron_authorized(None, None));
    }

    #[tokio::test]
    async fn cleanup_removes_only_expired_objects() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let now = Utc::now();

        let stale = ObjectMetadata::temporary(now - Duration::minutes(30), Duration::minutes(5), None);
        let fresh = ObjectMetadata::temporary(now, Duration::minutes(5), None);
        store.upload("temp/stale", b"a".to_vec(), stale).await.unwrap();
        store.upload("temp/fresh", b"b".to_vec(), fresh).await.unwrap();

        let report = run_cleanup(&store, now).await.unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.total, 1);
        assert_eq!(report.errors, None);

        let remaining = store.list(TEMP_PREFIX).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].path, "temp/fresh");
    }

    #[tokio::test]
    async fn empty_prefix_reports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let report = run_cleanup(&store, Utc::now()).await.unwrap();
        assert_eq!((report.deleted, report.total), (0, 0));
    }
}

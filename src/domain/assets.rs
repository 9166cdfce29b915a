use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Age after which an object without temporary metadata is considered stale.
pub const FALLBACK_MAX_AGE_MINUTES: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub is_temporary: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ObjectMetadata {
    pub fn temporary(now: DateTime<Utc>, ttl: Duration, content_type: Option<String>) -> Self {
        Self {
            is_temporary: true,
            expires_at: Some(now + ttl),
            content_type,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<ObjectMetadata>,
}

pub fn is_expired(object: &StoredObject, now: DateTime<Utc>) -> bool {
    match &object.metadata {
        Some(meta) if !meta.is_temporary => false,
        Some(ObjectMetadata {
            expires_at: Some(expires_at),
            ..
        }) => now > *expires_at,
        _ => now - object.created_at > Duration::minutes(FALLBACK_MAX_AGE_MINUTES),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CleanupReport {
    pub deleted: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl CleanupReport {
    /// Summarize per-path deletion outcomes; `total` counts every attempted path.
    pub fn from_results<E: std::fmt::Display>(results: Vec<(String, Result<(), E>)>) -> Self {
        let total = results.len();
        let errors: Vec<String> = results
            .iter()
            .filter_map(|(path, outcome)| outcome.as_ref().err().map(|e| format!("{path}: {e}")))
            .collect();
        Self {
            deleted: total - errors.len(),
            total,
            errors: (!errors.is_empty()).then_some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(created_at: DateTime<Utc>, metadata: Option<ObjectMetadata>) -> StoredObject {
        StoredObject {
            path: "temp/a.png".into(),
            created_at,
            metadata,
        }
    }

    #[test]
    fn explicit_expiry_is_compared_to_now() {
        let now = Utc::now();
        let mut meta = ObjectMetadata::temporary(now, Duration::minutes(5), None);

        meta.expires_at = Some(now - Duration::seconds(1));
        assert!(is_expired(&object(now, Some(meta.clone())), now));

        meta.expires_at = Some(now + Duration::seconds(1));
        assert!(!is_expired(&object(now - Duration::hours(1), Some(meta)), now));
    }

    #[test]
    fn fallback_age_without_metadata() {
        let now = Utc::now();
        assert!(is_expired(&object(now - Duration::minutes(11), None), now));
        assert!(!is_expired(&object(now - Duration::minutes(9), None), now));
    }

    #[test]
    fn permanent_objects_never_expire() {
        let now = Utc::now();
        let meta = ObjectMetadata {
            is_temporary: false,
            expires_at: Some(now - Duration::days(1)),
            content_type: None,
            created_at: now - Duration::days(2),
        };
        assert!(!is_expired(&object(now - Duration::days(2), Some(meta)), now));
    }

    #[test]
    fn report_counts_partial_failures() {
        let report = CleanupReport::from_results(vec![
            ("temp/a".to_string(), Ok(())),
            ("temp/b".to_string(), Err("permission denied")),
            ("temp/c".to_string(), Ok(())),
        ]);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.total, 3);
        assert_eq!(report.errors, Some(vec!["temp/b: permission denied".to_string()]));

        let clean = CleanupReport::from_results::<String>(vec![]);
        assert_eq!(clean.errors, None);
    }
}

use std::{
    collections::BTreeMap,
    sync::Mutex,
};

use chrono::{Duration, Utc};
use storefront_admin_api::{
    domain::assets::{ObjectMetadata, StoredObject},
    services::storage_service::run_cleanup,
    storage::{BlobStore, DeleteResults, StorageError},
};

/// In-memory store whose deletes fail for paths listed in `locked`.
#[derive(Default)]
struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    locked: Vec<String>,
}

impl MemoryStore {
    fn insert(&self, object: StoredObject) {
        self.objects.lock().unwrap().insert(object.path.clone(), object);
    }

    fn paths(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

impl BlobStore for MemoryStore {
    async fn upload(
        &self,
        path: &str,
        _bytes: Vec<u8>,
        metadata: ObjectMetadata,
    ) -> Result<(), StorageError> {
        self.insert(StoredObject {
            path: path.to_string(),
            created_at: metadata.created_at,
            metadata: Some(metadata),
        });
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let prefix = format!("{prefix}/");
        Ok(self
            .objects
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.path.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn download(&self, path: &str) -> Result<(Vec<u8>, Option<ObjectMetadata>), StorageError> {
        let objects = self.objects.lock().unwrap();
        let object = objects
            .get(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        Ok((Vec::new(), object.metadata.clone()))
    }

    async fn delete_many(&self, paths: &[String]) -> DeleteResults {
        let mut objects = self.objects.lock().unwrap();
        paths
            .iter()
            .map(|path| {
                let outcome = if self.locked.contains(path) {
                    Err(StorageError::Io(std::io::Error::other("permission denied")))
                } else {
                    objects
                        .remove(path)
                        .map(|_| ())
                        .ok_or_else(|| StorageError::NotFound(path.clone()))
                };
                (path.clone(), outcome)
            })
            .collect()
    }
}

fn object(path: &str, created_minutes_ago: i64, metadata: Option<ObjectMetadata>) -> StoredObject {
    StoredObject {
        path: path.to_string(),
        created_at: Utc::now() - Duration::minutes(created_minutes_ago),
        metadata,
    }
}

#[tokio::test]
async fn partial_failure_is_reported_per_object() {
    let now = Utc::now();
    let store = MemoryStore {
        locked: vec!["temp/b".to_string()],
        ..Default::default()
    };
    let expired = |minutes_ago: i64| {
        Some(ObjectMetadata::temporary(
            now - Duration::minutes(minutes_ago),
            Duration::minutes(5),
            None,
        ))
    };
    store.insert(object("temp/a", 20, expired(20)));
    store.insert(object("temp/b", 20, expired(20)));
    store.insert(object("temp/c", 30, None));
    store.insert(object("temp/fresh", 1, expired(1)));
    store.insert(object("products/kept", 600, None));

    let report = run_cleanup(&store, now).await.unwrap();

    assert_eq!(report.deleted, 2);
    assert_eq!(report.total, 3);
    let errors = report.errors.expect("one failure");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("temp/b: "));

    assert_eq!(store.paths(), vec!["products/kept", "temp/b", "temp/fresh"]);
}

#[tokio::test]
async fn nothing_expired_means_no_deletes() {
    let now = Utc::now();
    let store = MemoryStore::default();
    store
        .upload(
            "temp/new",
            b"x".to_vec(),
            ObjectMetadata::temporary(now, Duration::minutes(5), None),
        )
        .await
        .unwrap();

    let report = run_cleanup(&store, now).await.unwrap();
    assert_eq!((report.deleted, report.total), (0, 0));
    assert!(report.errors.is_none());
    assert_eq!(store.paths(), vec!["temp/new"]);
}

#[tokio::test]
async fn permanent_objects_under_temp_survive() {
    let now = Utc::now();
    let store = MemoryStore::default();
    store.insert(object(
        "temp/pinned",
        120,
        Some(ObjectMetadata {
            is_temporary: false,
            expires_at: None,
            content_type: Some("image/png".into()),
            created_at: now - Duration::hours(2),
        }),
    ));

    let report = run_cleanup(&store, now).await.unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(store.paths(), vec!["temp/pinned"]);
}

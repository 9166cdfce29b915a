use std::{
    future::Future,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::domain::assets::{ObjectMetadata, StoredObject};

pub const TEMP_PREFIX: &str = "temp";
const META_SUFFIX: &str = ".meta.json";
const OBJECT_TOKEN_PURPOSE: &str = "object";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object path '{0}'")]
    InvalidPath(String),
    #[error("object '{0}' not found")]
    NotFound(String),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata failure: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("signing failure: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

pub type DeleteResults = Vec<(String, Result<(), StorageError>)>;

/// Object storage used for uploads and cleanup.
pub trait BlobStore: Send + Sync {
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        metadata: ObjectMetadata,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Objects directly under `prefix`, with whatever metadata they carry.
    fn list(&self, prefix: &str) -> impl Future<Output = Result<Vec<StoredObject>, StorageError>> + Send;

    fn download(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<(Vec<u8>, Option<ObjectMetadata>), StorageError>> + Send;

    /// Deletes every path, reporting each outcome instead of stopping at the first failure.
    fn delete_many(&self, paths: &[String]) -> impl Future<Output = DeleteResults> + Send;
}

/// Filesystem-backed store; metadata lives in a JSON sidecar next to each object.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: Arc<PathBuf>,
}

impl LocalBlobStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Arc::new(root.as_ref().to_path_buf()),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean || path.ends_with(META_SUFFIX) {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    async fn read_metadata(file: &Path) -> Result<Option<ObjectMetadata>, StorageError> {
        match fs::read(sidecar_path(file)).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_one(&self, path: &str) -> Result<(), StorageError> {
        let file = self.resolve(path)?;
        match fs::remove_file(&file).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        match fs::remove_file(sidecar_path(&file)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

fn sidecar_path(file: &Path) -> PathBuf {
    let mut name = file.file_name().unwrap_or_default().to_os_string();
    name.push(META_SUFFIX);
    file.with_file_name(name)
}

impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        metadata: ObjectMetadata,
    ) -> Result<(), StorageError> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&file, bytes).await?;
        fs::write(sidecar_path(&file), serde_json::to_vec(&metadata)?).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let dir = self.resolve(prefix)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(META_SUFFIX) || !entry.file_type().await?.is_file() {
                continue;
            }
            let metadata = match Self::read_metadata(&file).await {
                Ok(meta) => meta,
                Err(err) => {
                    tracing::warn!(path = %file.display(), error = %err, "unreadable object metadata");
                    None
                }
            };
            let created_at = match &metadata {
                Some(meta) => meta.created_at,
                None => DateTime::<Utc>::from(entry.metadata().await?.modified()?),
            };
            objects.push(StoredObject {
                path: format!("{}/{}", prefix.trim_end_matches('/'), name),
                created_at,
                metadata,
            });
        }
        objects.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(objects)
    }

    async fn download(&self, path: &str) -> Result<(Vec<u8>, Option<ObjectMetadata>), StorageError> {
        let file = self.resolve(path)?;
        let bytes = match fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let metadata = Self::read_metadata(&file).await?;
        Ok((bytes, metadata))
    }

    async fn delete_many(&self, paths: &[String]) -> DeleteResults {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let outcome = self.delete_one(path).await;
            results.push((path.clone(), outcome));
        }
        results
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectClaims {
    sub: String,
    purpose: String,
    exp: usize,
}

/// Issue a short-lived token granting read access to one object.
pub fn sign_object_path(
    secret: &str,
    path: &str,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>), StorageError> {
    let expires_at = Utc::now() + ttl;
    let claims = ObjectClaims {
        sub: path.to_string(),
        purpose: OBJECT_TOKEN_PURPOSE.to_string(),
        exp: expires_at.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, expires_at))
}

/// Returns the object path a signed token grants access to.
pub fn verify_object_token(secret: &str, token: &str) -> Result<String, StorageError> {
    let decoded = decode::<ObjectClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    if decoded.claims.purpose != OBJECT_TOKEN_PURPOSE {
        return Err(StorageError::InvalidPath(decoded.claims.sub));
    }
    Ok(decoded.claims.sub)
}

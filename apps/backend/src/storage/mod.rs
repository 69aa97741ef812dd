//! Object storage on top of the `object_store` crate (S3-compatible).

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use time::OffsetDateTime;
use tracing::{debug, warn};
use url::Url;

use crate::config::backends::ObjectStoreConfig;
use crate::error::AppError;
use crate::infra::bounded;

/// Handle to a bucket.
#[derive(Clone)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Stored object summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub name: String,
    pub size: u64,
    pub last_modified_unix: i64,
}

impl ObjectStorage {
    /// Build an S3 client for a configured endpoint.
    ///
    /// Fails when the configuration is present but unusable (bad endpoint URL,
    /// empty bucket, credential provider rejected by the builder).
    pub fn connect(config: &ObjectStoreConfig) -> Result<Self, AppError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AppError::config(format!("S3_URL '{}' is invalid: {e}", config.endpoint)))?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().is_none() {
            return Err(AppError::config(format!(
                "S3_URL '{}' must be an http(s) URL with a host",
                config.endpoint
            )));
        }
        if config.bucket.trim().is_empty() {
            return Err(AppError::config("object store bucket name is empty"));
        }

        let store = object_store::aws::AmazonS3Builder::new()
            .with_endpoint(config.endpoint.clone())
            .with_allow_http(endpoint.scheme() == "http")
            .with_region(config.region.clone())
            .with_bucket_name(config.bucket.clone())
            .with_access_key_id(config.access_key_id.clone())
            .with_secret_access_key(config.secret_access_key.clone())
            .build()
            .map_err(|e| AppError::config(format!("Failed to create S3 store: {e}")))?;

        Ok(Self::from_store(Arc::new(store), config.bucket.clone()))
    }

    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Process-local store, for tests and local development.
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemory::new()), "memory")
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn put_file(&self, name: &str, data: Bytes) -> Result<(), AppError> {
        let path = ObjectPath::from(name);
        bounded("object put", async {
            self.store
                .put(&path, PutPayload::from(data))
                .await
                .map(|_| ())
                .map_err(|e| AppError::upstream("object_store", e.to_string()))
        })
        .await
    }

    /// Delete one object. Deleting a missing object succeeds.
    pub async fn delete_file(&self, name: &str) -> Result<(), AppError> {
        let path = ObjectPath::from(name);
        let result = bounded("object delete", async {
            match self.store.delete(&path).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
                Err(e) => Err(AppError::upstream("object_store", e.to_string())),
            }
        })
        .await;

        match &result {
            Ok(()) => debug!(bucket = %self.bucket, file = name, "object deleted"),
            Err(e) => warn!(bucket = %self.bucket, file = name, error = %e, "Failed to delete file"),
        }
        result
    }

    pub async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, AppError> {
        let prefix = ObjectPath::from(prefix);
        bounded("object list", async {
            let metas: Vec<_> = self
                .store
                .list(Some(&prefix))
                .try_collect()
                .await
                .map_err(|e| AppError::upstream("object_store", e.to_string()))?;
            Ok(metas
                .into_iter()
                .map(|meta| StoredObject {
                    name: meta.location.to_string(),
                    size: meta.size as u64,
                    last_modified_unix: meta.last_modified.timestamp(),
                })
                .collect())
        })
        .await
    }

    /// Objects under `prefix` last modified strictly before `cutoff`.
    pub async fn list_older_than(
        &self,
        prefix: &str,
        cutoff: OffsetDateTime,
    ) -> Result<Vec<StoredObject>, AppError> {
        let cutoff = cutoff.unix_timestamp();
        Ok(self
            .list(prefix)
            .await?
            .into_iter()
            .filter(|object| object.last_modified_unix < cutoff)
            .collect())
    }
}

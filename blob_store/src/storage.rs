//! High-level blob storage scoped to one configured container.

use std::sync::Arc;

use bytes::Bytes;
use sha2::{Digest, Sha256};

use crate::{
    backends::{local::LocalBlobStore, s3::S3BlobStore},
    presign::SIGNED_URL_TTL,
    BlobError, BlobResult, BlobStorageConfig, BlobStore,
};

/// Result of a PUT operation.
#[derive(Debug, Clone)]
pub struct PutResult {
    /// The URI where the blob was stored.
    pub url: String,

    /// Size in bytes.
    pub size_bytes: u64,

    /// SHA256 hash of the data.
    pub sha256_hash: String,
}

/// Blob storage handle for the configured container.
///
/// Keys are object names within the container; full URIs are built from the
/// configured base path and handed to the scheme-matched backend.
#[derive(Clone)]
pub struct BlobStorage {
    store: Arc<dyn BlobStore>,
    base_url: String,
}

impl BlobStorage {
    /// Create blob storage from configuration, picking the backend by URI
    /// scheme (`file://` or `s3://`).
    pub async fn new(config: BlobStorageConfig) -> BlobResult<Self> {
        let scheme = Self::extract_scheme(&config.path)?;
        let store: Arc<dyn BlobStore> = match scheme.as_str() {
            "file" => Arc::new(LocalBlobStore::new()),
            "s3" => Arc::new(S3BlobStore::new(&config.path, config.region.clone()).await?),
            scheme => {
                return Err(BlobError::UnsupportedBackend {
                    scheme: scheme.to_string(),
                })
            }
        };

        Ok(Self {
            store,
            base_url: config.path.trim_end_matches('/').to_string(),
        })
    }

    /// Extract URI scheme (e.g., "s3", "file").
    fn extract_scheme(uri: &str) -> BlobResult<String> {
        let parts: Vec<&str> = uri.splitn(2, "://").collect();
        if parts.len() != 2 {
            return Err(BlobError::InvalidUri {
                uri: uri.to_string(),
                reason: "Missing scheme (expected format: scheme://...)".to_string(),
            });
        }
        Ok(parts[0].to_string())
    }

    /// Base URI of the configured container.
    pub fn get_url(&self) -> String {
        self.base_url.clone()
    }

    fn uri_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Upload `data` under `key`, overwriting any existing object of the
    /// same name. Computes the SHA256 hash alongside the write.
    pub async fn put(&self, key: &str, data: Bytes) -> BlobResult<PutResult> {
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let size_bytes = data.len() as u64;

        let uri = self.uri_for(key);
        self.store.upload(&uri, data.to_vec()).await?;

        let hash = format!("{:x}", hasher.finalize());
        Ok(PutResult {
            url: uri,
            size_bytes,
            sha256_hash: hash,
        })
    }

    /// Download the object stored under `key`.
    pub async fn get(&self, key: &str) -> BlobResult<Vec<u8>> {
        self.store.get(&self.uri_for(key)).await
    }

    /// Delete the object stored under `key`. Missing objects are reported
    /// as failures, never silently ignored.
    pub async fn delete(&self, key: &str) -> BlobResult<()> {
        self.store.delete(&self.uri_for(key)).await
    }

    /// Mint a signed access URL for `key`, valid for one hour from now.
    /// The object does not have to exist yet.
    pub async fn presign(&self, key: &str) -> BlobResult<String> {
        self.store
            .presign_get_uri(&self.uri_for(key), SIGNED_URL_TTL)
            .await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn local_storage(temp_dir: &TempDir) -> BlobStorage {
        let config = BlobStorageConfig {
            path: format!("file://{}", temp_dir.path().display()),
            region: None,
        };
        BlobStorage::new(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_storage_put_get() {
        let temp_dir = TempDir::new().unwrap();
        let storage = local_storage(&temp_dir).await;

        let result = storage.put("test.txt", Bytes::from("hello world")).await.unwrap();
        assert_eq!(result.size_bytes, 11);
        assert!(!result.sha256_hash.is_empty());
        assert!(result.url.ends_with("/test.txt"));

        let downloaded = storage.get("test.txt").await.unwrap();
        assert_eq!(downloaded, b"hello world");
    }

    #[tokio::test]
    async fn test_storage_delete_missing_fails() {
        let temp_dir = TempDir::new().unwrap();
        let storage = local_storage(&temp_dir).await;

        let result = storage.delete("never-uploaded.txt").await;
        assert!(matches!(result, Err(BlobError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_storage_presign_without_object() {
        let temp_dir = TempDir::new().unwrap();
        let storage = local_storage(&temp_dir).await;

        let url = storage.presign("pending.bin").await.unwrap();
        assert!(url.contains("pending.bin"));
    }

    #[tokio::test]
    async fn test_storage_unsupported_scheme() {
        let config = BlobStorageConfig {
            path: "gs://bucket/prefix".to_string(),
            region: None,
        };
        let result = BlobStorage::new(config).await;
        assert!(matches!(
            result,
            Err(BlobError::UnsupportedBackend { .. })
        ));
    }
}

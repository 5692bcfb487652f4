//! Local filesystem blob store backend.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;

use crate::{BlobError, BlobResult, BlobStore};

/// Local filesystem blob store.
pub struct LocalBlobStore;

impl LocalBlobStore {
    /// Create a new local filesystem blob store.
    pub fn new() -> Self {
        Self
    }

    /// Extract filesystem path from file:// URI.
    fn path_from_uri(uri: &str) -> BlobResult<PathBuf> {
        if !uri.starts_with("file://") {
            return Err(BlobError::InvalidUri {
                uri: uri.to_string(),
                reason: "URI must start with file://".to_string(),
            });
        }
        let path_str = uri.strip_prefix("file://").unwrap();
        Ok(PathBuf::from(path_str))
    }

    fn map_io_error(uri: &str, e: std::io::Error) -> BlobError {
        if e.kind() == std::io::ErrorKind::NotFound {
            BlobError::NotFound {
                uri: uri.to_string(),
            }
        } else {
            BlobError::IoError { source: e }
        }
    }
}

impl Default for LocalBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn get(&self, uri: &str) -> BlobResult<Vec<u8>> {
        let path = Self::path_from_uri(uri)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| Self::map_io_error(uri, e))
    }

    async fn upload(&self, uri: &str, data: Vec<u8>) -> BlobResult<()> {
        let path = Self::path_from_uri(uri)?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn delete(&self, uri: &str) -> BlobResult<()> {
        let path = Self::path_from_uri(uri)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| Self::map_io_error(uri, e))
    }

    async fn presign_get_uri(&self, uri: &str, _expires_in: Duration) -> BlobResult<String> {
        // For local files, the URI itself is sufficient (shared filesystem
        // assumption). Validate the URI format only.
        Self::path_from_uri(uri)?;
        Ok(uri.to_string())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_local_upload_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        let uri = format!("file://{}", file_path.display());

        let store = LocalBlobStore::new();
        let data = b"hello world".to_vec();

        store.upload(&uri, data.clone()).await.unwrap();

        let retrieved = store.get(&uri).await.unwrap();
        assert_eq!(retrieved, data);
    }

    #[tokio::test]
    async fn test_local_overwrite_is_silent() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        let uri = format!("file://{}", file_path.display());

        let store = LocalBlobStore::new();
        store.upload(&uri, b"first".to_vec()).await.unwrap();
        store.upload(&uri, b"second".to_vec()).await.unwrap();

        assert_eq!(store.get(&uri).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_local_delete() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        let uri = format!("file://{}", file_path.display());

        let store = LocalBlobStore::new();
        store.upload(&uri, b"bye".to_vec()).await.unwrap();
        store.delete(&uri).await.unwrap();

        let result = store.get(&uri).await;
        assert!(matches!(result, Err(BlobError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_local_delete_missing_is_error() {
        let uri = "file:///nonexistent/file.txt";
        let store = LocalBlobStore::new();

        let result = store.delete(uri).await;
        assert!(matches!(result, Err(BlobError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_local_presign_before_upload() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("later.txt");
        let uri = format!("file://{}", file_path.display());

        let store = LocalBlobStore::new();
        let signed = store
            .presign_get_uri(&uri, Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(signed, uri);
    }
}

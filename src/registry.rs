//! Orchestration core: sequences the blob store and the metadata store for
//! upload, list, and delete.
//!
//! The two stores are not transactionally linked. Each operation defines an
//! ordering and a failure policy instead: a step that fails stops the
//! operation, and side effects of earlier steps are reported but never
//! rolled back across stores.

use std::sync::Arc;

use blob_store::{BlobError, BlobStorage};
use bytes::Bytes;
use metadata_store::{FileRecord, MetadataStore};
use thiserror::Error;
use tracing::{info, warn};

/// Per-operation failure categories, distinguishing input problems from
/// failures in either backing store.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("required input missing")]
    MissingInput,

    #[error("blob store failure: {0}")]
    BlobStore(#[from] BlobError),

    #[error("metadata store failure: {0}")]
    MetadataStore(#[from] sqlx::Error),
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Signed access URL, valid for one hour from mint time.
    pub url: String,
    /// The persisted record, including its store-assigned id.
    pub record: FileRecord,
}

/// The upload registry: one blob container plus one `files` table, with
/// both handles injected at construction.
#[derive(Clone)]
pub struct FileRegistry {
    blob_storage: Arc<BlobStorage>,
    metadata: MetadataStore,
}

impl FileRegistry {
    pub fn new(blob_storage: Arc<BlobStorage>, metadata: MetadataStore) -> Self {
        Self {
            blob_storage,
            metadata,
        }
    }

    /// Upload `content` under `filename`: mint the signed URL, write the
    /// blob (overwriting any existing object of the same name), then insert
    /// the record.
    ///
    /// If the mint or the write fails, no database write is attempted. If
    /// the insert fails, the blob write has already happened and is not
    /// rolled back; the caller sees a metadata-store failure.
    pub async fn upload(
        &self,
        filename: &str,
        content: Bytes,
    ) -> Result<UploadOutcome, RegistryError> {
        if filename.is_empty() {
            return Err(RegistryError::MissingInput);
        }

        let url = self.blob_storage.presign(filename).await?;
        let put_result = self.blob_storage.put(filename, content).await?;
        info!(
            filename,
            size_bytes = put_result.size_bytes,
            "stored blob"
        );

        let record = self.metadata.insert_file(filename, &url).await.map_err(|e| {
            warn!(filename, "blob stored but record insert failed: {e}");
            e
        })?;

        Ok(UploadOutcome { url, record })
    }

    /// Return all file records verbatim, in store order. Never partial: a
    /// read failure surfaces as an error with no rows.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>, RegistryError> {
        Ok(self.metadata.list_files().await?)
    }

    /// Delete the blob named `filename`, then every matching record.
    ///
    /// A missing blob is a failure and leaves the record(s) intact. If the
    /// row delete fails after the blob is gone, the records remain and the
    /// caller sees a metadata-store failure.
    pub async fn delete(&self, filename: &str) -> Result<(), RegistryError> {
        if filename.is_empty() {
            return Err(RegistryError::MissingInput);
        }

        self.blob_storage.delete(filename).await?;

        let removed = self.metadata.delete_by_filename(filename).await.map_err(|e| {
            warn!(filename, "blob deleted but record delete failed: {e}");
            e
        })?;
        info!(filename, removed, "deleted file");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use blob_store::BlobStorageConfig;
    use tempfile::TempDir;

    use super::*;

    async fn registry_at(blob_path: String, temp_dir: &TempDir) -> FileRegistry {
        let storage = BlobStorage::new(BlobStorageConfig {
            path: blob_path,
            region: None,
        })
        .await
        .unwrap();
        let metadata = MetadataStore::connect_file(&temp_dir.path().join("files.db"))
            .await
            .unwrap();
        FileRegistry::new(Arc::new(storage), metadata)
    }

    async fn test_registry(temp_dir: &TempDir) -> FileRegistry {
        let blob_path = format!("file://{}", temp_dir.path().join("blobs").display());
        registry_at(blob_path, temp_dir).await
    }

    #[tokio::test]
    async fn test_upload_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let registry = test_registry(&temp_dir).await;

        let outcome = registry
            .upload("a.txt", Bytes::from("hello"))
            .await
            .unwrap();
        assert!(!outcome.url.is_empty());

        let files = registry.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "a.txt");
        assert!(!files[0].url.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_blob_and_record() {
        let temp_dir = TempDir::new().unwrap();
        let registry = test_registry(&temp_dir).await;

        registry.upload("b.txt", Bytes::from("bye")).await.unwrap();
        registry.delete("b.txt").await.unwrap();

        let files = registry.list_files().await.unwrap();
        assert!(files.iter().all(|f| f.filename != "b.txt"));

        // the object no longer exists, so a second delete must fail
        let again = registry.delete("b.txt").await;
        assert!(matches!(again, Err(RegistryError::BlobStore(_))));
    }

    #[tokio::test]
    async fn test_missing_filename_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let registry = test_registry(&temp_dir).await;

        let result = registry.upload("", Bytes::from("data")).await;
        assert!(matches!(result, Err(RegistryError::MissingInput)));

        // nothing was written to either store
        assert!(registry.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blob_write_failure_leaves_no_record() {
        let temp_dir = TempDir::new().unwrap();
        // make the container path an existing regular file so blob writes
        // fail when the backend tries to create it as a directory
        let blocked = temp_dir.path().join("blobs");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let registry = registry_at(format!("file://{}", blocked.display()), &temp_dir).await;

        let result = registry.upload("c.txt", Bytes::from("data")).await;
        assert!(matches!(result, Err(RegistryError::BlobStore(_))));

        // the DB insert never ran
        assert!(registry.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_reflects_all_records() {
        let temp_dir = TempDir::new().unwrap();
        let registry = test_registry(&temp_dir).await;

        for name in ["x", "y", "z"] {
            registry
                .upload(name, Bytes::from(name.to_string()))
                .await
                .unwrap();
        }

        let files = registry.list_files().await.unwrap();
        assert_eq!(files.len(), 3);

        let mut names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["x", "y", "z"]);

        let mut ids: Vec<_> = files.iter().map(|f| f.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_upload_creates_second_record() {
        let temp_dir = TempDir::new().unwrap();
        let registry = test_registry(&temp_dir).await;

        registry.upload("dup.txt", Bytes::from("v1")).await.unwrap();
        registry.upload("dup.txt", Bytes::from("v2")).await.unwrap();

        // no uniqueness constraint: two rows point at one overwritten blob
        let files = registry.list_files().await.unwrap();
        assert_eq!(files.len(), 2);

        registry.delete("dup.txt").await.unwrap();
        assert!(registry.list_files().await.unwrap().is_empty());
    }
}

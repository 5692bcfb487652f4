//! Core blob store trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::BlobResult;

/// Core blob store operations.
///
/// Backends are addressed by full URIs (e.g. `s3://bucket/key` or
/// `file:///path/key`). The high-level [`BlobStorage`](crate::BlobStorage)
/// wrapper builds these URIs from a configured container path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get entire blob data.
    ///
    /// Returns `BlobError::NotFound` if the blob doesn't exist.
    async fn get(&self, uri: &str) -> BlobResult<Vec<u8>>;

    /// Upload blob data, overwriting any existing object under the same
    /// URI. Overwrite is not an error.
    async fn upload(&self, uri: &str, data: Vec<u8>) -> BlobResult<()>;

    /// Delete a blob.
    ///
    /// Deleting a missing object is a failure, not an idempotent success:
    /// returns `BlobError::NotFound` when the backend can detect absence.
    async fn delete(&self, uri: &str) -> BlobResult<()>;

    /// Generate a signed GET URL valid for `expires_in`.
    ///
    /// The object does not have to exist yet; signing happens purely from
    /// credentials and the target URI.
    async fn presign_get_uri(&self, uri: &str, expires_in: Duration) -> BlobResult<String>;
}

//! Blob store abstraction for filedepot.
//!
//! This crate provides the object-storage side of the upload registry:
//!
//! - Local filesystem and S3 backends behind the [`BlobStore`] trait
//! - Time-limited signed access URLs for stored objects
//! - A high-level [`BlobStorage`] handle scoped to one configured container
//!
//! # Usage
//!
//! ```rust,no_run
//! use blob_store::{BlobStorage, BlobStorageConfig};
//! use bytes::Bytes;
//!
//! # async fn example() -> Result<(), blob_store::BlobError> {
//! let config = BlobStorageConfig {
//!     path: "s3://my-bucket/uploads".to_string(),
//!     region: Some("us-west-2".to_string()),
//! };
//! let storage = BlobStorage::new(config).await?;
//!
//! let url = storage.presign("report.pdf").await?;
//! storage.put("report.pdf", Bytes::from_static(b"...")).await?;
//! # Ok(())
//! # }
//! ```

mod backends;
mod config;
mod error;
mod presign;
mod storage;
mod traits;

pub use backends::local::LocalBlobStore;
pub use backends::s3::S3BlobStore;
pub use config::{default_blob_store_path, BlobStorageConfig};
pub use error::{BlobError, BlobResult};
pub use presign::{validate_expiry, MAX_PRESIGN_EXPIRY, SIGNED_URL_TTL};
pub use storage::{BlobStorage, PutResult};
pub use traits::BlobStore;

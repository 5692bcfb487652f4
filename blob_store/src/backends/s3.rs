//! S3 blob store backend using object_store + aws-sdk-s3 for presigning.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{config::Region, presigning::PresigningConfig, Client as S3Client};
use bytes::Bytes;
use object_store::{
    aws::{AmazonS3, AmazonS3Builder},
    path::Path as ObjectPath,
    ObjectStore,
};
use tracing::debug;

use crate::{presign, BlobError, BlobResult, BlobStore};

/// S3 blob store backend.
pub struct S3BlobStore {
    /// object_store client for data I/O.
    object_store: Arc<AmazonS3>,

    /// AWS SDK S3 client for presigning.
    s3_client: S3Client,
}

impl S3BlobStore {
    /// Create a new S3 blob store from a base URL.
    ///
    /// # Arguments
    /// * `url` - S3 URL (e.g., `s3://bucket/prefix`)
    /// * `region` - Optional AWS region override
    pub async fn new(url: &str, region: Option<String>) -> BlobResult<Self> {
        if !url.starts_with("s3://") {
            return Err(BlobError::InvalidUri {
                uri: url.to_string(),
                reason: "URI must start with s3://".to_string(),
            });
        }

        let (bucket, prefix) = Self::parse_s3_url(url)?;

        // Build object_store client
        let mut builder = AmazonS3Builder::from_env().with_url(url);
        if let Some(ref r) = region {
            builder = builder.with_region(r);
        }
        let object_store = builder.build().map_err(|e| BlobError::NetworkError {
            source: anyhow::Error::from(e),
        })?;

        // Build AWS SDK S3 client for presigning
        let mut config_loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(r) = region {
            config_loader = config_loader.region(Region::new(r));
        }
        let aws_config = config_loader.load().await;
        let s3_client = S3Client::new(&aws_config);

        debug!(
            bucket = %bucket,
            prefix = %prefix,
            "Created S3 blob store"
        );

        Ok(Self {
            object_store: Arc::new(object_store),
            s3_client,
        })
    }

    /// Parse S3 URL into bucket and key (the key includes any prefix).
    fn parse_s3_url(url: &str) -> BlobResult<(String, String)> {
        let without_scheme = url
            .strip_prefix("s3://")
            .ok_or_else(|| BlobError::InvalidUri {
                uri: url.to_string(),
                reason: "Must start with s3://".to_string(),
            })?;

        let parts: Vec<&str> = without_scheme.splitn(2, '/').collect();
        let bucket = parts[0].to_string();
        let key = if parts.len() > 1 {
            parts[1].trim_end_matches('/').to_string()
        } else {
            String::new()
        };

        Ok((bucket, key))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, uri: &str) -> BlobResult<Vec<u8>> {
        let (_bucket, key) = Self::parse_s3_url(uri)?;
        let path = ObjectPath::from(key);

        let result = self.object_store.get(&path).await?;
        let bytes = result.bytes().await.map_err(|e| BlobError::NetworkError {
            source: anyhow::Error::from(e),
        })?;

        Ok(bytes.to_vec())
    }

    async fn upload(&self, uri: &str, data: Vec<u8>) -> BlobResult<()> {
        let (_bucket, key) = Self::parse_s3_url(uri)?;
        let path = ObjectPath::from(key);

        self.object_store
            .put(&path, Bytes::from(data).into())
            .await?;

        Ok(())
    }

    async fn delete(&self, uri: &str) -> BlobResult<()> {
        let (_bucket, key) = Self::parse_s3_url(uri)?;
        let path = ObjectPath::from(key);

        self.object_store.delete(&path).await?;
        Ok(())
    }

    async fn presign_get_uri(&self, uri: &str, expires_in: Duration) -> BlobResult<String> {
        presign::validate_expiry(expires_in).map_err(|e| BlobError::PresignError { reason: e })?;

        let (bucket, key) = Self::parse_s3_url(uri)?;

        let presigning_config =
            PresigningConfig::expires_in(expires_in).map_err(|e| BlobError::PresignError {
                reason: format!("Failed to create presigning config: {}", e),
            })?;

        let presigned = self
            .s3_client
            .get_object()
            .bucket(&bucket)
            .key(&key)
            .presigned(presigning_config)
            .await
            .map_err(|e| BlobError::PresignError {
                reason: format!("Failed to generate presigned GET URL: {}", e),
            })?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_url() {
        let (bucket, key) = S3BlobStore::parse_s3_url("s3://my-bucket/path/to/key").unwrap();
        assert_eq!(bucket, "my-bucket");
        assert_eq!(key, "path/to/key");

        let (bucket, key) = S3BlobStore::parse_s3_url("s3://my-bucket").unwrap();
        assert_eq!(bucket, "my-bucket");
        assert_eq!(key, "");
    }
}

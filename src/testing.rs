use anyhow::Result;
use axum::Router;
use blob_store::BlobStorageConfig;

use crate::{
    config::{DatabaseConfig, ServerConfig},
    routes::{create_routes, RouteState},
    service::Service,
};

pub struct TestService {
    pub service: Service,
    // keeps the blob and database files alive for the test's duration
    _temp_dir: tempfile::TempDir,
}

impl TestService {
    pub async fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;

        let cfg = ServerConfig {
            blob_storage: BlobStorageConfig {
                path: format!(
                    "file://{}",
                    temp_dir.path().join("blob_store").to_str().unwrap()
                ),
                region: None,
            },
            database: DatabaseConfig {
                url: format!(
                    "sqlite://{}",
                    temp_dir.path().join("files.db").to_str().unwrap()
                ),
            },
            ..Default::default()
        };
        let srv = Service::new(cfg).await?;

        Ok(Self {
            service: srv,
            _temp_dir: temp_dir,
        })
    }

    pub fn router(&self) -> Router {
        create_routes(RouteState {
            registry: self.service.registry.clone(),
        })
    }
}

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum_server::Handle;
use blob_store::BlobStorage;
use metadata_store::MetadataStore;
use tokio::{self, signal, sync::watch};
use tracing::info;

use crate::{
    config::ServerConfig,
    registry::FileRegistry,
    routes::{create_routes, RouteState},
};

#[derive(Clone)]
pub struct Service {
    pub config: ServerConfig,
    pub shutdown_tx: watch::Sender<()>,
    pub shutdown_rx: watch::Receiver<()>,
    pub registry: Arc<FileRegistry>,
}

impl Service {
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let blob_storage = Arc::new(
            BlobStorage::new(config.blob_storage.clone())
                .await
                .context("error initializing BlobStorage")?,
        );

        // SQLite creates the database file but not its directory
        if let Some(path) = config.database.url.strip_prefix("sqlite://") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("error creating database directory")?;
            }
        }
        let metadata = MetadataStore::connect(&config.database.url)
            .await
            .context("error initializing MetadataStore")?;

        let registry = Arc::new(FileRegistry::new(blob_storage, metadata));

        Ok(Self {
            config,
            shutdown_tx,
            shutdown_rx,
            registry,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        let route_state = RouteState {
            registry: self.registry.clone(),
        };

        let handle = Handle::new();
        let handle_sh = handle.clone();
        let shutdown_tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            shutdown_signal(handle_sh, shutdown_tx).await;
            info!("graceful shutdown signal received, shutting down server gracefully");
        });

        let addr: SocketAddr = self.config.listen_addr.parse()?;
        info!("server api listening on {}", self.config.listen_addr);
        let routes = create_routes(route_state);
        axum_server::bind(addr)
            .handle(handle)
            .serve(routes.into_make_service())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal(handle: Handle, shutdown_tx: watch::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
        },
        _ = terminate => {
        },
    }
    handle.shutdown();
    let _ = shutdown_tx.send(());
    info!("signal received, shutting down server gracefully");
}

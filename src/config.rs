use std::{env, net::SocketAddr};

use anyhow::Result;
use blob_store::BlobStorageConfig;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database URL for the files table.
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    format!(
        "sqlite://{}",
        env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join("filedepot_storage/files.db")
            .to_str()
            .unwrap_or("./filedepot_storage/files.db")
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    #[serde(default)]
    pub structured_logging: bool,
    #[serde(default)]
    pub blob_storage: BlobStorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "0.0.0.0:5001".to_string(),
            structured_logging: false,
            blob_storage: Default::default(),
            database: Default::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_path(path: &str) -> Result<ServerConfig> {
        let config_str = std::fs::read_to_string(path)?;
        let config: ServerConfig = Figment::new().merge(Yaml::string(&config_str)).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(anyhow::anyhow!(
                "invalid listen address: {}",
                self.listen_addr
            ));
        }
        if !self.blob_storage.path.contains("://") {
            return Err(anyhow::anyhow!(
                "invalid blob storage path (expected scheme://...): {}",
                self.blob_storage.path
            ));
        }
        if !self.database.url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "invalid database url (expected sqlite:...): {}",
                self.database.url
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        ServerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_bad_listen_addr_rejected() {
        let config = ServerConfig {
            listen_addr: "not-an-addr".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
listen_addr: "127.0.0.1:9000"
blob_storage:
  path: "s3://my-bucket/uploads"
  region: "us-east-1"
database:
  url: "sqlite:///tmp/files.db"
"#;
        let config: ServerConfig = Figment::new()
            .merge(Yaml::string(yaml))
            .extract()
            .unwrap();
        config.validate().unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.blob_storage.path, "s3://my-bucket/uploads");
        assert_eq!(config.blob_storage.region.as_deref(), Some("us-east-1"));
    }
}

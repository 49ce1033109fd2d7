use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    9000
}

/// Which catalog backend is active for this deployment.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Single JSON document rewritten on every mutation.
    Document,
    /// SQLite `items` table.
    #[default]
    Sqlite,
}

/// Catalog storage configuration.
///
/// Only the path matching `backend` is opened; the other is ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_document_path")]
    pub document_path: PathBuf,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            document_path: default_document_path(),
            database_path: default_database_path(),
        }
    }
}

fn default_document_path() -> PathBuf {
    PathBuf::from("items.json")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("db/items.db")
}

/// Image directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    #[serde(default = "default_image_dir")]
    pub dir: PathBuf,
    /// Directory that form submissions may name source images from.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: default_image_dir(),
            source_dir: default_source_dir(),
        }
    }
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("sources")
}

/// CORS configuration for the web frontend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

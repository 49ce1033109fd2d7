pub mod catalog;
pub mod config;
pub mod image;
pub mod submission;

pub use catalog::{
    create_catalog, CatalogError, CatalogRecord, CatalogStore, DocumentCatalog, NewRecord,
    SqliteCatalog,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, CorsConfig,
    ImagesConfig, ServerConfig, StorageBackend, StorageConfig,
};
pub use image::{ImageError, ImageIngestor, ImageResolver, DEFAULT_IMAGE, IMAGE_EXTENSION};
pub use submission::{submit_item, ImageSource, Submission, SubmitError};

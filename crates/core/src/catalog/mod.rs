//! Item catalog - the durable store of marketplace listings.
//!
//! Two backends implement [`CatalogStore`]: a single JSON document
//! ([`DocumentCatalog`]) and a SQLite table ([`SqliteCatalog`]). One is
//! picked per deployment by [`create_catalog`]; they are never synced.

mod document;
mod sqlite;
mod types;

pub use document::DocumentCatalog;
pub use sqlite::SqliteCatalog;
pub use types::*;

use crate::config::{StorageBackend, StorageConfig};

/// Trait for item catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    ///
    /// On error the store is left exactly as it was.
    fn create(&self, record: NewRecord) -> Result<CatalogRecord, CatalogError>;

    /// All records, in a stable backend-defined order.
    fn list(&self) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Get a record by id, or [`CatalogError::NotFound`].
    fn get(&self, id: i64) -> Result<CatalogRecord, CatalogError>;

    /// Records whose id, name, category or image contains `keyword`
    /// (case-sensitive). An empty keyword returns everything.
    fn search(&self, keyword: &str) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Factory function to create the configured catalog backend
pub fn create_catalog(config: &StorageConfig) -> Result<Box<dyn CatalogStore>, CatalogError> {
    match config.backend {
        StorageBackend::Document => Ok(Box::new(DocumentCatalog::new(&config.document_path)?)),
        StorageBackend::Sqlite => Ok(Box::new(SqliteCatalog::new(&config.database_path)?)),
    }
}

use std::sync::Arc;
use marketplace_core::{CatalogStore, Config, ImageIngestor, ImageResolver};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<dyn CatalogStore>,
    ingestor: ImageIngestor,
    resolver: ImageResolver,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn CatalogStore>,
        ingestor: ImageIngestor,
        resolver: ImageResolver,
    ) -> Self {
        Self {
            config,
            catalog,
            ingestor,
            resolver,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn ingestor(&self) -> &ImageIngestor {
        &self.ingestor
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketplace_core::{
    create_catalog, load_config, validate_config, CatalogStore, ImageIngestor, ImageResolver,
};
use marketplace_server::{api::create_router, state::AppState};

/// Env var naming the config file
const CONFIG_ENV: &str = "MARKETPLACE_CONFIG";

/// Frontend origin override, kept for existing deployments
const FRONT_URL_ENV: &str = "FRONT_URL";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // An explicitly named config file must exist; the default one is optional.
    let (config_path, required) = match std::env::var(CONFIG_ENV) {
        Ok(path) => (PathBuf::from(path), true),
        Err(_) => (PathBuf::from("config.toml"), false),
    };

    info!("Loading configuration from {:?}", config_path);
    let mut config = load_config(&config_path, required)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    if let Ok(front_url) = std::env::var(FRONT_URL_ENV) {
        if !front_url.is_empty() {
            config.cors.allowed_origins = vec![front_url];
        }
    }

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Storage backend: {:?}", config.storage.backend);
    info!("Image directory: {:?}", config.images.dir);
    info!("Source image directory: {:?}", config.images.source_dir);
    info!("Allowed origins: {:?}", config.cors.allowed_origins);

    let catalog: Arc<dyn CatalogStore> = Arc::from(
        create_catalog(&config.storage).context("Failed to open item catalog")?,
    );
    info!("Item catalog initialized ({})", catalog.backend_name());

    std::fs::create_dir_all(&config.images.dir)
        .with_context(|| format!("Failed to create image directory {:?}", config.images.dir))?;
    let ingestor =
        ImageIngestor::new(&config.images.dir).with_source_dir(&config.images.source_dir);
    let resolver = ImageResolver::new(&config.images.dir).context("Invalid image directory")?;
    if !resolver.default_image().is_file() {
        warn!(
            "Default image {:?} is missing; unknown images will return 404",
            resolver.default_image()
        );
    }

    let state = Arc::new(AppState::new(config.clone(), catalog, ingestor, resolver));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Image and source directories are set and differ
/// - At least one CORS origin is configured
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.images.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "images.dir cannot be empty".to_string(),
        ));
    }

    if config.images.source_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "images.source_dir cannot be empty".to_string(),
        ));
    }

    if config.images.source_dir == config.images.dir {
        return Err(ConfigError::ValidationError(
            "images.source_dir must differ from images.dir".to_string(),
        ));
    }

    if config.cors.allowed_origins.is_empty() {
        return Err(ConfigError::ValidationError(
            "cors.allowed_origins must list at least one origin".to_string(),
        ));
    }

    Ok(())
}

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment prefix for overrides, e.g. `MARKETPLACE_SERVER__PORT=9001`.
pub const ENV_PREFIX: &str = "MARKETPLACE_";

/// Load configuration from file with environment variable overrides.
///
/// A missing file is only an error when `required` is set; otherwise the
/// built-in defaults are used as the base layer.
pub fn load_config(path: &Path, required: bool) -> Result<Config, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

use std::path::PathBuf;

use directories::ProjectDirs;
use posecoach_bridge::config::Config;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

/// Errors that can occur while loading or saving the application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine the user's configuration directory. This usually
    /// occurs when required environment variables are missing (e.g., `$HOME`
    /// on Unix or `%APPDATA%` on Windows).
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    /// An I/O error occurred while reading or writing the configuration file.
    #[error("failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid TOML or does not match the
    /// expected structure.
    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

fn config_path() -> Result<PathBuf, ConfigError> {
    match ProjectDirs::from("dev", "posecoach", "posecoach") {
        Some(dirs) => Ok(dirs.config_dir().join("config.toml")),
        None => Err(ConfigError::DirectoriesNotFound),
    }
}

/// Parses a configuration file body. Missing keys take their defaults.
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Loads the application configuration from disk, writing the defaults on
/// first run.
pub async fn load_config() -> Result<Config, ConfigError> {
    let config_path = config_path()?;
    log::info!("Loading configuration from {config_path:?}");
    if config_path.exists() {
        let contents = read_to_string(config_path).await?;
        return parse_config(&contents);
    }

    let config = Config::default();
    save_config(&config).await?;
    Ok(config)
}

/// Loads the configuration, falling back to the defaults when it cannot be
/// read. Session coordination does not depend on a readable config.
pub async fn load_config_or_default() -> Config {
    match load_config().await {
        Ok(config) => config,
        Err(err) => {
            log::error!("Using default configuration: {err}");
            Config::default()
        }
    }
}

/// Saves the configuration to `config.toml` in the user's configuration
/// directory, overwriting any existing file.
pub async fn save_config(config: &Config) -> Result<(), ConfigError> {
    let config_path = config_path()?;
    if let Some(parent) = config_path.parent() {
        create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(config_path)
        .await?;

    let contents = toml::to_string_pretty(config)?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(())
}

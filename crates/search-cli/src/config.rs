//! Configuration file loading.

use chess_search::SearchConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default location, relative to the working directory.
pub fn default_path() -> PathBuf {
    PathBuf::from("search.toml")
}

/// Loads search settings from `path`.
///
/// A missing file is not an error and yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file exists but cannot be read,
/// or [`ConfigError::Parse`] if it is not valid TOML for [`SearchConfig`].
pub fn load(path: &Path) -> Result<SearchConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(SearchConfig::default())
    }
}

//! Field configuration loaded from TOML.
//!
//! # Example
//!
//! ```rust
//! use lookup::config::LookupConfig;
//!
//! let config = LookupConfig::from_toml("debounce_ms = 150").unwrap();
//! assert_eq!(config.debounce_ms, 150);
//! assert_eq!(config.blur_grace_ms, 200);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables shared by every lookup field built from the same configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupConfig {
    /// Debounce window for remote search, in milliseconds.
    pub debounce_ms: u64,
    /// Delay between blur and close, in milliseconds.
    pub blur_grace_ms: u64,
    /// Characters required before filtering and searching.
    pub min_search_length: usize,
    /// Text shown in an empty input.
    pub placeholder: String,
    /// Panel text when nothing matches.
    pub no_options_message: String,
    /// Panel text while a search is in flight.
    pub loading_message: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            blur_grace_ms: 200,
            min_search_length: 0,
            placeholder: "Search...".to_string(),
            no_options_message: "No options found".to_string(),
            loading_message: "Loading...".to_string(),
        }
    }
}

impl LookupConfig {
    /// Parses a configuration from TOML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml)?)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded lookup configuration");
        Ok(config)
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The debounce window as a [`Duration`].
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The blur grace delay as a [`Duration`].
    #[must_use]
    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

/// Errors that can occur when loading a [`LookupConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },
    /// The TOML was malformed or contained unknown keys.
    #[error("TOML error: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be written as TOML.
    #[error("TOML error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

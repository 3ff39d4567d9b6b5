//! Error types for loading configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type alias using [`ConfigError`] as the error type.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading image configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("Failed to read configuration from {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON configuration could not be parsed.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML configuration could not be parsed.
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration was read but did not validate.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),

    /// Neither the file nor the environment produced a valid configuration.
    #[error("No valid configuration sources are available: {reason}")]
    NoValidSource {
        /// Why the last source was rejected.
        reason: String,
    },
}

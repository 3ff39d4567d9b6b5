//! Configuration file loading with environment fallback.
//!
//! The file lives at `<dir>/images.json` or `<dir>/images.yaml`. If it is
//! missing, unreadable or invalid, the configuration described by the
//! [`Environment`] is used instead.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::config::{CanonicalImageEntry, RawImageEntry};
use crate::environment::{environment_configuration, Environment};
use crate::error::{ConfigError, Result};
use crate::normalize::normalize;

/// Directory searched for the configuration file by default.
pub const DEFAULT_CONFIG_DIR: &str = "/config";

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// `images.json`
    #[default]
    Json,
    /// `images.yaml`
    Yaml,
}

impl ConfigFormat {
    /// File extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Guesses the format from a file extension; anything but `yaml`/`yml` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Top-level shape of a configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigDocument {
    /// `{ "images": [...] }`
    Wrapped {
        /// The configured images.
        images: Vec<RawImageEntry>,
    },
    /// A bare list of images. Deprecated.
    Bare(Vec<RawImageEntry>),
}

impl ConfigDocument {
    /// Parses a document in the given format.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the content is not a valid document.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        Ok(match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        })
    }

    /// Returns the images, warning if the deprecated bare shape was used.
    #[must_use]
    pub fn into_images(self) -> Vec<RawImageEntry> {
        match self {
            Self::Wrapped { images } => images,
            Self::Bare(images) => {
                warn!(
                    label = "config",
                    "DEPRECATION WARNING: the list of images should be placed under the \"images\" key"
                );
                images
            }
        }
    }
}

/// Reads, validates and normalizes a single configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or does not validate.
pub fn load_file(path: &Path) -> Result<Vec<CanonicalImageEntry>> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let images = ConfigDocument::parse(&content, ConfigFormat::from_path(path))?.into_images();
    Ok(normalize(&images)?)
}

/// Loads configuration from a directory, falling back to the environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    dir: PathBuf,
    format: ConfigFormat,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}

impl ConfigLoader {
    /// Creates a loader reading JSON from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: ConfigFormat::Json,
        }
    }

    /// Sets the file format.
    #[must_use]
    pub const fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = format;
        self
    }

    /// Path of the configuration file this loader reads.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("images.{}", self.format.extension()))
    }

    /// Loads the file configuration, or the environment configuration if the
    /// file is missing or invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoValidSource`] if the environment fallback is
    /// invalid as well.
    pub fn load(&self, environment: &Environment) -> Result<Vec<CanonicalImageEntry>> {
        let path = self.path();
        debug!(label = "config", path = %path.display(), "Reading configuration file");

        match load_file(&path) {
            Ok(configuration) => {
                debug!(label = "config", "Configuration file is valid");
                return Ok(configuration);
            }
            Err(ConfigError::ReadError { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!(
                    label = "config",
                    path = %path.display(),
                    "No configuration file available, defaulting to ENV configuration"
                );
            }
            Err(ConfigError::Invalid(errors)) => {
                for e in errors.iter() {
                    error!(label = "config", "{e}");
                }
                error!(label = "config", "Invalid configuration file, defaulting to ENV configuration");
            }
            Err(e) => {
                error!(label = "config", error = %e, "Unusable configuration file, defaulting to ENV configuration");
            }
        }

        environment_configuration(environment).map_err(|errors| ConfigError::NoValidSource {
            reason: format!("invalid ENV configuration: {errors}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("images.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("images.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("images.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("images")), ConfigFormat::Json);
    }

    #[test]
    fn test_loader_path() {
        let loader = ConfigLoader::default();
        assert_eq!(loader.path(), PathBuf::from("/config/images.json"));

        let loader = ConfigLoader::new("/etc/hubcycle").with_format(ConfigFormat::Yaml);
        assert_eq!(loader.path(), PathBuf::from("/etc/hubcycle/images.yaml"));
    }

    #[test]
    fn test_parse_wrapped_json() {
        let document = ConfigDocument::parse(
            r#"{"images": [{"name": "org/app", "match": "develop-.*"}]}"#,
            ConfigFormat::Json,
        )
        .unwrap();
        assert!(matches!(document, ConfigDocument::Wrapped { ref images } if images.len() == 1));
    }

    #[test]
    fn test_parse_bare_json() {
        let document = ConfigDocument::parse(
            r#"[{"name": "org/app", "match": "develop-.*"}, {"name": "org/b", "match": "x"}]"#,
            ConfigFormat::Json,
        )
        .unwrap();
        assert_eq!(document.into_images().len(), 2);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
images:
  - name: org/app
    keep: 3
    match:
      - expression: develop-.*
        keep: "4"
      - expression: release/.*
"#;
        let images = ConfigDocument::parse(yaml, ConfigFormat::Yaml)
            .unwrap()
            .into_images();
        let canonical = normalize(&images).unwrap();
        assert_eq!(canonical[0].patterns[0].keep(), 4);
        assert_eq!(canonical[0].patterns[1].keep(), 3);
    }

    #[test]
    fn test_parse_rejects_non_list() {
        assert!(ConfigDocument::parse(r#"{"name": "org/app"}"#, ConfigFormat::Json).is_err());
        assert!(ConfigDocument::parse("not json", ConfigFormat::Json).is_err());
    }
}

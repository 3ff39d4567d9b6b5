//! Process environment settings.
//!
//! Settings are read once into an [`Environment`] at startup and passed
//! around explicitly. Each setting is looked up by its dotted name first
//! (`dockerhub.username`) and then by its shell-friendly alias
//! (`DOCKERHUB_USERNAME`).

use std::collections::HashMap;

use tracing::warn;

use crate::config::{CanonicalImageEntry, RawImageEntry};
use crate::keep::DEFAULT_KEEP;
use crate::normalize::normalize;
use crate::validation::ValidationErrors;

/// Match expression used when none is configured.
pub const DEFAULT_MATCH_EXPRESSION: &str = "develop-.*";

const USERNAME: (&str, &str) = ("dockerhub.username", "DOCKERHUB_USERNAME");
const PASSWORD: (&str, &str) = ("dockerhub.password", "DOCKERHUB_PASSWORD");
const ORGANIZATION: (&str, &str) = ("dockerhub.organization", "DOCKERHUB_ORGANIZATION");
const IMAGES: (&str, &str) = ("dockerhub.images", "DOCKERHUB_IMAGES");
const MATCH_EXPRESSION: (&str, &str) = ("match.expression", "MATCH_EXPRESSION");
const KEEP: (&str, &str) = ("keep", "KEEP");

/// Settings taken from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Registry username.
    pub username: Option<String>,
    /// Registry password.
    pub password: Option<String>,
    /// Prefix prepended verbatim to every image name, e.g. `strongeleeroy/`.
    pub organization: Option<String>,
    /// Images to manage when no configuration file is usable.
    pub images: Vec<String>,
    /// Match expression applied to every fallback image.
    pub match_expression: String,
    /// Retention count applied to every fallback image. Always at least 1.
    pub keep: i64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            organization: None,
            images: Vec::new(),
            match_expression: DEFAULT_MATCH_EXPRESSION.to_string(),
            keep: DEFAULT_KEEP,
        }
    }
}

impl Environment {
    /// Reads settings from the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Reads settings from the given key/value pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubcycle_core::Environment;
    ///
    /// let env = Environment::from_vars([
    ///     ("DOCKERHUB_IMAGES", "registry-a, registry-b"),
    ///     ("dockerhub.organization", "strongeleeroy/"),
    /// ]);
    /// assert_eq!(env.images, vec!["registry-a", "registry-b"]);
    /// assert_eq!(env.organization.as_deref(), Some("strongeleeroy/"));
    /// ```
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let lookup = |(dotted, alias): (&str, &str)| {
            vars.get(dotted)
                .or_else(|| vars.get(alias))
                .filter(|value| !value.is_empty())
                .cloned()
        };

        let images = lookup(IMAGES)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|image| !image.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            username: lookup(USERNAME),
            password: lookup(PASSWORD),
            organization: lookup(ORGANIZATION),
            images,
            match_expression: lookup(MATCH_EXPRESSION)
                .unwrap_or_else(|| DEFAULT_MATCH_EXPRESSION.to_string()),
            keep: parse_keep(lookup(KEEP).as_deref()),
        }
    }

    /// Returns the username and password if both are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.username.as_deref().zip(self.password.as_deref())
    }

    /// Builds the raw configuration described by these settings: one
    /// shorthand entry per image.
    #[must_use]
    pub fn raw_configuration(&self) -> Vec<RawImageEntry> {
        let organization = self.organization.as_deref().unwrap_or_default();
        self.images
            .iter()
            .map(|image| {
                RawImageEntry::new(format!("{organization}{image}"), self.match_expression.as_str())
                    .with_keep(self.keep)
            })
            .collect()
    }
}

fn parse_keep(value: Option<&str>) -> i64 {
    let keep = value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_KEEP);
    if keep <= 0 {
        warn!(keep, "\"keep\" setting is less than 1, using 1");
        return 1;
    }
    keep
}

/// Normalizes the configuration described by the environment.
///
/// # Errors
///
/// Returns validation errors if no image is configured or any derived
/// entry is invalid.
pub fn environment_configuration(
    environment: &Environment,
) -> Result<Vec<CanonicalImageEntry>, ValidationErrors> {
    normalize(&environment.raw_configuration())
}

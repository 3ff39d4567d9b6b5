//! Image configuration, as written by users and as resolved for a run.
//!
//! [`RawImageEntry`] mirrors the configuration file and tolerates every
//! shape a user may write. [`CanonicalImageEntry`] is what the rest of the
//! tool works with: one compiled pattern and one concrete keep per matcher.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::keep::{is_valid_keep, KeepValue};
use crate::validation::{
    check_image_name, compile_pattern, Validate, ValidationError, ValidationErrors,
};

/// One image as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImageEntry {
    /// Repository name, e.g. `strongeleeroy/hubcycle`. Only strings validate.
    #[serde(default)]
    pub name: Value,

    /// Image-level retention count, used by patterns without their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep: Option<KeepValue>,

    /// The tag patterns to manage.
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub matches: Option<RawMatch>,
}

impl RawImageEntry {
    /// Creates an entry with the given name and match and no image-level keep.
    pub fn new(name: impl Into<String>, matches: impl Into<RawMatch>) -> Self {
        Self {
            name: Value::String(name.into()),
            keep: None,
            matches: Some(matches.into()),
        }
    }

    /// Sets the image-level keep.
    #[must_use]
    pub fn with_keep(mut self, keep: impl Into<KeepValue>) -> Self {
        self.keep = Some(keep.into());
        self
    }

    /// Returns the name if it is a string.
    #[must_use]
    pub fn name_str(&self) -> Option<&str> {
        self.name.as_str()
    }
}

impl Validate for RawImageEntry {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self.name_str() {
            Some(name) => {
                if let Err(e) = check_image_name(name) {
                    errors.add(e);
                }
            }
            None => errors.add(ValidationError::image_name(
                "name",
                format!("[{}] the \"name\" property must be a string", self.name),
            )),
        }

        if let Some(keep) = self.keep.as_ref().filter(|k| !is_valid_keep(Some(*k))) {
            errors.add(ValidationError::keep("keep", keep));
        }

        match &self.matches {
            None => errors.add(ValidationError::match_shape(
                "match",
                "the \"match\" property is required",
            )),
            Some(matches) => {
                if let Err(inner) = matches.validate() {
                    for e in inner {
                        errors.add(e);
                    }
                }
            }
        }

        errors.into_result()
    }
}

/// The `match` property of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMatch {
    /// A single expression that uses the image-level keep.
    Shorthand(String),
    /// A list of expressions, each with an optional keep of its own.
    Explicit(Vec<RawMatcher>),
    /// Any other shape. Always invalid.
    Unsupported(Value),
}

impl From<&str> for RawMatch {
    fn from(expression: &str) -> Self {
        Self::Shorthand(expression.to_string())
    }
}

impl From<String> for RawMatch {
    fn from(expression: String) -> Self {
        Self::Shorthand(expression)
    }
}

impl From<Vec<RawMatcher>> for RawMatch {
    fn from(matchers: Vec<RawMatcher>) -> Self {
        Self::Explicit(matchers)
    }
}

impl Validate for RawMatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Shorthand(expression) if expression.is_empty() => Err(
                ValidationError::match_shape("match", "expression must not be empty").into(),
            ),
            Self::Shorthand(expression) => compile_pattern("match", expression)
                .map(drop)
                .map_err(Into::into),
            Self::Explicit(matchers) if matchers.is_empty() => Err(
                ValidationError::match_shape("match", "matcher list must not be empty").into(),
            ),
            Self::Explicit(matchers) => {
                let mut errors = ValidationErrors::new();
                for (index, matcher) in matchers.iter().enumerate() {
                    if let Err(inner) = matcher.validate() {
                        errors.merge_prefixed(inner, &format!("match[{index}]"));
                    }
                }
                errors.into_result()
            }
            Self::Unsupported(value) => Err(ValidationError::match_shape(
                "match",
                format!("expected an expression or a list of matchers, got {value}"),
            )
            .into()),
        }
    }
}

/// One entry of an explicit matcher list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatcher {
    /// Regular expression selecting tag names.
    pub expression: String,

    /// Pattern-level retention count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep: Option<KeepValue>,
}

impl RawMatcher {
    /// Creates a matcher without its own keep.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            keep: None,
        }
    }

    /// Sets the pattern-level keep.
    #[must_use]
    pub fn with_keep(mut self, keep: impl Into<KeepValue>) -> Self {
        self.keep = Some(keep.into());
        self
    }
}

impl Validate for RawMatcher {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.expression.is_empty() {
            errors.add(ValidationError::match_shape(
                "expression",
                "expression must not be empty",
            ));
        } else if let Err(e) = compile_pattern("expression", &self.expression) {
            errors.add(e);
        }
        if let Some(keep) = self.keep.as_ref().filter(|k| !is_valid_keep(Some(*k))) {
            errors.add(ValidationError::keep("keep", keep));
        }
        errors.into_result()
    }
}

/// A fully resolved image: a name and at least one matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalImageEntry {
    /// Repository name.
    pub name: String,

    /// Matchers in configuration order.
    #[serde(rename = "match")]
    pub patterns: Vec<CanonicalMatcher>,
}

/// A compiled pattern with a concrete retention count.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalMatcher {
    expression: String,
    keep: usize,
    #[serde(skip)]
    pattern: Regex,
}

impl CanonicalMatcher {
    /// Builds a matcher from an already compiled pattern.
    #[must_use]
    pub fn new(pattern: Regex, keep: usize) -> Self {
        Self {
            expression: pattern.as_str().to_string(),
            keep,
            pattern,
        }
    }

    /// The source expression.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Number of most recent matching tags to preserve.
    #[must_use]
    pub const fn keep(&self) -> usize {
        self.keep
    }

    /// The compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl PartialEq for CanonicalMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression && self.keep == other.keep
    }
}

impl Eq for CanonicalMatcher {}

impl From<&CanonicalMatcher> for RawMatcher {
    fn from(matcher: &CanonicalMatcher) -> Self {
        // resolve_keep skips an integer 0, the string form survives it.
        let keep = match i64::try_from(matcher.keep) {
            Ok(0) => KeepValue::from("0"),
            Ok(keep) => KeepValue::Integer(keep),
            Err(_) => KeepValue::Integer(i64::MAX),
        };
        Self::new(matcher.expression.clone()).with_keep(keep)
    }
}

impl From<&CanonicalImageEntry> for RawImageEntry {
    fn from(entry: &CanonicalImageEntry) -> Self {
        let matchers: Vec<RawMatcher> = entry.patterns.iter().map(RawMatcher::from).collect();
        Self::new(entry.name.clone(), matchers)
    }
}

//! Validation rules and error types for raw image configuration.
//!
//! Every rule here is a pure predicate. The normalizer runs all of them over
//! a batch and collects the failures into [`ValidationErrors`], so a single
//! pass reports every problem in the configuration.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// A component of an image name: lowercase letters at both ends, with
/// lowercase letters and `-`, `_`, `.` in between.
static NAME_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z\-_.]*[a-z]$").expect("image name component pattern is valid")
});

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path that failed validation (e.g. `images[1].match[0].keep`).
    pub field: String,
    /// A human-readable description of the failure.
    pub message: String,
    /// The kind of validation that failed.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubcycle_core::validation::{ValidationError, ValidationErrorKind};
    ///
    /// let error = ValidationError::new(
    ///     "images[0].name",
    ///     "tags must not be part of the name",
    ///     ValidationErrorKind::InvalidImageName,
    /// );
    /// assert_eq!(error.kind, ValidationErrorKind::InvalidImageName);
    /// ```
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        kind: ValidationErrorKind,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }

    /// Creates an error for an image name that breaks the naming rules.
    pub fn image_name(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ValidationErrorKind::InvalidImageName)
    }

    /// Creates an error for a keep value that is not an integer.
    pub fn keep(field: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(
            field,
            format!("'{value}' is not an integer or an integer string"),
            ValidationErrorKind::InvalidKeep,
        )
    }

    /// Creates an error for an expression that does not compile.
    pub fn pattern(field: impl Into<String>, expression: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            field,
            format!("invalid regular expression [{expression}]: {reason}"),
            ValidationErrorKind::InvalidPattern,
        )
    }

    /// Creates an error for a `match` that is empty, missing or of an unsupported shape.
    pub fn match_shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ValidationErrorKind::InvalidMatchShape)
    }

    /// Creates the error reported for a batch without any image.
    pub fn empty_configuration() -> Self {
        Self::new(
            "images",
            "configuration does not contain any image",
            ValidationErrorKind::EmptyConfiguration,
        )
    }

    /// Returns this error with `prefix` prepended to its field path.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.field = format!("{prefix}.{}", self.field);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for '{}': {}", self.kind, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The category of validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// The image name fails the character, underscore or colon rules.
    InvalidImageName,
    /// A keep value is fractional, boolean or an unparseable string.
    InvalidKeep,
    /// A match expression does not compile.
    InvalidPattern,
    /// `match` is empty, absent or of an unsupported shape.
    InvalidMatchShape,
    /// The batch has no entries.
    EmptyConfiguration,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImageName => write!(f, "invalid image name"),
            Self::InvalidKeep => write!(f, "invalid keep"),
            Self::InvalidPattern => write!(f, "invalid pattern"),
            Self::InvalidMatchShape => write!(f, "invalid match"),
            Self::EmptyConfiguration => write!(f, "empty configuration"),
        }
    }
}

/// A collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validation error to the collection.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Returns true if there are no validation errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of validation errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns an iterator over the validation errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Returns true if any error has the given kind.
    #[must_use]
    pub fn contains_kind(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// Merges another collection into this one, prefixing every field path.
    pub fn merge_prefixed(&mut self, other: Self, prefix: &str) {
        self.errors
            .extend(other.errors.into_iter().map(|e| e.with_prefix(prefix)));
    }

    /// Converts to a `Result`: `Ok(())` when empty, `Err(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns the collection itself if it holds at least one error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = ValidationError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "no validation errors")
        } else if self.errors.len() == 1 {
            write!(f, "{}", self.errors[0])
        } else {
            writeln!(f, "{} validation errors:", self.errors.len())?;
            for error in &self.errors {
                writeln!(f, "  - {error}")?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ValidationErrors {}

/// Types that check their own shape before being normalized.
pub trait Validate {
    /// Validates this instance and returns every failure found.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` containing all validation failures.
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// Returns true if this instance is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Checks an image name against the repository naming rules.
///
/// # Errors
///
/// Returns an [`ValidationErrorKind::InvalidImageName`] error describing the
/// first rule the name breaks.
pub fn check_image_name(name: &str) -> Result<(), ValidationError> {
    if name.contains(':') {
        return Err(ValidationError::image_name(
            "name",
            format!(
                "[{name}] tags should not be part of the name, use the \"component/name\" format"
            ),
        ));
    }
    if name.contains("___") {
        return Err(ValidationError::image_name(
            "name",
            format!("[{name}] cannot include three consecutive underscore characters"),
        ));
    }
    if !name.split('/').all(|component| NAME_COMPONENT.is_match(component)) {
        return Err(ValidationError::image_name(
            "name",
            format!(
                "[{name}] can only contain lowercase characters and separators (\".\", \"-\" and \"_\")"
            ),
        ));
    }
    Ok(())
}

/// Returns true if `name` is a valid image name.
///
/// # Examples
///
/// ```
/// use hubcycle_core::validation::is_valid_image_name;
///
/// assert!(is_valid_image_name("strongeleeroy/hubcycle"));
/// assert!(!is_valid_image_name("strongeleeroy/hubcycle:latest"));
/// ```
#[must_use]
pub fn is_valid_image_name(name: &str) -> bool {
    check_image_name(name).is_ok()
}

/// Compiles `expression`, returning the regex or the compile error.
///
/// # Errors
///
/// Returns [`ValidationErrorKind::InvalidPattern`] if the expression does not compile.
pub fn compile_pattern(field: &str, expression: &str) -> Result<Regex, ValidationError> {
    Regex::new(expression).map_err(|e| ValidationError::pattern(field, expression, e))
}

/// Returns true if `expression` compiles as a regular expression.
#[must_use]
pub fn is_valid_pattern(expression: &str) -> bool {
    Regex::new(expression).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_image_names() {
        for name in [
            "strongeleeroy/hubcycle",
            "hubcycle",
            "stronge-leeroy/hubcycle",
            "stronge-leeroy/hub_cycle",
            "stronge.leeroy/hubcycle",
            "stronge__leeroy/hubcycle",
            "stronge-leeroy/hub.cycle",
            "s__trongeleeroy/hu.b--cycle",
        ] {
            assert!(is_valid_image_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_image_names() {
        for name in [
            "strongeleeroy1/hubcycle",
            "strongeleeroy/hub___cycle",
            "gher@nandez/hubcycle",
            "hubcycle-",
            "_strongeleeroy/hubcycle",
            "strongeleeroy/hubcycle:latest",
            "Strongeleeroy/hubcycle",
            "strongeleeroy//hubcycle",
        ] {
            assert!(!is_valid_image_name(name), "{name} should be invalid");
        }
    }

    #[test]
    fn test_single_letter_component_is_rejected() {
        assert!(!is_valid_image_name("a/hubcycle"));
    }

    #[test]
    fn test_image_name_error_messages() {
        let err = check_image_name("org/name:tag").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidImageName);
        assert!(err.message.contains("component/name"));

        let err = check_image_name("org/na___me").unwrap_err();
        assert!(err.message.contains("underscore"));

        let err = check_image_name("Org/name").unwrap_err();
        assert!(err.message.contains("lowercase"));
    }

    #[test]
    fn test_valid_patterns() {
        assert!(is_valid_pattern("develop-.*"));
        assert!(is_valid_pattern("d[a-z]*-.+"));
        assert!(is_valid_pattern("master-[A-z0-9]*-.*"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(!is_valid_pattern("["));
        assert!(!is_valid_pattern("09dsa((]"));
        assert!(!is_valid_pattern(")123"));
    }

    #[test]
    fn test_compile_pattern_error_kind() {
        let err = compile_pattern("match", "[").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidPattern);
        assert_eq!(err.field, "match");
        assert!(err.message.contains("[["));
    }

    #[test]
    fn test_with_prefix() {
        let err = ValidationError::keep("keep", "5.5").with_prefix("images[2]");
        assert_eq!(err.field, "images[2].keep");
    }

    #[test]
    fn test_validation_errors_collection() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());
        errors.add(ValidationError::empty_configuration());
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_kind(ValidationErrorKind::EmptyConfiguration));
        assert!(!errors.contains_kind(ValidationErrorKind::InvalidKeep));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_merge_prefixed() {
        let mut errors = ValidationErrors::new();
        let inner: ValidationErrors = vec![
            ValidationError::keep("keep", "x"),
            ValidationError::match_shape("match", "must not be empty"),
        ]
        .into_iter()
        .collect();

        errors.merge_prefixed(inner, "images[0]");
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["images[0].keep", "images[0].match"]);
    }

    #[test]
    fn test_validation_errors_display() {
        let single: ValidationErrors = ValidationError::keep("keep", "x").into();
        assert!(!single.to_string().contains("validation errors:"));

        let multiple: ValidationErrors = vec![
            ValidationError::keep("a", "x"),
            ValidationError::keep("b", "y"),
        ]
        .into_iter()
        .collect();
        let display = multiple.to_string();
        assert!(display.contains("2 validation errors"));
        assert!(display.contains("'a'"));
        assert!(display.contains("'b'"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ValidationErrorKind::InvalidImageName.to_string(), "invalid image name");
        assert_eq!(ValidationErrorKind::InvalidKeep.to_string(), "invalid keep");
        assert_eq!(ValidationErrorKind::InvalidPattern.to_string(), "invalid pattern");
        assert_eq!(ValidationErrorKind::InvalidMatchShape.to_string(), "invalid match");
        assert_eq!(
            ValidationErrorKind::EmptyConfiguration.to_string(),
            "empty configuration"
        );
    }
}

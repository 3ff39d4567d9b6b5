//! Retention count values and their resolution.
//!
//! A keep value can be written as a number or as a string in configuration
//! files, and can be set per pattern or per image. [`resolve_keep`] reduces
//! an ordered list of optional candidates to one concrete count.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Retention count used when no candidate resolves.
pub const DEFAULT_KEEP: i64 = 5;

/// A keep value as written in configuration.
///
/// Deserialization never fails on shape: anything that is not a number,
/// string or boolean lands in [`KeepValue::Unsupported`] and is rejected by
/// validation instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeepValue {
    /// An integer literal.
    Integer(i64),
    /// A non-integer number literal (or one too large for `i64`).
    Number(f64),
    /// A string that may hold a number.
    Text(String),
    /// A boolean. Always invalid.
    Flag(bool),
    /// Any other shape. Always invalid.
    Unsupported(serde_json::Value),
}

impl KeepValue {
    /// Returns the integer this value stands for, or `None` if it is not integral.
    ///
    /// Strings are trimmed and read as numbers; `"15"` and `"15.0"` are both 15,
    /// `"5.64"` and `"seven"` are not integral.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Number(value) => integral(*value),
            Self::Text(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(integral))
            }
            Self::Flag(_) | Self::Unsupported(_) => None,
        }
    }

    /// Whether this candidate takes part in resolution at all.
    ///
    /// `0`, `0.0`, `""` and `false` are skipped. The string `"0"` is not.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Integer(value) => *value != 0,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::Text(text) => !text.is_empty(),
            Self::Flag(flag) => *flag,
            Self::Unsupported(value) => !value.is_null(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

impl From<i64> for KeepValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for KeepValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for KeepValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for KeepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text}"),
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Unsupported(value) => write!(f, "{value}"),
        }
    }
}

/// Returns true if `keep` is absent, an integer or an integer-valued string.
///
/// # Examples
///
/// ```
/// use hubcycle_core::keep::{is_valid_keep, KeepValue};
///
/// assert!(is_valid_keep(None));
/// assert!(is_valid_keep(Some(&KeepValue::from("15"))));
/// assert!(!is_valid_keep(Some(&KeepValue::Number(5.64))));
/// assert!(!is_valid_keep(Some(&KeepValue::Flag(true))));
/// ```
#[must_use]
pub fn is_valid_keep(keep: Option<&KeepValue>) -> bool {
    keep.map_or(true, |value| value.as_integer().is_some())
}

/// Picks the retention count from an ordered list of candidates.
///
/// The first candidate that is both truthy and valid wins; otherwise
/// [`DEFAULT_KEEP`]. A `0` candidate is skipped like an absent one.
///
/// # Examples
///
/// ```
/// use hubcycle_core::keep::{resolve_keep, KeepValue};
///
/// let pattern = KeepValue::from("10");
/// let image = KeepValue::from(3);
/// assert_eq!(resolve_keep(&[Some(&pattern), Some(&image)]), 10);
/// assert_eq!(resolve_keep(&[None, Some(&image)]), 3);
/// assert_eq!(resolve_keep(&[Some(&KeepValue::from(0))]), 5);
/// ```
#[must_use]
pub fn resolve_keep(candidates: &[Option<&KeepValue>]) -> i64 {
    candidates
        .iter()
        .flatten()
        .filter(|value| value.is_truthy())
        .find_map(|value| value.as_integer())
        .unwrap_or(DEFAULT_KEEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> KeepValue {
        KeepValue::from(value)
    }

    fn int(value: i64) -> KeepValue {
        KeepValue::from(value)
    }

    #[test]
    fn test_valid_keep_values() {
        assert!(is_valid_keep(None));
        assert!(is_valid_keep(Some(&int(5))));
        assert!(is_valid_keep(Some(&text("15"))));
        assert!(is_valid_keep(Some(&int(55))));
        assert!(is_valid_keep(Some(&int(-2))));
        assert!(is_valid_keep(Some(&KeepValue::Number(7.0))));
        assert!(is_valid_keep(Some(&text(" 12 "))));
    }

    #[test]
    fn test_invalid_keep_values() {
        assert!(!is_valid_keep(Some(&KeepValue::Number(5.64))));
        assert!(!is_valid_keep(Some(&text("5.64"))));
        assert!(!is_valid_keep(Some(&text("hello"))));
        assert!(!is_valid_keep(Some(&text(""))));
        assert!(!is_valid_keep(Some(&KeepValue::Flag(true))));
        assert!(!is_valid_keep(Some(&KeepValue::Flag(false))));
        assert!(!is_valid_keep(Some(&text("inf"))));
        assert!(!is_valid_keep(Some(&KeepValue::Unsupported(
            serde_json::json!({"n": 1})
        ))));
    }

    #[test]
    fn test_resolve_single_valid_option() {
        assert_eq!(resolve_keep(&[Some(&text("5"))]), 5);
        assert_eq!(resolve_keep(&[Some(&int(10))]), 10);
        assert_eq!(resolve_keep(&[Some(&text("10"))]), 10);
        assert_eq!(resolve_keep(&[Some(&int(150))]), 150);
    }

    #[test]
    fn test_resolve_multiple_valid_options() {
        assert_eq!(resolve_keep(&[Some(&text("10")), Some(&int(5)), Some(&int(15))]), 10);
        assert_eq!(resolve_keep(&[Some(&int(10)), Some(&text("156")), Some(&int(6))]), 10);
        assert_eq!(resolve_keep(&[Some(&int(1)), Some(&int(10)), Some(&text("6"))]), 1);
        assert_eq!(resolve_keep(&[Some(&text("150")), Some(&int(160))]), 150);
    }

    #[test]
    fn test_resolve_mixed_options() {
        assert_eq!(
            resolve_keep(&[Some(&text("seven")), None, Some(&text("10")), None]),
            10
        );
        assert_eq!(
            resolve_keep(&[None, None, Some(&text("6.65")), Some(&text("156")), Some(&int(6))]),
            156
        );
        assert_eq!(resolve_keep(&[None, None, Some(&text("5"))]), 5);
        assert_eq!(resolve_keep(&[Some(&text("15")), None, Some(&int(1))]), 15);
    }

    #[test]
    fn test_resolve_defaults_to_five() {
        assert_eq!(resolve_keep(&[]), DEFAULT_KEEP);
        assert_eq!(resolve_keep(&[None]), 5);
        assert_eq!(resolve_keep(&[Some(&text("seven"))]), 5);
        assert_eq!(resolve_keep(&[Some(&text("6.65"))]), 5);
        assert_eq!(resolve_keep(&[None, None, None]), 5);
        assert_eq!(resolve_keep(&[None, Some(&text("seven"))]), 5);
        assert_eq!(resolve_keep(&[Some(&text("6.65")), None, Some(&text("seven"))]), 5);
    }

    #[test]
    fn test_resolve_skips_zero_and_empty_string() {
        assert_eq!(resolve_keep(&[Some(&int(0))]), 5);
        assert_eq!(resolve_keep(&[Some(&int(0)), Some(&int(3))]), 3);
        assert_eq!(resolve_keep(&[Some(&text("")), Some(&int(2))]), 2);
        assert_eq!(resolve_keep(&[Some(&KeepValue::Number(0.0))]), 5);
    }

    #[test]
    fn test_resolve_zero_string_is_not_skipped() {
        assert_eq!(resolve_keep(&[Some(&text("0")), Some(&int(3))]), 0);
    }

    #[test]
    fn test_resolve_skips_booleans() {
        assert_eq!(resolve_keep(&[Some(&KeepValue::Flag(true)), Some(&int(4))]), 4);
    }

    #[test]
    fn test_deserialize_shapes() {
        let values: Vec<KeepValue> =
            serde_json::from_str(r#"[5, 5.5, "7", true, {"a": 1}, -3]"#).unwrap();
        assert_eq!(values[0], KeepValue::Integer(5));
        assert_eq!(values[1], KeepValue::Number(5.5));
        assert_eq!(values[2], KeepValue::Text("7".to_string()));
        assert_eq!(values[3], KeepValue::Flag(true));
        assert!(matches!(values[4], KeepValue::Unsupported(_)));
        assert_eq!(values[5], KeepValue::Integer(-3));
    }
}

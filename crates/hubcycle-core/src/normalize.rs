//! Turns raw image configuration into its canonical form.
//!
//! Normalization is all-or-nothing: if any entry of the batch is invalid
//! the whole batch is rejected, and the caller has to fall back to another
//! configuration source.

use tracing::warn;

use crate::config::{CanonicalImageEntry, CanonicalMatcher, RawImageEntry, RawMatch};
use crate::keep::{resolve_keep, KeepValue};
use crate::validation::{compile_pattern, Validate, ValidationError, ValidationErrors};

/// Validates and normalizes a batch of image entries.
///
/// Every image gets one [`CanonicalMatcher`] per pattern. A pattern's keep is
/// taken from the pattern itself, then from the image, then defaults to 5.
///
/// # Errors
///
/// Returns every validation failure in the batch if any entry is invalid,
/// or [`EmptyConfiguration`](crate::validation::ValidationErrorKind::EmptyConfiguration)
/// for an empty batch.
///
/// # Examples
///
/// ```
/// use hubcycle_core::{normalize, RawImageEntry};
///
/// let entries = vec![RawImageEntry::new("strongeleeroy/registry", "develop-.*").with_keep(2)];
/// let canonical = normalize(&entries).unwrap();
///
/// assert_eq!(canonical[0].patterns.len(), 1);
/// assert_eq!(canonical[0].patterns[0].keep(), 2);
/// ```
pub fn normalize(entries: &[RawImageEntry]) -> Result<Vec<CanonicalImageEntry>, ValidationErrors> {
    if entries.is_empty() {
        return Err(ValidationError::empty_configuration().into());
    }

    let mut errors = ValidationErrors::new();
    let mut canonical = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match canonicalize(entry) {
            Ok(image) => canonical.push(image),
            Err(inner) => errors.merge_prefixed(inner, &format!("images[{index}]")),
        }
    }

    errors.into_result().map(|()| canonical)
}

fn canonicalize(entry: &RawImageEntry) -> Result<CanonicalImageEntry, ValidationErrors> {
    entry.validate()?;

    // Validation guarantees a string name and a non-empty, supported match.
    let name = entry.name_str().unwrap_or_default().to_string();
    let image_keep = entry.keep.as_ref();

    let patterns = match &entry.matches {
        Some(RawMatch::Shorthand(expression)) => {
            vec![matcher(&name, "match", expression, &[image_keep])?]
        }
        Some(RawMatch::Explicit(matchers)) => matchers
            .iter()
            .enumerate()
            .map(|(index, m)| {
                matcher(
                    &name,
                    &format!("match[{index}].expression"),
                    &m.expression,
                    &[m.keep.as_ref(), image_keep],
                )
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(RawMatch::Unsupported(_)) | None => {
            return Err(ValidationError::match_shape("match", "unsupported match").into())
        }
    };

    Ok(CanonicalImageEntry { name, patterns })
}

fn matcher(
    image: &str,
    field: &str,
    expression: &str,
    candidates: &[Option<&KeepValue>],
) -> Result<CanonicalMatcher, ValidationError> {
    let pattern = compile_pattern(field, expression)?;
    let resolved = resolve_keep(candidates);
    let keep = usize::try_from(resolved).unwrap_or_else(|_| {
        warn!(
            image,
            expression,
            keep = resolved,
            "negative keep, every matching tag will be purged"
        );
        0
    });
    Ok(CanonicalMatcher::new(pattern, keep))
}

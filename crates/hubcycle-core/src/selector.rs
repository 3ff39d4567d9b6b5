//! Tag selection: which tags a retention rule marks for deletion.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Anything that has a tag name and a last-updated timestamp.
///
/// Registry records carry far more than this; the selector only needs these
/// two fields and projects every record down to a [`Tag`].
pub trait TagRecord {
    /// The tag name, e.g. `develop-042`.
    fn name(&self) -> &str;

    /// When the tag was last pushed.
    fn last_updated(&self) -> DateTime<Utc>;
}

/// The minimal view of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Last update time.
    pub last_updated: DateTime<Utc>,
}

impl Tag {
    /// Creates a tag.
    pub fn new(name: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_updated,
        }
    }

    fn project<T: TagRecord + ?Sized>(record: &T) -> Self {
        Self::new(record.name(), record.last_updated())
    }
}

impl TagRecord for Tag {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}

/// Selects the tags to delete under one retention rule.
///
/// Tags whose name matches `pattern` are ordered most recent first (ties keep
/// their input order) and everything after the first `keep` is returned.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use hubcycle_core::{select_for_purge, Tag};
/// use regex::Regex;
///
/// let tags = vec![
///     Tag::new("develop-1", Utc.with_ymd_and_hms(2018, 9, 4, 0, 0, 0).unwrap()),
///     Tag::new("develop-2", Utc.with_ymd_and_hms(2018, 10, 16, 0, 0, 0).unwrap()),
///     Tag::new("master-1", Utc.with_ymd_and_hms(2018, 12, 5, 0, 0, 0).unwrap()),
/// ];
/// let pattern = Regex::new("develop-.*").unwrap();
///
/// let purge = select_for_purge(&tags, &pattern, 1);
/// assert_eq!(purge.len(), 1);
/// assert_eq!(purge[0].name, "develop-1");
/// ```
#[must_use]
pub fn select_for_purge<T: TagRecord>(tags: &[T], pattern: &Regex, keep: usize) -> Vec<Tag> {
    let mut matching: Vec<Tag> = tags
        .iter()
        .filter(|tag| pattern.is_match(tag.name()))
        .map(Tag::project)
        .collect();

    matching.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    matching.into_iter().skip(keep).collect()
}

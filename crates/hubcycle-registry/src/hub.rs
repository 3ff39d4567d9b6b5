//! Docker Hub API wire types.

use chrono::{DateTime, Utc};
use hubcycle_core::TagRecord;
use serde::{Deserialize, Serialize};

/// Request body of the login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account name.
    pub username: &'a str,
    /// Password or personal access token.
    pub password: &'a str,
}

/// Response body of the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Token sent back as `Authorization: JWT <token>`.
    pub token: String,
}

/// One page of a repository tag listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagsPage {
    /// Total number of tags in the repository.
    #[serde(default)]
    pub count: u64,

    /// Absolute URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,

    /// Absolute URL of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,

    /// Tags on this page.
    #[serde(default)]
    pub results: Vec<RepositoryTag>,
}

/// A tag as reported by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryTag {
    /// Tag name.
    pub name: String,

    /// Compressed size of the largest image, in bytes.
    #[serde(default)]
    pub full_size: Option<u64>,

    /// Per-platform images behind the tag.
    #[serde(default)]
    pub images: Vec<TagImage>,

    /// Registry identifier of the tag.
    #[serde(default)]
    pub id: Option<u64>,

    /// Registry identifier of the repository.
    #[serde(default)]
    pub repository: Option<u64>,

    /// Account id that created the tag.
    #[serde(default)]
    pub creator: Option<u64>,

    /// Account id that last pushed the tag.
    #[serde(default)]
    pub last_updater: Option<u64>,

    /// Last push time. Tags without one sort as the oldest.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    /// Image id, usually null on v2 repositories.
    #[serde(default)]
    pub image_id: Option<String>,

    /// Whether the tag was pushed through the v2 API.
    #[serde(default)]
    pub v2: bool,
}

impl RepositoryTag {
    /// Creates a tag with only a name and push time set.
    pub fn new(name: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            full_size: None,
            images: Vec::new(),
            id: None,
            repository: None,
            creator: None,
            last_updater: None,
            last_updated: Some(last_updated),
            image_id: None,
            v2: true,
        }
    }
}

impl TagRecord for RepositoryTag {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A platform-specific image referenced by a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagImage {
    /// Content digest.
    #[serde(default)]
    pub digest: Option<String>,

    /// CPU architecture.
    #[serde(default)]
    pub architecture: Option<String>,

    /// Operating system.
    #[serde(default)]
    pub os: Option<String>,

    /// Architecture variant, e.g. `v8`.
    #[serde(default)]
    pub variant: Option<String>,

    /// Compressed size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

//! Purge orchestration.
//!
//! The [`Purger`] walks every (image, pattern) pair of a canonical
//! configuration, asks the registry for the image's tags, selects the purge
//! candidates and deletes them one by one. Deletion failures are recorded per
//! tag and never abort the run.

use hubcycle_core::{select_for_purge, CanonicalImageEntry, CanonicalMatcher};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::RegistryClient;
use crate::error::RegistryError;

/// Outcome of purging one pattern of one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeResult {
    /// Full references (`image:tag`) that were deleted.
    pub success: Vec<String>,

    /// Full references (`image:tag`) whose deletion failed.
    pub failure: Vec<String>,
}

impl PurgeResult {
    /// Number of tags attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.success.len() + self.failure.len()
    }
}

/// Outcome of a whole purge cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    /// Full references that were deleted.
    pub success: Vec<String>,

    /// Full references whose deletion failed.
    pub failure: Vec<String>,

    /// Number of (image, pattern) pairs whose tags could not be fetched.
    pub skipped: usize,
}

impl PurgeSummary {
    /// Folds one pattern result into the summary.
    pub fn record(&mut self, result: PurgeResult) {
        self.success.extend(result.success);
        self.failure.extend(result.failure);
    }

    /// Returns true if nothing failed or was skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failure.is_empty() && self.skipped == 0
    }
}

/// Deletes surplus tags through a [`RegistryClient`].
#[derive(Debug)]
pub struct Purger<C> {
    client: C,
    dry_run: bool,
}

impl<C: RegistryClient> Purger<C> {
    /// Creates a purger. In dry mode no delete request is ever sent.
    pub const fn new(client: C, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Returns true if deletions are only logged.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Purges the tags of `image` selected by one matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag list cannot be fetched. Individual
    /// deletion failures are recorded in [`PurgeResult::failure`].
    pub async fn purge_pattern(
        &self,
        image: &str,
        matcher: &CanonicalMatcher,
    ) -> Result<PurgeResult, RegistryError> {
        let tags = self.client.fetch_tags(image).await?;
        let candidates = select_for_purge(&tags, matcher.pattern(), matcher.keep());

        debug!(
            image,
            expression = matcher.expression(),
            keep = matcher.keep(),
            total = tags.len(),
            candidates = candidates.len(),
            "selected tags for purge"
        );

        let mut result = PurgeResult::default();
        for tag in candidates {
            let reference = format!("{image}:{}", tag.name);

            if self.dry_run {
                info!("DRY-RUN - Tag {reference} was deleted");
                result.success.push(reference);
                continue;
            }

            match self.client.delete_tag(image, &tag.name).await {
                Ok(()) => {
                    info!("Tag {reference} was deleted");
                    result.success.push(reference);
                }
                Err(e) => {
                    warn!(error = %e, "Tag {reference} could not be deleted");
                    result.failure.push(reference);
                }
            }
        }

        Ok(result)
    }

    /// Runs every (image, pattern) pair of the configuration in order.
    pub async fn purge_all(&self, configuration: &[CanonicalImageEntry]) -> PurgeSummary {
        let mut summary = PurgeSummary::default();

        for entry in configuration {
            for matcher in &entry.patterns {
                match self.purge_pattern(&entry.name, matcher).await {
                    Ok(result) => summary.record(result),
                    Err(e) => {
                        warn!(
                            image = %entry.name,
                            expression = matcher.expression(),
                            error = %e,
                            "failed to fetch tags"
                        );
                        summary.skipped += 1;
                    }
                }
            }
        }

        info!(
            deleted = summary.success.len(),
            failed = summary.failure.len(),
            skipped = summary.skipped,
            dry_run = self.dry_run,
            "purge cycle complete"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::RepositoryTag;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use hubcycle_core::{normalize, RawImageEntry, RawMatcher};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// In-memory registry.
    #[derive(Debug, Default)]
    struct MockRegistry {
        tags: HashMap<String, Vec<RepositoryTag>>,
        failing_deletes: Vec<String>,
        deleted: Mutex<Vec<String>>,
    }

    impl MockRegistry {
        fn with_image(mut self, image: &str, tags: &[(&str, u32)]) -> Self {
            let tags = tags
                .iter()
                .map(|(name, day)| {
                    RepositoryTag::new(*name, Utc.with_ymd_and_hms(2018, 11, *day, 0, 0, 0).unwrap())
                })
                .collect();
            self.tags.insert(image.to_string(), tags);
            self
        }

        fn failing(mut self, tag: &str) -> Self {
            self.failing_deletes.push(tag.to_string());
            self
        }
    }

    #[async_trait]
    impl RegistryClient for MockRegistry {
        async fn fetch_tags(&self, image: &str) -> Result<Vec<RepositoryTag>, RegistryError> {
            self.tags
                .get(image)
                .cloned()
                .ok_or_else(|| RegistryError::NotFound {
                    image: image.to_string(),
                })
        }

        async fn delete_tag(&self, image: &str, tag: &str) -> Result<(), RegistryError> {
            if self.failing_deletes.iter().any(|t| t == tag) {
                return Err(RegistryError::HttpError {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            self.deleted.lock().await.push(format!("{image}:{tag}"));
            Ok(())
        }
    }

    fn registry() -> MockRegistry {
        MockRegistry::default().with_image(
            "org/app",
            &[
                ("develop-001", 1),
                ("develop-002", 2),
                ("develop-003", 3),
                ("develop-004", 4),
                ("master-001", 5),
            ],
        )
    }

    fn configuration(entries: &[RawImageEntry]) -> Vec<CanonicalImageEntry> {
        normalize(entries).unwrap()
    }

    #[tokio::test]
    async fn test_purge_pattern_deletes_oldest() {
        let purger = Purger::new(registry(), false);
        let config = configuration(&[RawImageEntry::new("org/app", "develop-.*").with_keep(2)]);

        let result = purger
            .purge_pattern("org/app", &config[0].patterns[0])
            .await
            .unwrap();

        assert_eq!(result.success, vec!["org/app:develop-002", "org/app:develop-001"]);
        assert!(result.failure.is_empty());
        assert_eq!(
            *purger.client.deleted.lock().await,
            vec!["org/app:develop-002", "org/app:develop-001"]
        );
    }

    #[tokio::test]
    async fn test_dry_run_never_deletes() {
        let purger = Purger::new(registry(), true);
        let config = configuration(&[RawImageEntry::new("org/app", "develop-.*").with_keep(1)]);

        let summary = purger.purge_all(&config).await;

        assert!(purger.is_dry_run());
        assert_eq!(summary.success.len(), 3);
        assert!(purger.client.deleted.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_is_isolated() {
        let purger = Purger::new(registry().failing("develop-002"), false);
        let config = configuration(&[RawImageEntry::new("org/app", "develop-.*").with_keep(1)]);

        let result = purger
            .purge_pattern("org/app", &config[0].patterns[0])
            .await
            .unwrap();

        assert_eq!(result.success, vec!["org/app:develop-003", "org/app:develop-001"]);
        assert_eq!(result.failure, vec!["org/app:develop-002"]);
        assert_eq!(result.attempted(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_pair_only() {
        let purger = Purger::new(registry(), false);
        let config = configuration(&[
            RawImageEntry::new("org/missing", "develop-.*"),
            RawImageEntry::new(
                "org/app",
                vec![
                    RawMatcher::new("develop-.*").with_keep(3),
                    RawMatcher::new("master-.*").with_keep(1),
                ],
            ),
        ]);

        let summary = purger.purge_all(&config).await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.success, vec!["org/app:develop-001"]);
        assert!(!summary.is_clean());
    }

    #[tokio::test]
    async fn test_nothing_to_purge() {
        let purger = Purger::new(registry(), false);
        let config = configuration(&[RawImageEntry::new("org/app", "master-.*")]);

        let summary = purger.purge_all(&config).await;

        assert!(summary.success.is_empty());
        assert!(summary.is_clean());
    }
}

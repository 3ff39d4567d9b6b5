//! # Hubcycle Registry
//!
//! Docker Hub client and tag purger for hubcycle.
//!
//! This crate talks to the registry on behalf of the retention engine in
//! `hubcycle-core`: it logs in, lists repository tags page by page, and
//! deletes the tags the engine selects.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hubcycle_core::{normalize, RawImageEntry};
//! use hubcycle_registry::{Credentials, DockerHubClient, Purger, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("user", "secret");
//!     let client = DockerHubClient::login(RegistryConfig::default(), &credentials).await?;
//!
//!     let configuration = normalize(&[RawImageEntry::new("org/app", "develop-.*")])?;
//!     let summary = Purger::new(client, true).purge_all(&configuration).await;
//!     println!("{} tags would be deleted", summary.success.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Purger                     │
//! │   fetch tags ─► select_for_purge ─► delete   │
//! └──────────────────────┬───────────────────────┘
//!                        │ RegistryClient
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │  DockerHubClient (JWT login, paginated tags) │
//! └──────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod config;
mod error;
mod hub;
mod purge;

pub use client::{DockerHubClient, RegistryClient};
pub use config::{Credentials, RegistryConfig, DOCKER_HUB_URL};
pub use error::RegistryError;
pub use hub::{RepositoryTag, TagImage, TagsPage};
pub use purge::{PurgeResult, PurgeSummary, Purger};

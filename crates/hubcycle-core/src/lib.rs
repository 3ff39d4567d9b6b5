//! # hubcycle Core
//!
//! Retention policy engine for hubcycle, the registry tag cleaner.
//!
//! This crate holds the two pieces of logic that decide what gets deleted:
//!
//! - [`normalize`] - validates user configuration and resolves it into
//!   [`CanonicalImageEntry`] values, one compiled pattern and one concrete
//!   keep per matcher
//! - [`select_for_purge`] - given tags and one rule, returns the tags to delete
//!
//! plus the configuration sources feeding the normalizer:
//!
//! - [`ConfigLoader`] - `images.json` / `images.yaml` with environment fallback
//! - [`Environment`] - settings read once from the process environment
//!
//! Nothing in this crate performs network I/O.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use hubcycle_core::{normalize, select_for_purge, RawImageEntry, RawMatcher, Tag};
//!
//! let entries = vec![RawImageEntry::new(
//!     "strongeleeroy/hubcycle",
//!     vec![RawMatcher::new("develop-.*").with_keep(1)],
//! )];
//! let configuration = normalize(&entries).unwrap();
//! let matcher = &configuration[0].patterns[0];
//!
//! let tags = vec![
//!     Tag::new("develop-2", Utc.with_ymd_and_hms(2018, 12, 5, 10, 0, 0).unwrap()),
//!     Tag::new("develop-1", Utc.with_ymd_and_hms(2018, 9, 4, 16, 0, 0).unwrap()),
//! ];
//! let purge = select_for_purge(&tags, matcher.pattern(), matcher.keep());
//! assert_eq!(purge[0].name, "develop-1");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod environment;
pub mod error;
pub mod keep;
pub mod loader;
pub mod normalize;
pub mod selector;
pub mod validation;


pub use config::{CanonicalImageEntry, CanonicalMatcher, RawImageEntry, RawMatch, RawMatcher};
pub use environment::{environment_configuration, Environment};
pub use error::{ConfigError, Result};
pub use keep::{is_valid_keep, resolve_keep, KeepValue, DEFAULT_KEEP};
pub use loader::{load_file, ConfigDocument, ConfigFormat, ConfigLoader};
pub use normalize::normalize;
pub use selector::{select_for_purge, Tag, TagRecord};
pub use validation::{
    is_valid_image_name, Validate, ValidationError, ValidationErrorKind, ValidationErrors,
};

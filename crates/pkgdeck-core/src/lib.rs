//! Core abstractions for pkgdeck.
//!
//! This crate provides the pieces shared by the presentation engines
//! (version history, README rendering, command synthesis):
//!
//! - **Version ordering**: lenient, total ordering of registry version strings
//! - **Registry model**: the package document and per-version records
//! - **Memoization**: single-flight cache for expensive per-package fetches
//! - **Error Types**: unified error handling across the workspace
//!
//! # Examples
//!
//! ```
//! use pkgdeck_core::{PackageDocument, compare_versions};
//! use std::cmp::Ordering;
//!
//! let doc = PackageDocument::from_json(
//!     r#"{"name": "ms", "versions": {"2.1.3": {}}, "dist-tags": {"latest": "2.1.3"}}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(doc.latest_version(), Some("2.1.3"));
//! assert_eq!(compare_versions("2.1.3", "2.1.2"), Ordering::Greater);
//! ```

pub mod cache;
pub mod error;
pub mod version;
pub mod types;

// Re-export commonly used types
pub use cache::{MemoCache, SharedResult};
pub use error::{DeckError, Result};
pub use version::{
    ParsedVersion, compare_versions, compare_versions_desc, parse_loose, sort_newest_first,
};
pub use types::{
    BinField, DistInfo, JsrInfo, LATEST_TAG, PackageDocument, VersionDetail, VersionRecord,
};

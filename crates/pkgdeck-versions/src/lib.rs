//! Version grouping for pkgdeck.
//!
//! Turns a flat list of published versions into release lines annotated with
//! dist-tags, and loads the complete history when a line is expanded.
//!
//! # Examples
//!
//! ```
//! use pkgdeck_core::PackageDocument;
//! use pkgdeck_versions::{ReleaseLineKey, ReleaseLines};
//!
//! let doc = PackageDocument::from_json(r#"{
//!     "name": "vite",
//!     "versions": { "4.5.0": {}, "5.0.0": {}, "5.1.2": {} },
//!     "dist-tags": { "latest": "5.1.2", "previous": "4.5.0" }
//! }"#).unwrap();
//!
//! let lines = ReleaseLines::from_document(&doc);
//! assert_eq!(lines.lines()[0].key(), ReleaseLineKey::Major(5));
//! assert_eq!(lines.tags_for("4.5.0"), ["previous"]);
//! ```

pub mod history;
pub mod lines;
pub mod tags;

pub use history::{HistorySource, VersionHistory};
pub use lines::{ParseLineKeyError, ReleaseLine, ReleaseLineKey, ReleaseLines, TaggedVersion};
pub use tags::DistTagIndex;

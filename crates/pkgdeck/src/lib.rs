//! pkgdeck: presentation core for npm package pages.
//!
//! Ties the engines together behind one [`DeckConfig`]:
//!
//! - [`pkgdeck_versions`]: release lines, dist-tags and the full-history loader
//! - [`pkgdeck_readme`]: README Markdown to sanitized HTML
//! - [`pkgdeck_install`]: install, execute and run commands per package manager
//!
//! [`PackagePresenter`] computes everything a package page shows from one
//! registry document. Nothing here performs network access; the full
//! history comes from an injected [`HistorySource`](pkgdeck_versions::HistorySource).

pub mod config;
pub mod presenter;
pub mod source;

pub use config::{DeckConfig, HistoryConfig, InstallConfig};
pub use presenter::{CommandSet, PackagePresenter, PackageSummary, SummaryRequest, jsr_from_id};
pub use source::DocumentFileSource;

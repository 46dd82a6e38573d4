//! History sources backed by local files.

use async_trait::async_trait;
use pkgdeck_core::{DeckError, PackageDocument, Result, VersionRecord};
use pkgdeck_versions::HistorySource;
use std::path::PathBuf;

/// Serves the full version history from a saved registry document.
///
/// The file is read on every fetch; [`VersionHistory`] memoizes the result.
///
/// [`VersionHistory`]: pkgdeck_versions::VersionHistory
#[derive(Debug, Clone)]
pub struct DocumentFileSource {
    path: PathBuf,
}

impl DocumentFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HistorySource for DocumentFileSource {
    async fn fetch_history(&self, package: &str) -> Result<Vec<VersionRecord>> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DeckError::history_fetch(package, e))?;
        let doc = PackageDocument::from_json(&json)?;

        if doc.name != package {
            return Err(DeckError::history_fetch(
                package,
                format!("{} holds the history of {}", self.path.display(), doc.name),
            ));
        }

        Ok(doc.version_records())
    }
}

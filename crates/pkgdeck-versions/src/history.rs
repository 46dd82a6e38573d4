//! On-demand loading of the full version history.
//!
//! The initial package document may carry an abbreviated version list. When
//! the user expands a release line the complete history is fetched through a
//! [`HistorySource`], at most once per package no matter how many lines are
//! expanded concurrently.

use async_trait::async_trait;
use pkgdeck_core::{DeckError, MemoCache, Result, SharedResult, VersionRecord, sort_newest_first};
use std::sync::Arc;

use crate::lines::{ReleaseLineKey, ReleaseLines};

/// Provider of a package's complete version history.
///
/// Implementations typically call a registry; the presentation core never
/// performs I/O on its own.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetches every published version of `package`, in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be retrieved.
    async fn fetch_history(&self, package: &str) -> Result<Vec<VersionRecord>>;
}

/// Memoized, single-flight history loader.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use pkgdeck_core::{Result, VersionRecord};
/// use pkgdeck_versions::{HistorySource, VersionHistory};
/// use std::sync::Arc;
///
/// struct Fixed;
///
/// #[async_trait]
/// impl HistorySource for Fixed {
///     async fn fetch_history(&self, _package: &str) -> Result<Vec<VersionRecord>> {
///         Ok(vec![VersionRecord::new("1.0.0"), VersionRecord::new("2.0.0")])
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let history = VersionHistory::new(Arc::new(Fixed));
/// let records = history.expand("left-pad").await;
/// assert_eq!(records[0].version, "2.0.0");
/// # }
/// ```
pub struct VersionHistory {
    source: Arc<dyn HistorySource>,
    cache: MemoCache<Arc<[VersionRecord]>>,
}

impl VersionHistory {
    pub fn new(source: Arc<dyn HistorySource>) -> Self {
        Self {
            source,
            cache: MemoCache::new(),
        }
    }

    /// Creates a loader remembering at most `max_packages` histories.
    pub fn with_capacity(source: Arc<dyn HistorySource>, max_packages: usize) -> Self {
        Self {
            source,
            cache: MemoCache::with_capacity(max_packages),
        }
    }

    /// Loads the full history of `package`, newest first.
    ///
    /// Concurrent calls for the same package share one fetch. A successful
    /// result is reused by every later call; a failure is not remembered.
    ///
    /// # Errors
    ///
    /// Returns the source's error, shared between all callers of the failed
    /// attempt.
    pub async fn load(&self, package: &str) -> SharedResult<Arc<[VersionRecord]>> {
        let source = Arc::clone(&self.source);
        let package_owned = package.to_string();

        self.cache
            .get_or_fetch(package, move || async move {
                let mut records = source.fetch_history(&package_owned).await?;
                sort_newest_first(&mut records, |record| record.version.as_str());
                tracing::debug!(
                    package = %package_owned,
                    versions = records.len(),
                    "loaded version history"
                );
                Ok::<_, DeckError>(Arc::from(records))
            })
            .await
    }

    /// Loads the full history, degrading to an empty list on failure.
    ///
    /// Callers of this method keep showing what they already have; the
    /// failure is logged and the next call retries.
    pub async fn expand(&self, package: &str) -> Arc<[VersionRecord]> {
        match self.load(package).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(package, error = %e, "failed to load version history");
                Arc::from(Vec::new())
            }
        }
    }

    /// Loads the full history of one release line, newest first.
    ///
    /// Shares the per-package fetch with [`expand`](Self::expand), so
    /// expanding several lines of one package costs a single fetch.
    pub async fn expand_line(&self, package: &str, key: ReleaseLineKey) -> Vec<VersionRecord> {
        self.expand(package)
            .await
            .iter()
            .filter(|record| ReleaseLineKey::for_version(&record.version) == key)
            .cloned()
            .collect()
    }

    /// Merges the full history into an already grouped listing and returns
    /// `true` once it is fully loaded.
    ///
    /// An empty history still marks every line as loaded. On failure the
    /// error is logged, `lines` is left untouched and `false` is returned.
    pub async fn expand_all(&self, package: &str, lines: &mut ReleaseLines) -> bool {
        match self.load(package).await {
            Ok(history) => {
                lines.merge_history(&history);
                true
            }
            Err(e) => {
                tracing::warn!(package, error = %e, "failed to load version history");
                false
            }
        }
    }

    /// Returns the history if it has already been loaded.
    pub fn cached(&self, package: &str) -> Option<Arc<[VersionRecord]>> {
        self.cache.get_completed(package)
    }

    /// Forgets the history of `package`.
    pub fn invalidate(&self, package: &str) {
        self.cache.invalidate(package);
    }

    /// Forgets every loaded history.
    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
        fail: AtomicBool,
        versions: Vec<&'static str>,
    }

    impl CountingSource {
        fn new(versions: Vec<&'static str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                versions,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HistorySource for CountingSource {
        async fn fetch_history(&self, package: &str) -> Result<Vec<VersionRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(DeckError::history_fetch(package, "registry unavailable"));
            }
            Ok(self.versions.iter().copied().map(VersionRecord::new).collect())
        }
    }

    #[tokio::test]
    async fn test_load_sorts_newest_first() {
        let source = Arc::new(CountingSource::new(vec!["1.0.0", "1.10.0", "1.2.0"]));
        let history = VersionHistory::new(source);

        let records = history.load("chalk").await.unwrap();
        let versions: Vec<&str> = records.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["1.10.0", "1.2.0", "1.0.0"]);
    }

    #[tokio::test]
    async fn test_concurrent_expands_fetch_once() {
        let source = Arc::new(CountingSource::new(vec!["1.0.0", "2.0.0", "3.0.0"]));
        let history = VersionHistory::new(Arc::clone(&source) as Arc<dyn HistorySource>);

        let (a, b, c) = tokio::join!(
            history.expand("react"),
            history.expand("react"),
            history.expand("react"),
        );

        assert_eq!(source.calls(), 1);
        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
        assert_eq!(b, c);

        history.expand("react").await;
        assert_eq!(source.calls(), 1);
        assert!(history.cached("react").is_some());
    }

    #[tokio::test]
    async fn test_failure_degrades_and_retries() {
        let source = Arc::new(CountingSource::new(vec!["1.0.0"]));
        source.fail.store(true, Ordering::SeqCst);
        let history = VersionHistory::new(Arc::clone(&source) as Arc<dyn HistorySource>);

        let empty = history.expand("lodash").await;
        assert!(empty.is_empty());
        assert!(history.cached("lodash").is_none());

        source.fail.store(false, Ordering::SeqCst);
        let records = history.expand("lodash").await;
        assert_eq!(records.len(), 1);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_load_reports_error() {
        let source = Arc::new(CountingSource::new(vec![]));
        source.fail.store(true, Ordering::SeqCst);
        let history = VersionHistory::new(source);

        let err = history.load("left-pad").await.unwrap_err();
        assert!(matches!(*err, DeckError::HistoryFetch { .. }));
    }

    #[tokio::test]
    async fn test_expand_line_filters_one_line() {
        let source = Arc::new(CountingSource::new(vec!["1.0.0", "2.1.0", "0.3.0", "1.1.0", "2.0.0"]));
        let history = VersionHistory::new(Arc::clone(&source) as Arc<dyn HistorySource>);

        let ones = history.expand_line("koa", ReleaseLineKey::Major(1)).await;
        let versions: Vec<&str> = ones.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["1.1.0", "1.0.0"]);

        let zeros = history.expand_line("koa", ReleaseLineKey::Minor(3)).await;
        assert_eq!(zeros.len(), 1);
        assert!(history.expand_line("koa", ReleaseLineKey::Major(9)).await.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_expand_all_merges_history() {
        let source = Arc::new(CountingSource::new(vec!["1.0.0", "1.1.0", "2.0.0", "2.1.0"]));
        let history = VersionHistory::new(Arc::clone(&source) as Arc<dyn HistorySource>);

        let mut lines = ReleaseLines::group([VersionRecord::new("2.1.0")], [("latest", "2.1.0")]);
        assert!(lines.line(ReleaseLineKey::Major(1)).is_none());

        assert!(history.expand_all("koa", &mut lines).await);
        let line = lines.line(ReleaseLineKey::Major(1)).unwrap();
        assert_eq!(line.count(), 2);
        assert!(line.is_fully_loaded());
        assert_eq!(lines.total_versions(), 4);
    }

    #[tokio::test]
    async fn test_expand_all_failure_keeps_lines() {
        let source = Arc::new(CountingSource::new(vec![]));
        source.fail.store(true, Ordering::SeqCst);
        let history = VersionHistory::new(source);

        let mut lines = ReleaseLines::group([VersionRecord::new("2.1.0")], [("latest", "2.1.0")]);
        assert!(!history.expand_all("koa", &mut lines).await);
        assert_eq!(lines.total_versions(), 1);
        assert!(!lines.lines()[0].is_fully_loaded());
    }

    #[tokio::test]
    async fn test_expand_all_empty_history_marks_loaded() {
        let source = Arc::new(CountingSource::new(vec![]));
        let history = VersionHistory::new(Arc::clone(&source) as Arc<dyn HistorySource>);

        let mut lines = ReleaseLines::group([VersionRecord::new("2.1.0")], [("latest", "2.1.0")]);
        assert!(history.expand_all("koa", &mut lines).await);
        assert_eq!(lines.total_versions(), 1);
        assert!(lines.lines()[0].is_fully_loaded());
        assert_eq!(lines.tags_for("2.1.0"), ["latest"]);

        assert!(history.expand_all("koa", &mut lines).await);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_refetches() {
        let source = Arc::new(CountingSource::new(vec!["1.0.0"]));
        let history = VersionHistory::new(Arc::clone(&source) as Arc<dyn HistorySource>);

        history.expand("ms").await;
        history.invalidate("ms");
        history.expand("ms").await;
        assert_eq!(source.calls(), 2);

        history.clear();
        assert!(history.cached("ms").is_none());
    }
}

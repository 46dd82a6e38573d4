use crate::error::{DeckError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default maximum number of memoized keys.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Outcome shared between every caller waiting on the same fetch.
///
/// The error is wrapped in `Arc` so one failure can be handed to all
/// waiters.
pub type SharedResult<V> = std::result::Result<V, Arc<DeckError>>;

type SharedFetch<V> = Shared<BoxFuture<'static, SharedResult<V>>>;

struct MemoEntry<V: Clone> {
    fetch: SharedFetch<V>,
    inserted: u64,
}

/// Single-flight memoization keyed by string.
///
/// Each key maps to one shared future. The first caller for a key starts
/// the fetch; callers arriving while it is in flight await the same future
/// instead of starting another one. Successful results stay cached until
/// evicted or invalidated. Failed results are handed to every caller that
/// was waiting on that attempt and then dropped, so a later call retries.
///
/// # Examples
///
/// ```
/// use pkgdeck_core::cache::MemoCache;
/// use pkgdeck_core::DeckError;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache: MemoCache<u32> = MemoCache::new();
///
/// let first = cache.get_or_fetch("answer", || async { Ok::<_, DeckError>(42) }).await;
/// assert_eq!(first.unwrap(), 42);
///
/// // The second fetch closure never runs.
/// let second = cache.get_or_fetch("answer", || async { Ok::<_, DeckError>(0) }).await;
/// assert_eq!(second.unwrap(), 42);
/// # }
/// ```
pub struct MemoCache<V: Clone + Send + Sync + 'static> {
    entries: DashMap<String, MemoEntry<V>>,
    max_entries: usize,
    insertions: AtomicU64,
}

impl<V: Clone + Send + Sync + 'static> MemoCache<V> {
    /// Creates a cache holding at most [`DEFAULT_MAX_ENTRIES`] keys.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Creates a cache holding at most `max_entries` keys.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            insertions: AtomicU64::new(0),
        }
    }

    /// Returns the memoized value for `key`, running `fetch` at most once
    /// across concurrent callers.
    ///
    /// `fetch` is invoked while the map shard for `key` is locked and must
    /// only construct the future; the future itself runs outside the lock.
    ///
    /// # Errors
    ///
    /// Returns the error produced by the fetch this call (or the in-flight
    /// fetch it joined) awaited. The error is not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> SharedResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(key) {
            self.evict_entries();
        }

        let shared = match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(key, "joining memoized fetch");
                entry.get().fetch.clone()
            }
            Entry::Vacant(entry) => {
                tracing::debug!(key, "starting fetch");
                let fetch = fetch().map(|result| result.map_err(Arc::new)).boxed().shared();
                entry.insert(MemoEntry {
                    fetch: fetch.clone(),
                    inserted: self.insertions.fetch_add(1, Ordering::Relaxed),
                });
                fetch
            }
        };

        let result = shared.clone().await;

        if result.is_err() {
            // Only drop the attempt we awaited; a retry may already be in place.
            self.entries
                .remove_if(key, |_, entry| entry.fetch.ptr_eq(&shared));
        }

        result
    }

    /// Returns the cached value for `key` if its fetch completed successfully.
    pub fn get_completed(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        match entry.fetch.peek() {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns `true` if a fetch for `key` has started and not failed.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Forgets `key`, so the next call fetches again.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Clears all memoized entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of memoized keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts approximately 10% of completed entries, oldest first.
    ///
    /// In-flight fetches are never evicted: dropping them would let a
    /// concurrent caller start a duplicate fetch.
    fn evict_entries(&self) {
        let target_removals = (self.max_entries / 10).max(1);

        let mut completed: Vec<(String, u64)> = self
            .entries
            .iter()
            .filter(|entry| entry.value().fetch.peek().is_some())
            .map(|entry| (entry.key().clone(), entry.value().inserted))
            .collect();

        completed.sort_by_key(|(_, inserted)| *inserted);

        let mut removed = 0;
        for (key, _) in completed.iter().take(target_removals) {
            self.entries.remove(key);
            removed += 1;
        }

        tracing::debug!("evicted {} memoized entries", removed);
    }
}

impl<V: Clone + Send + Sync + 'static> Default for MemoCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

//! Session-lived content store shared by the router and the prefetcher.

use std::collections::HashMap;
use std::sync::Mutex;

use futures_util::future::{BoxFuture, Shared};

use crate::error::FetchError;

/// A fetch that may still be in flight, shareable between the prefetcher
/// (which drives it) and the router (which awaits it).
pub type PendingFetch = Shared<BoxFuture<'static, Result<String, FetchError>>>;

#[derive(Clone)]
enum CacheEntry {
    /// A prefetch that has been issued but not settled yet.
    Pending(PendingFetch),
    /// Settled content.
    Ready(String),
}

/// Mapping from exact target URL to raw fetched content.
///
/// Entries persist for the lifetime of the session; there is no eviction and
/// no size bound. An entry may initially be a still-running fetch inserted by
/// the prefetcher. [`contains`] treats such entries as present so no second
/// fetch is issued for the URL, and [`fetch`] awaits their settlement.
///
/// Presence check and value access are separate operations on purpose;
/// callers check [`contains`] before [`fetch`] rather than treating an empty
/// result as content. Check-and-insert happens under a single lock
/// acquisition ([`claim`]) to keep the at-most-one-fetch-per-URL guarantee
/// with real threads.
///
/// [`contains`]: ContentCache::contains
/// [`fetch`]: ContentCache::fetch
/// [`claim`]: ContentCache::claim
#[derive(Default)]
pub struct ContentCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ContentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an entry, settled or still pending, exists for `url`.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.lock().unwrap().contains_key(url)
    }

    /// Store settled content for `url`, replacing a pending entry.
    pub fn save(&self, url: &str, content: String) {
        self.entries
            .lock()
            .unwrap()
            .insert(url.to_owned(), CacheEntry::Ready(content));
    }

    /// Resolve the entry for `url`, awaiting a pending fetch if necessary.
    ///
    /// [`None`] means no entry exists. A pending entry that settled with an
    /// error yields that error; callers fall back to their own fetch.
    pub async fn fetch(&self, url: &str) -> Option<Result<String, FetchError>> {
        let entry = self.entries.lock().unwrap().get(url).cloned()?;
        match entry {
            CacheEntry::Ready(content) => Some(Ok(content)),
            CacheEntry::Pending(fetch) => Some(fetch.await),
        }
    }

    /// Atomically record `fetch` as the pending entry for `url`.
    ///
    /// Returns [`false`] without touching the map when any entry already
    /// exists; the caller must then drop its fetch unpolled.
    pub fn claim(&self, url: &str, fetch: PendingFetch) -> bool {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(url) {
            return false;
        }
        entries.insert(url.to_owned(), CacheEntry::Pending(fetch));
        true
    }

    /// Drop the entry for `url`, if any. Used to evict failed prefetches.
    pub fn remove(&self, url: &str) {
        self.entries.lock().unwrap().remove(url);
    }

    /// Number of entries, pending ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the cache holds no entry at all.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

use std::sync::Mutex;

use tracing::warn;

use super::{PopStateListener, SessionHistory};
use crate::navigation::NavigationState;

/// How a [`MemoryEntry`] was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// The entry was appended with `push_state`.
    Push,
    /// The entry replaced the current one with `replace_state`.
    Replace,
}

/// One recorded native-history entry.
#[derive(Clone, Debug)]
pub struct MemoryEntry {
    /// The serialized snapshot associated with the entry.
    pub payload: serde_json::Value,
    /// The title passed alongside the entry.
    pub title: String,
    /// The URL the entry points at.
    pub url: String,
    /// Whether the entry was pushed or replaced.
    pub kind: EntryKind,
}

#[derive(Default)]
struct MemoryHistoryInner {
    entries: Vec<MemoryEntry>,
    listener: Option<PopStateListener>,
    hard_navigations: Vec<String>,
}

/// A [`SessionHistory`] that stores all information in memory.
///
/// Snapshots are serialized to JSON on write and deserialized again when a
/// pop is emulated, so the round-trip matches what a browser integration
/// would do with its entry payloads.
pub struct MemoryHistory {
    start_href: String,
    inner: Mutex<MemoryHistoryInner>,
}

impl MemoryHistory {
    /// Create a history whose initial location is `start_href`.
    pub fn new(start_href: impl Into<String>) -> Self {
        Self {
            start_href: start_href.into(),
            inner: Mutex::new(MemoryHistoryInner::default()),
        }
    }

    /// Every entry written so far, oldest first.
    pub fn entries(&self) -> Vec<MemoryEntry> {
        self.inner.lock().unwrap().entries.clone()
    }

    /// Number of entries written with `push_state`.
    pub fn push_count(&self) -> usize {
        self.count(EntryKind::Push)
    }

    /// Number of entries written with `replace_state`.
    pub fn replace_count(&self) -> usize {
        self.count(EntryKind::Replace)
    }

    /// Full page loads requested through [`SessionHistory::hard_navigate`].
    pub fn hard_navigations(&self) -> Vec<String> {
        self.inner.lock().unwrap().hard_navigations.clone()
    }

    /// Deliver a back/forward event carrying `payload` to the registered
    /// listener, the way a browser delivers `popstate`.
    ///
    /// A payload that is absent or does not deserialize into a
    /// [`NavigationState`] is delivered as [`None`].
    pub fn emulate_pop(&self, payload: Option<serde_json::Value>) {
        let listener = self.inner.lock().unwrap().listener.clone();
        let Some(listener) = listener else {
            warn!("popstate emulated with no listener registered");
            return;
        };
        let state = payload.and_then(|p| serde_json::from_value(p).ok());
        listener(state);
    }

    fn count(&self, kind: EntryKind) -> usize {
        self.inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    fn record(&self, state: &NavigationState, title: &str, url: &str, kind: EntryKind) {
        let payload = match serde_json::to_value(state) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("could not serialize history snapshot: {err}");
                return;
            }
        };
        self.inner.lock().unwrap().entries.push(MemoryEntry {
            payload,
            title: title.to_owned(),
            url: url.to_owned(),
            kind,
        });
    }
}

impl SessionHistory for MemoryHistory {
    fn current_href(&self) -> String {
        self.inner
            .lock()
            .unwrap()
            .entries
            .last()
            .map(|e| e.url.clone())
            .unwrap_or_else(|| self.start_href.clone())
    }

    fn push_state(&self, state: &NavigationState, title: &str, url: &str) {
        self.record(state, title, url, EntryKind::Push);
    }

    fn replace_state(&self, state: &NavigationState, title: &str, url: &str) {
        self.record(state, title, url, EntryKind::Replace);
    }

    fn set_popstate_listener(&self, listener: Option<PopStateListener>) {
        self.inner.lock().unwrap().listener = listener;
    }

    fn hard_navigate(&self, url: &str) {
        self.inner
            .lock()
            .unwrap()
            .hard_navigations
            .push(url.to_owned());
    }
}

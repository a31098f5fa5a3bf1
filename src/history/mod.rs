//! History integration.
//!
//! The router relies on a [`SessionHistory`] implementation to talk to the
//! native session history (the browser's back/forward stack), and keeps its
//! own [`HistoryStack`] mirror of every snapshot it pushed so it can classify
//! back/forward events by direction.

use std::sync::Arc;

mod memory;
pub use memory::*;

use crate::navigation::{Direction, NavigationState};

/// Callback invoked when the native history moves to another entry
/// (a browser `popstate`).
///
/// The payload is the deserialized snapshot associated with the entry, or
/// [`None`] for entries the router never wrote a snapshot to.
pub type PopStateListener = Arc<dyn Fn(Option<NavigationState>) + Send + Sync>;

/// An integration with some kind of native session history.
///
/// Implementations persist each pushed or replaced entry together with the
/// serialized [`NavigationState`] snapshot, hand the snapshot back through
/// the registered [`PopStateListener`] on back/forward navigation, and are
/// able to abandon soft navigation entirely with [`hard_navigate`].
///
/// [`hard_navigate`]: SessionHistory::hard_navigate
pub trait SessionHistory: Send + Sync {
    /// Whether the environment supports programmatic history entries.
    ///
    /// When this is [`false`] the prefetcher stays inert and the router
    /// never pushes entries.
    fn supports_push(&self) -> bool {
        true
    }

    /// The location the session currently points at.
    fn current_href(&self) -> String;

    /// Append a new entry carrying `state` as its snapshot.
    fn push_state(&self, state: &NavigationState, title: &str, url: &str);

    /// Replace the current entry with one carrying `state` as its snapshot.
    ///
    /// Used once, for the very first boot; never called again afterwards.
    fn replace_state(&self, state: &NavigationState, title: &str, url: &str);

    /// Register the back/forward listener, or remove it with [`None`].
    ///
    /// Registering twice replaces a previous listener in the in-memory
    /// implementation; environments where registration appends (the browser)
    /// leave deduplication to the caller.
    fn set_popstate_listener(&self, listener: Option<PopStateListener>);

    /// Abandon soft navigation and perform a full load of `url`.
    ///
    /// The router falls back to this when a fetch fails or a response has no
    /// usable content region.
    fn hard_navigate(&self, url: &str);
}

/// An ordered mirror of the snapshots pushed to the native session history.
///
/// The top of the stack always reflects what the native history points at
/// after a push or replace; back/forward events are classified by locating
/// the incoming snapshot's position relative to the one currently shown.
#[derive(Default)]
pub struct HistoryStack {
    states: Vec<NavigationState>,
    current: usize,
}

impl HistoryStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot and make it the current position.
    pub fn push_state(&mut self, state: NavigationState) {
        self.states.push(state);
        self.current = self.states.len() - 1;
    }

    /// Classify an incoming raw snapshot as a back or forward navigation.
    ///
    /// Snapshots this stack never saw classify as [`Direction::Forward`] by
    /// convention. The matched position becomes the new current position.
    pub fn get_direction(&mut self, raw: &NavigationState) -> Direction {
        let Some(position) = self.states.iter().position(|s| s.uid() == raw.uid()) else {
            return Direction::Forward;
        };

        let direction = if position < self.current {
            Direction::Back
        } else {
            Direction::Forward
        };
        self.current = position;
        direction
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no snapshot has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

//! The transition seam: the visual handoff between old and new content is
//! owned by an external engine.

use async_trait::async_trait;
use futures_channel::oneshot;

use crate::content::ContentRegion;
use crate::navigation::{Direction, NavigationState};

/// Resolves once the incoming content region has been loaded, inserted into
/// the document and booted.
///
/// Resolving to [`None`] means the navigation did not complete: its fetch
/// failed or a newer navigation superseded it. Transitions should settle
/// their visuals and return in that case too.
pub struct ContentReceiver {
    rx: oneshot::Receiver<ContentRegion>,
}

impl ContentReceiver {
    pub(crate) fn new(rx: oneshot::Receiver<ContentRegion>) -> Self {
        Self { rx }
    }

    /// Wait for the incoming content region.
    pub async fn content(self) -> Option<ContentRegion> {
        self.rx.await.ok()
    }
}

/// One visual handoff.
///
/// The transition owns *when* the swap becomes visible relative to its
/// animation; the router only supplies [`ContentReceiver`], which settles
/// when the new content is in the document. Once started, a transition is
/// never cancelled; a superseded navigation simply hands it a [`None`]
/// content resolution.
#[async_trait]
pub trait Transition: Send + Sync {
    /// Drive the handoff from `current` (the displayed region, absent before
    /// the first boot) to the incoming content. Resolves when the visual
    /// sequence has fully ended.
    async fn init(&self, current: Option<ContentRegion>, incoming: ContentReceiver);
}

/// Selects the [`Transition`] variant for a navigation.
pub trait TransitionFactory: Send + Sync {
    /// Pick a transition for navigating from `previous` to `state`.
    ///
    /// `state.transition_name` carries the variant hint read from the
    /// triggering element, if any.
    fn get_transition(
        &self,
        previous: Option<&NavigationState>,
        state: &NavigationState,
        direction: Direction,
    ) -> Box<dyn Transition>;
}

/// A transition with no animation: waits for the content and completes.
pub struct InstantTransition;

#[async_trait]
impl Transition for InstantTransition {
    async fn init(&self, _current: Option<ContentRegion>, incoming: ContentReceiver) {
        let _ = incoming.content().await;
    }
}

/// Factory yielding [`InstantTransition`] for every navigation.
pub struct InstantTransitionFactory;

impl TransitionFactory for InstantTransitionFactory {
    fn get_transition(
        &self,
        _previous: Option<&NavigationState>,
        _state: &NavigationState,
        _direction: Direction,
    ) -> Box<dyn Transition> {
        Box::new(InstantTransition)
    }
}

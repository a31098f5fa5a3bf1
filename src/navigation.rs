//! Types describing a single navigation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::nav::ElementInfo;

/// The direction of a history-driven navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Navigating towards a newer entry. Unknown snapshots classify as
    /// forward by convention.
    Forward,
    /// Navigating towards an older entry.
    Back,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// Descriptors of the page being left, captured when a navigation is created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousPage {
    /// Node type of the page being left.
    pub node_type: Option<String>,
    /// Name of the page being left.
    pub name: Option<String>,
    /// Location the browser showed when the navigation was created.
    pub href: Option<String>,
}

static NEXT_UID: AtomicU64 = AtomicU64::new(1);

fn next_uid() -> u64 {
    NEXT_UID.fetch_add(1, Ordering::Relaxed)
}

/// An immutable snapshot describing one navigation.
///
/// A state is created synchronously on link activation or reconstructed from
/// the serialized snapshot a browser back/forward event returns. Once pushed
/// onto the [`HistoryStack`](crate::HistoryStack) its fields are never
/// mutated; follow-up information (e.g. the identity of the page that was
/// actually booted for it) produces a *new* snapshot via [`with_page`].
///
/// [`with_page`]: NavigationState::with_page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    uid: u64,
    /// Target URL of the navigation.
    pub href: String,
    /// Title to apply to the document on success.
    pub title: String,
    /// Whether this navigation targets the configured landing view.
    pub is_home: bool,
    /// The page being left.
    pub previous: PreviousPage,
    /// Optional hint selecting a transition variant, read from the
    /// triggering element.
    pub transition_name: Option<String>,
}

impl NavigationState {
    /// Snapshot for the very first page, taken from the current location.
    pub fn initial(href: impl Into<String>, title: impl Into<String>, is_home: bool) -> Self {
        Self {
            uid: next_uid(),
            href: href.into(),
            title: title.into(),
            is_home,
            previous: PreviousPage::default(),
            transition_name: None,
        }
    }

    /// Snapshot for a link activation.
    ///
    /// `href` is the already resolved target URL; element metadata supplies
    /// the title and transition hint, `previous` the descriptors of the page
    /// being left.
    pub fn from_link(
        href: impl Into<String>,
        link: &ElementInfo,
        previous: PreviousPage,
        is_home: bool,
    ) -> Self {
        Self {
            uid: next_uid(),
            href: href.into(),
            title: link.title.clone().unwrap_or_default(),
            is_home,
            previous,
            transition_name: link.transition_name.clone(),
        }
    }

    /// A copy of this snapshot carrying the identity of the page that was
    /// booted for it.
    ///
    /// The identity (`uid`) is preserved so direction computation keeps
    /// recognizing the snapshot after an ajax boot refreshed it.
    pub(crate) fn with_page(&self, name: Option<&str>, href: impl Into<String>) -> Self {
        let mut updated = self.clone();
        updated.href = href.into();
        if updated.title.is_empty() {
            if let Some(name) = name {
                updated.title = name.to_owned();
            }
        }
        updated
    }

    /// Identity of this snapshot within the session.
    pub fn uid(&self) -> u64 {
        self.uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_link_captures_previous_descriptors() {
        let link = ElementInfo {
            href: Some("/about".into()),
            title: Some("About".into()),
            transition_name: Some("slide".into()),
            ..Default::default()
        };
        let previous = PreviousPage {
            node_type: Some("page".into()),
            name: Some("home".into()),
            href: Some("https://example.org/".into()),
        };

        let state = NavigationState::from_link("https://example.org/about", &link, previous, false);

        assert_eq!(state.href, "https://example.org/about");
        assert_eq!(state.title, "About");
        assert_eq!(state.previous.name.as_deref(), Some("home"));
        assert_eq!(state.transition_name.as_deref(), Some("slide"));
        assert!(!state.is_home);
    }

    #[test]
    fn with_page_preserves_identity() {
        let state = NavigationState::initial("https://example.org/", "", true);
        let updated = state.with_page(Some("home"), "https://example.org/");

        assert_eq!(state.uid(), updated.uid());
        assert_eq!(updated.title, "home");
    }

    #[test]
    fn uids_are_unique() {
        let a = NavigationState::initial("/", "", true);
        let b = NavigationState::initial("/", "", true);
        assert_ne!(a.uid(), b.uid());
    }

    #[test]
    fn serializes_round_trip() {
        let state = NavigationState::initial("https://example.org/work", "Work", false);
        let json = serde_json::to_value(&state).unwrap();
        let back: NavigationState = serde_json::from_value(json).unwrap();
        assert_eq!(state, back);
    }
}

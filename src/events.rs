//! Typed lifecycle notifications.
//!
//! External code observes the navigation lifecycle through a broadcast
//! channel of [`RouterEvent`]s instead of an ambient global event bus; every
//! subscriber gets its own receiver from
//! [`RouterHandle::events`](crate::RouterHandle::events).

use std::sync::Arc;

use crate::content::ContentRegion;
use crate::error::LoadError;
use crate::navigation::NavigationState;
use crate::page::PageContext;

/// A lifecycle notification emitted by the router.
#[derive(Clone, Debug)]
pub enum RouterEvent {
    /// A load pipeline is about to start for `state`.
    BeforeLoad {
        /// The navigation being loaded.
        state: NavigationState,
    },

    /// Content for the current navigation has been fetched and its region
    /// extracted, but not yet inserted.
    AfterLoad {
        /// The extracted region.
        region: ContentRegion,
    },

    /// The extracted region has been appended into the content container.
    AfterDomAppended {
        /// The appended region.
        region: ContentRegion,
    },

    /// A page finished booting.
    AfterBoot {
        /// The context the page booted in.
        context: PageContext,
        /// The booted page's name.
        name: Option<String>,
        /// The booted page's node type.
        node_type: Option<String>,
    },

    /// A navigation could not be completed; the router fell back to a full
    /// page load.
    LoadFailed {
        /// The navigation that failed.
        state: NavigationState,
        /// What went wrong.
        error: Arc<LoadError>,
    },
}

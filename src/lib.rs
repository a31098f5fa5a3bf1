//! Client-side soft navigation core.
//!
//! softnav replaces full browser reloads on a multi-page site with soft
//! navigations: in-app link activations are intercepted, the target page's
//! content is fetched over the network, the visible content region is
//! swapped under an animated transition, and the browser's session history
//! stays consistent with back/forward navigation. Linked pages are
//! opportunistically prefetched on pointer intent before the click occurs.
//!
//! The crate is the navigation *state machine* only. Rendering, animation
//! mechanics and concrete page behavior stay on the other side of trait
//! seams:
//!
//! - [`PageFactory`] / [`Page`]: instantiation and behavior of pages,
//! - [`TransitionFactory`] / [`Transition`]: the visual handoff,
//! - [`LinkResolver`]: resolving DOM elements to navigable links,
//! - [`SessionHistory`]: the native back/forward stack,
//! - [`DocumentHandle`]: title, body stamping and content insertion,
//! - [`Loader`]: the loading indicator.
//!
//! In-memory implementations of the browser-facing seams
//! ([`MemoryHistory`], [`MemoryDocument`]) are included, which is also how
//! the crate tests itself without a browser.
//!
//! The [`Router`] owns the lifecycle: one authoritative in-flight navigation
//! at a time (a newer one aborts the older one's fetch), history pushes that
//! are never rolled back, teardown of former pages strictly after the new
//! page is shown, and a [`ContentCache`] shared with the
//! [`PrefetchTrigger`] where entries may still be settling when the router
//! picks them up.

pub mod cache;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod history;
pub mod loader;
pub mod nav;
pub mod navigation;
pub mod page;
pub mod prefetch;
pub mod router;
pub mod transition;

pub use cache::{ContentCache, PendingFetch};
pub use config::RouterOptions;
pub use content::ContentRegion;
pub use document::{DocumentHandle, IntentListener, MemoryDocument};
pub use error::{FetchError, LoadError, RouterError};
pub use events::RouterEvent;
pub use fetcher::{PageFetcher, PARTIAL_HEADER};
pub use history::{
    EntryKind, HistoryStack, MemoryEntry, MemoryHistory, PopStateListener, SessionHistory,
};
pub use loader::{Loader, NoopLoader};
pub use nav::{ElementInfo, LinkResolver, PointerIntent, SiteLinkResolver};
pub use navigation::{Direction, NavigationState, PreviousPage};
pub use page::{Page, PageContext, PageFactory};
pub use prefetch::PrefetchTrigger;
pub use router::{ClickOutcome, Router, RouterBuilder, RouterHandle};
pub use transition::{
    ContentReceiver, InstantTransition, InstantTransitionFactory, Transition, TransitionFactory,
};

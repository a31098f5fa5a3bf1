//! The navigation-controller seam: resolving DOM elements to navigable
//! links and registering the controller's own event listeners.

use url::Url;

use crate::router::RouterHandle;

/// Metadata read off a DOM element involved in a navigation gesture.
///
/// The router core never touches the DOM itself; the embedding layer fills
/// one of these per element and hands it over.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementInfo {
    /// The element's resolved `href`, if it has one.
    pub href: Option<String>,
    /// The element's `id`.
    pub id: Option<String>,
    /// The element's `title`.
    pub title: Option<String>,
    /// The element's class list.
    pub classes: Vec<String>,
    /// Value of the configured link-type attribute.
    pub node_type: Option<String>,
    /// Value of the transition-hint attribute (`data-transition`).
    pub transition_name: Option<String>,
}

impl ElementInfo {
    /// Whether the element carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A pointer-intent signal (`mouseover` / `touchstart`), carrying the event
/// target and its ancestors, innermost first.
#[derive(Clone, Debug, Default)]
pub struct PointerIntent {
    /// Target element first, then its ancestors walking up the tree.
    pub chain: Vec<ElementInfo>,
}

/// Resolves elements to navigable links and owns any additional event
/// registration the embedding needs.
pub trait LinkResolver: Send + Sync {
    /// Resolve a navigable href from `el`, or [`None`] if the element is not
    /// a link the router should know about.
    fn href(&self, el: &ElementInfo) -> Option<String>;

    /// Whether an activation of `el` may be taken over by the router
    /// (same origin, no download target, and so on).
    fn eligible(&self, el: &ElementInfo) -> bool;

    /// Register the resolver's own listeners, wired to `router`.
    fn init_events(&self, router: RouterHandle);
}

/// A [`LinkResolver`] accepting links on the same origin as the base URL.
///
/// Relative hrefs are always eligible; absolute ones must share the base
/// URL's origin. Fragment-only and `mailto:` hrefs never resolve.
pub struct SiteLinkResolver {
    base: Url,
}

impl SiteLinkResolver {
    /// Create a resolver for the site at `base`.
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl LinkResolver for SiteLinkResolver {
    fn href(&self, el: &ElementInfo) -> Option<String> {
        el.href
            .clone()
            .filter(|h| !h.is_empty() && !h.starts_with('#') && !h.starts_with("mailto:"))
    }

    fn eligible(&self, el: &ElementInfo) -> bool {
        let Some(href) = &el.href else {
            return false;
        };
        match Url::parse(href) {
            Ok(url) => url.origin() == self.base.origin(),
            Err(url::ParseError::RelativeUrlWithoutBase) => true,
            Err(_) => false,
        }
    }

    fn init_events(&self, _router: RouterHandle) {}
}

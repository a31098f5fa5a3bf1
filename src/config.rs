//! Router configuration and lifecycle hooks.

use std::time::Duration;

use crate::content::ContentRegion;
use crate::navigation::NavigationState;
use crate::page::PageContext;

/// Hook running right before a load pipeline starts.
pub type PreLoadHook = Box<dyn Fn(&NavigationState) + Send + Sync>;
/// Hook running after content has been loaded, inserted and booted.
pub type PostLoadHook = Box<dyn Fn(&NavigationState, &ContentRegion) + Send + Sync>;
/// Hook running right before a new entry is pushed onto the native history.
pub type PrePushStateHook = Box<dyn Fn(&NavigationState) + Send + Sync>;
/// Hook running when the router is destroyed.
pub type OnDestroyHook = Box<dyn Fn() + Send + Sync>;
/// Hook running at the start of every boot.
pub type PreBootHook = Box<dyn Fn(&ContentRegion, PageContext, bool) + Send + Sync>;

/// Configuration options for a [`Router`](crate::Router).
///
/// This implements [`Default`] and follows the builder pattern:
///
/// ```rust
/// use std::time::Duration;
/// use softnav::RouterOptions;
///
/// let options = RouterOptions::default()
///     .use_cache(true)
///     .min_load_duration(Duration::from_millis(400))
///     .pre_load(|state| println!("loading {}", state.href));
/// ```
pub struct RouterOptions {
    /// Whether history-driven navigation interception is active at all.
    pub ajax_enabled: bool,
    /// Class marker identifying the content region in responses.
    pub page_class: String,
    /// Attribute carrying the node type on content regions and links.
    pub object_type_attr: String,
    /// Class opting a link out of interception.
    pub no_ajax_link_class: String,
    /// Class marking the link of the currently displayed page.
    pub active_class: String,
    /// Class opting a link out of prefetching.
    pub no_prefetch_class: String,
    /// Whether the [`ContentCache`](crate::ContentCache) is consulted and
    /// filled.
    pub use_cache: bool,
    /// Minimum time between load start and the content being handed to the
    /// transition.
    pub min_load_duration: Duration,
    /// Delay before the content fetch is issued.
    pub pre_load_page_delay: Duration,

    pub(crate) pre_load: PreLoadHook,
    pub(crate) post_load: PostLoadHook,
    pub(crate) pre_push_state: PrePushStateHook,
    pub(crate) on_destroy: OnDestroyHook,
    pub(crate) pre_boot: PreBootHook,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            ajax_enabled: true,
            page_class: String::from("page-content"),
            object_type_attr: String::from("data-node-type"),
            no_ajax_link_class: String::from("no-ajax-link"),
            active_class: String::from("active"),
            no_prefetch_class: String::from("no-prefetch"),
            use_cache: true,
            min_load_duration: Duration::ZERO,
            pre_load_page_delay: Duration::ZERO,
            pre_load: Box::new(|_| {}),
            post_load: Box::new(|_, _| {}),
            pre_push_state: Box::new(|_| {}),
            on_destroy: Box::new(|| {}),
            pre_boot: Box::new(|_, _, _| {}),
        }
    }
}

impl RouterOptions {
    /// Toggle history-driven navigation interception.
    pub fn ajax_enabled(mut self, enabled: bool) -> Self {
        self.ajax_enabled = enabled;
        self
    }

    /// Set the content-region class marker.
    pub fn page_class(mut self, class: impl Into<String>) -> Self {
        self.page_class = class.into();
        self
    }

    /// Toggle use of the content cache.
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set the minimum perceived load duration.
    pub fn min_load_duration(mut self, duration: Duration) -> Self {
        self.min_load_duration = duration;
        self
    }

    /// Set the delay before a content fetch is issued.
    pub fn pre_load_page_delay(mut self, delay: Duration) -> Self {
        self.pre_load_page_delay = delay;
        self
    }

    /// Hook invoked right before each load pipeline starts.
    pub fn pre_load(mut self, hook: impl Fn(&NavigationState) + Send + Sync + 'static) -> Self {
        self.pre_load = Box::new(hook);
        self
    }

    /// Hook invoked after content has been loaded, inserted and booted.
    pub fn post_load(
        mut self,
        hook: impl Fn(&NavigationState, &ContentRegion) + Send + Sync + 'static,
    ) -> Self {
        self.post_load = Box::new(hook);
        self
    }

    /// Hook invoked right before a new native history entry is pushed.
    pub fn pre_push_state(
        mut self,
        hook: impl Fn(&NavigationState) + Send + Sync + 'static,
    ) -> Self {
        self.pre_push_state = Box::new(hook);
        self
    }

    /// Hook invoked when the router is destroyed.
    pub fn on_destroy(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_destroy = Box::new(hook);
        self
    }

    /// Hook invoked at the start of every boot.
    pub fn pre_boot(
        mut self,
        hook: impl Fn(&ContentRegion, PageContext, bool) + Send + Sync + 'static,
    ) -> Self {
        self.pre_boot = Box::new(hook);
        self
    }
}

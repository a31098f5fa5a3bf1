//! Speculative content warming on pointer intent.

use std::sync::Arc;

use futures_util::FutureExt;
use tracing::debug;

use crate::cache::ContentCache;
use crate::config::RouterOptions;
use crate::document::DocumentHandle;
use crate::fetcher::PageFetcher;
use crate::history::SessionHistory;
use crate::nav::{LinkResolver, PointerIntent};

/// Warms the [`ContentCache`] for links the user is about to activate.
///
/// Listens for pointer-intent signals (`mouseover`, `touchstart`), resolves
/// the nearest navigable link and issues a best-effort fetch for it before
/// the click happens. The trigger never participates in the navigation state
/// machine itself; it only feeds the cache the router reads from.
pub struct PrefetchTrigger {
    options: Arc<RouterOptions>,
    cache: Arc<ContentCache>,
    fetcher: PageFetcher,
    resolver: Arc<dyn LinkResolver>,
    session: Arc<dyn SessionHistory>,
    document: Arc<dyn DocumentHandle>,
}

impl PrefetchTrigger {
    /// Create a trigger feeding `cache`.
    ///
    /// Share the cache, resolver, session and document with the router this
    /// trigger warms the cache for.
    pub fn new(
        options: Arc<RouterOptions>,
        cache: Arc<ContentCache>,
        fetcher: PageFetcher,
        resolver: Arc<dyn LinkResolver>,
        session: Arc<dyn SessionHistory>,
        document: Arc<dyn DocumentHandle>,
    ) -> Self {
        Self {
            options,
            cache,
            fetcher,
            resolver,
            session,
            document,
        }
    }

    /// Attach the pointer-intent listeners.
    ///
    /// Returns [`false`] and stays inert when the session history does not
    /// support programmatic entries, since prefetched content could never be soft
    /// navigated to.
    pub fn boot(self: Arc<Self>) -> bool {
        if !self.session.supports_push() {
            return false;
        }
        let document = Arc::clone(&self.document);
        document.add_intent_listener(Arc::new(move |intent| self.on_link_enter(&intent)));
        true
    }

    /// Handle one pointer-intent signal.
    ///
    /// Walks up from the event target until an element resolves to a
    /// navigable href, then warms the cache for it unless the link opted
    /// out, is ineligible, or an entry (settled or pending) already
    /// exists.
    pub fn on_link_enter(&self, intent: &PointerIntent) {
        let Some((el, url)) = intent
            .chain
            .iter()
            .find_map(|el| self.resolver.href(el).map(|url| (el, url)))
        else {
            return;
        };

        if el.has_class(&self.options.no_prefetch_class) {
            return;
        }
        if !self.resolver.eligible(el) {
            return;
        }

        // The entry is recorded before the fetch settles, so a second intent
        // for the same URL finds it and backs off.
        let fetch = self.fetcher.fetch(&url).shared();
        if !self.cache.claim(&url, fetch.clone()) {
            return;
        }
        debug!("prefetching {url}");

        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            match fetch.await {
                Ok(body) => cache.save(&url, body),
                Err(err) => {
                    debug!("prefetch for {url} failed: {err}");
                    cache.remove(&url);
                }
            }
        });
    }
}

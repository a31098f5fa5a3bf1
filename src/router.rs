//! The navigation orchestrator.

use std::sync::Arc;
use std::time::Instant;

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_channel::oneshot;
use futures_util::future::{AbortHandle, Abortable};
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error};
use url::Url;

use crate::cache::ContentCache;
use crate::config::RouterOptions;
use crate::content::ContentRegion;
use crate::document::{DocumentHandle, MemoryDocument};
use crate::error::{FetchError, LoadError, RouterError};
use crate::events::RouterEvent;
use crate::fetcher::PageFetcher;
use crate::history::{HistoryStack, MemoryHistory, SessionHistory};
use crate::loader::{Loader, NoopLoader};
use crate::nav::{ElementInfo, LinkResolver};
use crate::navigation::{Direction, NavigationState, PreviousPage};
use crate::page::{Page, PageContext, PageFactory};
use crate::transition::{ContentReceiver, TransitionFactory};

/// A set of messages the [`Router`] event loop handles.
pub(crate) enum RouterMessage {
    /// A navigation link was activated and passed interception.
    LinkActivated(ElementInfo),

    /// The native history moved to another entry.
    PopState(Option<NavigationState>),

    /// The content load for the given navigation settled.
    ContentLoaded {
        nav_id: u64,
        result: Result<String, FetchError>,
    },

    /// The transition for the given navigation ran to completion.
    TransitionEnded { nav_id: u64 },

    /// Stop the event loop and destroy the router.
    Shutdown,
}

/// What happened to a link activation offered to the router.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Default browser navigation should proceed (mail link, opt-out marker
    /// or no href at all).
    NotIntercepted,
    /// The activation was taken over; default navigation must be suppressed.
    Intercepted,
}

/// A cheap, cloneable handle for feeding the router from event listeners and
/// observing its lifecycle.
#[derive(Clone)]
pub struct RouterHandle {
    tx: UnboundedSender<RouterMessage>,
    options: Arc<RouterOptions>,
    events: broadcast::Sender<RouterEvent>,
}

impl RouterHandle {
    /// Offer a link activation to the router.
    ///
    /// Mail links and links carrying the opt-out class are left to the
    /// browser. Everything else is queued for the router, which may still
    /// decide the click targets the page already shown.
    pub fn on_link_click(&self, link: ElementInfo) -> ClickOutcome {
        let Some(href) = link.href.as_deref() else {
            return ClickOutcome::NotIntercepted;
        };
        if href.starts_with("mailto:") || link.has_class(&self.options.no_ajax_link_class) {
            return ClickOutcome::NotIntercepted;
        }
        let _ = self.tx.unbounded_send(RouterMessage::LinkActivated(link));
        ClickOutcome::Intercepted
    }

    /// Forward a native back/forward event to the router.
    pub fn on_pop_state(&self, state: Option<NavigationState>) {
        let _ = self.tx.unbounded_send(RouterMessage::PopState(state));
    }

    /// Subscribe to lifecycle notifications.
    pub fn events(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    /// Stop the router's event loop.
    pub fn shutdown(&self) {
        let _ = self.tx.unbounded_send(RouterMessage::Shutdown);
    }
}

/// The application page router.
///
/// Owns the full navigation lifecycle: it is the single authority for which
/// page is current, mirrors every pushed snapshot in its [`HistoryStack`],
/// shares a [`ContentCache`] with the prefetcher and drives the external
/// transition engine and page factory through their seams.
///
/// Construction goes through [`Router::builder`]; afterwards the usual
/// sequence is [`init_events`](Router::init_events), one
/// [`boot`](Router::boot) with the initially delivered content, then
/// [`run`](Router::run) on the async runtime:
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use softnav::*;
/// # async fn example(factory: Arc<dyn PageFactory>, resolver: Arc<dyn LinkResolver>) {
/// let mut router = Router::builder()
///     .base_url("https://example.org/")
///     .page_factory(factory)
///     .resolver(resolver)
///     .transition_factory(Arc::new(InstantTransitionFactory))
///     .build()
///     .unwrap();
///
/// router.init_events();
/// let region = ContentRegion::extract(
///     "<div id=\"home\" class=\"page-content\"></div>",
///     "page-content",
///     "data-node-type",
/// ).unwrap();
/// router.boot(region, PageContext::Static, true);
/// tokio::spawn(router.run());
/// # }
/// ```
pub struct Router {
    options: Arc<RouterOptions>,
    base_url: Url,
    page_factory: Arc<dyn PageFactory>,
    transition_factory: Arc<dyn TransitionFactory>,
    resolver: Arc<dyn LinkResolver>,
    loader: Arc<dyn Loader>,
    document: Arc<dyn DocumentHandle>,
    session: Arc<dyn SessionHistory>,
    cache: Arc<ContentCache>,
    fetcher: PageFetcher,
    history: HistoryStack,
    events: broadcast::Sender<RouterEvent>,
    tx: UnboundedSender<RouterMessage>,
    rx: UnboundedReceiver<RouterMessage>,

    state: Option<NavigationState>,
    previous_state: Option<NavigationState>,
    direction: Direction,
    page: Option<Arc<dyn Page>>,
    former_pages: Vec<Arc<dyn Page>>,
    transition_active: bool,
    current_request: Option<AbortHandle>,
    pending_content: Option<(u64, oneshot::Sender<ContentRegion>)>,
    load_begin: Option<Instant>,
    nav_id: u64,
    popstate_registered: bool,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("base_url", &self.base_url)
            .field("nav_id", &self.nav_id)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Start assembling a router.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// A handle for event listeners and observers.
    pub fn handle(&self) -> RouterHandle {
        RouterHandle {
            tx: self.tx.clone(),
            options: Arc::clone(&self.options),
            events: self.events.clone(),
        }
    }

    /// The cache shared with the prefetcher.
    pub fn cache(&self) -> Arc<ContentCache> {
        Arc::clone(&self.cache)
    }

    /// Register the back/forward listener and delegate further event
    /// registration to the navigation resolver.
    ///
    /// Re-invoking registers everything again; deduplication is the caller's
    /// responsibility.
    pub fn init_events(&mut self) {
        if self.options.ajax_enabled {
            let tx = self.tx.clone();
            self.session
                .set_popstate_listener(Some(Arc::new(move |raw| {
                    let _ = tx.unbounded_send(RouterMessage::PopState(raw));
                })));
            self.popstate_registered = true;
        }
        self.resolver.init_events(self.handle());
    }

    /// Activate a page for `content`.
    ///
    /// Used both for the first page load (`Static` context) and after every
    /// content swap (`Ajax` context). Only the very first boot creates the
    /// initial [`NavigationState`] and replaces the native history entry;
    /// later boots never do either again.
    pub fn boot(&mut self, content: ContentRegion, context: PageContext, is_home: bool) {
        if context == PageContext::Static {
            self.load_begin = Some(Instant::now());
        }
        (self.options.pre_boot)(&content, context, is_home);

        let page = self
            .page_factory
            .get_page_instance(&content, context, is_home);
        self.page = Some(Arc::clone(&page));

        if self.state.is_none() {
            let href = self.session.current_href();
            let title = self.document.title();
            let state = NavigationState::initial(href, title, is_home);
            self.history.push_state(state.clone());
            self.session.replace_state(&state, &state.title, &state.href);
            self.state = Some(state);

            self.page_loaded();
        }

        if context == PageContext::Ajax {
            if let Some(state) = self.state.take() {
                let name = page.name();
                self.state = Some(state.with_page(name.as_deref(), self.session.current_href()));
            }
        }

        let _ = self.events.send(RouterEvent::AfterBoot {
            context,
            name: page.name(),
            node_type: page.node_type(),
        });
    }

    /// Run the router's event loop until [`RouterHandle::shutdown`] or until
    /// every handle is gone.
    pub async fn run(mut self) {
        while let Some(message) = self.rx.next().await {
            match message {
                RouterMessage::LinkActivated(link) => self.on_link_activated(link),
                RouterMessage::PopState(raw) => self.on_pop_state(raw),
                RouterMessage::ContentLoaded { nav_id, result } => {
                    self.on_content_loaded(nav_id, result)
                }
                RouterMessage::TransitionEnded { nav_id } => self.on_transition_ended(nav_id),
                RouterMessage::Shutdown => break,
            }
        }
        self.destroy();
    }

    /// Remove the back/forward listener and run the destroy hook.
    pub fn destroy(&mut self) {
        if self.popstate_registered {
            self.session.set_popstate_listener(None);
            self.popstate_registered = false;
        }
        (self.options.on_destroy)();
    }

    fn on_link_activated(&mut self, link: ElementInfo) {
        if link.has_class(&self.options.active_class) && !self.transition_active {
            debug!("same page requested, doing nothing");
            return;
        }
        let Some(href) = self.resolver.href(&link) else {
            debug!("activated element resolved to no navigable href");
            return;
        };
        let href = self.absolutize(&href);

        self.transition_active = true;
        self.direction = Direction::Forward;
        self.previous_state = self.state.clone();

        let previous = PreviousPage {
            node_type: self.page.as_ref().and_then(|p| p.node_type()),
            name: self.page.as_ref().and_then(|p| p.name()),
            href: Some(self.session.current_href()),
        };
        let is_home = self.is_home(&href);
        let state = NavigationState::from_link(href, &link, previous, is_home);

        self.history.push_state(state.clone());
        (self.options.pre_push_state)(&state);
        if self.session.supports_push() {
            self.session.push_state(&state, &state.title, &state.href);
        }
        self.load_page(state);
    }

    fn on_pop_state(&mut self, raw: Option<NavigationState>) {
        // Entries without a snapshot belong to the browser; a normal reload
        // happens and this router stays out of it.
        let Some(state) = raw else { return };

        self.previous_state = self.state.clone();
        self.direction = self.history.get_direction(&state);
        self.transition_active = true;
        self.load_page(state);
    }

    /// Start the load pipeline for `state`. A still outstanding request for
    /// a previous navigation is aborted first: the last navigation wins,
    /// in-flight ones are never queued.
    fn load_page(&mut self, state: NavigationState) {
        if let Some(request) = self.current_request.take() {
            request.abort();
        }

        self.loader.show();
        self.load_begin = Some(Instant::now());
        self.nav_id += 1;
        let nav_id = self.nav_id;

        (self.options.pre_load)(&state);
        let _ = self.events.send(RouterEvent::BeforeLoad {
            state: state.clone(),
        });

        self.spawn_content_load(nav_id, state.href.clone());
        self.spawn_transition(nav_id, &state);
        self.state = Some(state);
    }

    /// Resolve content for `href` off the loop: from the cache when enabled
    /// and warm, from the network otherwise. Settlement re-enters the loop
    /// as [`RouterMessage::ContentLoaded`].
    fn spawn_content_load(&mut self, nav_id: u64, href: String) {
        let cache = self.options.use_cache.then(|| Arc::clone(&self.cache));
        let fetcher = self.fetcher.clone();
        let delay = self.options.pre_load_page_delay;
        let tx = self.tx.clone();

        let (abort, registration) = AbortHandle::new_pair();
        self.current_request = Some(abort);

        tokio::spawn(async move {
            let result = async {
                if let Some(cache) = &cache {
                    if let Some(cached) = cache.fetch(&href).await {
                        match cached {
                            Ok(body) => {
                                debug!("using cached content for {href}");
                                return Ok(body);
                            }
                            Err(err) => debug!("discarding failed cache entry for {href}: {err}"),
                        }
                    }
                }

                if !delay.is_zero() {
                    sleep(delay).await;
                }

                match Abortable::new(fetcher.fetch(&href), registration).await {
                    Ok(Ok(body)) => {
                        if let Some(cache) = &cache {
                            cache.save(&href, body.clone());
                        }
                        Ok(body)
                    }
                    Ok(Err(err)) => Err(err),
                    Err(_aborted) => Err(FetchError::Aborted),
                }
            }
            .await;

            let _ = tx.unbounded_send(RouterMessage::ContentLoaded { nav_id, result });
        });
    }

    /// Hand the transition engine its content receiver and let it run to
    /// completion off the loop. Completion re-enters the loop as
    /// [`RouterMessage::TransitionEnded`]; a started transition is never
    /// cancelled by a newer navigation.
    fn spawn_transition(&mut self, nav_id: u64, state: &NavigationState) {
        let transition =
            self.transition_factory
                .get_transition(self.previous_state.as_ref(), state, self.direction);

        let (content_tx, content_rx) = oneshot::channel();
        self.pending_content = Some((nav_id, content_tx));

        let current_region = self.page.as_ref().map(|p| p.content());
        let tx = self.tx.clone();
        tokio::spawn(async move {
            transition
                .init(current_region, ContentReceiver::new(content_rx))
                .await;
            let _ = tx.unbounded_send(RouterMessage::TransitionEnded { nav_id });
        });
    }

    fn on_content_loaded(&mut self, nav_id: u64, result: Result<String, FetchError>) {
        if nav_id != self.nav_id {
            debug!("dropping load result for a superseded navigation");
            return;
        }
        let Some(state) = self.state.clone() else {
            return;
        };

        match result {
            Ok(raw) => match self.on_data_loaded(&raw, &state) {
                Ok(region) => self.deliver_content(nav_id, region),
                Err(err) => self.load_failed(state, err),
            },
            Err(FetchError::Aborted) => debug!("fetch for {} aborted", state.href),
            Err(err) => self.load_failed(state, LoadError::Fetch(err)),
        }
    }

    /// Shared completion path for cached and fetched content.
    fn on_data_loaded(
        &mut self,
        raw: &str,
        state: &NavigationState,
    ) -> Result<ContentRegion, LoadError> {
        let region =
            ContentRegion::extract(raw, &self.options.page_class, &self.options.object_type_attr)?;

        let _ = self.events.send(RouterEvent::AfterLoad {
            region: region.clone(),
        });

        self.document.append_content(&region);
        let _ = self.events.send(RouterEvent::AfterDomAppended {
            region: region.clone(),
        });

        // Ownership transfer: the displayed page stops being current and
        // waits in the teardown queue.
        if let Some(current) = self.page.take() {
            self.former_pages.push(current);
        }

        if let Some(title) = &region.meta_title {
            self.document.set_title(title);
        }

        self.boot(region.clone(), PageContext::Ajax, state.is_home);
        (self.options.post_load)(state, &region);

        Ok(region)
    }

    /// Resolve the transition's content receiver, enforcing the minimum
    /// load duration.
    fn deliver_content(&mut self, nav_id: u64, region: ContentRegion) {
        let Some((pending_id, sender)) = self.pending_content.take() else {
            return;
        };
        if pending_id != nav_id {
            self.pending_content = Some((pending_id, sender));
            return;
        }

        let elapsed = self.load_begin.map(|t| t.elapsed()).unwrap_or_default();
        let remaining = self.options.min_load_duration.saturating_sub(elapsed);
        if remaining.is_zero() {
            let _ = sender.send(region);
        } else {
            tokio::spawn(async move {
                sleep(remaining).await;
                let _ = sender.send(region);
            });
        }
    }

    fn on_transition_ended(&mut self, nav_id: u64) {
        if nav_id == self.nav_id {
            self.transition_active = false;
            self.current_request = None;
        }
        // The new page must be marked showing before the old one starts
        // tearing down.
        self.page_loaded();
        self.destroy_previous_page();
    }

    /// Conceal the loader and reveal the current page; show completion is
    /// reported asynchronously through [`Page::on_show_ended`].
    fn page_loaded(&mut self) {
        self.loader.hide();
        let Some(page) = self.page.clone() else {
            return;
        };

        if page.context() == PageContext::Ajax {
            let name = page.name();
            let node_type = page.node_type();
            self.document
                .stamp_body(name.as_deref(), node_type.as_deref());
        }

        tokio::spawn(async move {
            page.show().await;
            page.on_show_ended();
        });
    }

    /// Tear down at most one former page.
    ///
    /// Never animate when more than one former page is queued: a navigation
    /// raced ahead of a still finishing teardown, and stacking hide
    /// animations on top of each other is worse than dropping the oldest
    /// page cold. Only a sole former page gets its hide animation.
    fn destroy_previous_page(&mut self) {
        let current_is_ajax = self
            .page
            .as_ref()
            .is_some_and(|p| p.context() == PageContext::Ajax);

        if current_is_ajax && !self.former_pages.is_empty() {
            if self.former_pages.len() > 1 {
                let oldest = self.former_pages.remove(0);
                oldest.destroy();
            } else if let Some(former) = self.former_pages.pop() {
                tokio::spawn(async move {
                    former.hide().await;
                    former.destroy();
                });
            }
        }

        if let Some(page) = &self.page {
            page.update_lazyload();
        }
    }

    /// Fetch failures and unusable responses surface instead of stalling:
    /// the loader is hidden, observers are notified and the session falls
    /// back to a full page load of the target.
    fn load_failed(&mut self, state: NavigationState, err: LoadError) {
        error!("navigation to {} failed: {err}", state.href);
        self.loader.hide();
        self.pending_content = None;
        self.current_request = None;

        let _ = self.events.send(RouterEvent::LoadFailed {
            state: state.clone(),
            error: Arc::new(err),
        });
        self.session.hard_navigate(&state.href);
    }

    fn absolutize(&self, href: &str) -> String {
        self.base_url
            .join(href)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| href.to_owned())
    }

    fn is_home(&self, href: &str) -> bool {
        Url::parse(href)
            .map(|url| {
                url.origin() == self.base_url.origin() && url.path() == self.base_url.path()
            })
            .unwrap_or(false)
    }
}

/// Assembles a [`Router`] and validates its construction contract.
///
/// A base URL, a page factory, a navigation resolver and a transition
/// factory are required; everything else has a default (no-op loader,
/// in-memory document and session history, empty cache, fresh fetcher).
#[derive(Default)]
pub struct RouterBuilder {
    base_url: Option<String>,
    options: Option<RouterOptions>,
    page_factory: Option<Arc<dyn PageFactory>>,
    transition_factory: Option<Arc<dyn TransitionFactory>>,
    resolver: Option<Arc<dyn LinkResolver>>,
    loader: Option<Arc<dyn Loader>>,
    document: Option<Arc<dyn DocumentHandle>>,
    session: Option<Arc<dyn SessionHistory>>,
    cache: Option<Arc<ContentCache>>,
    fetcher: Option<PageFetcher>,
}

impl RouterBuilder {
    /// Base URL of the site, required and non-empty.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Configuration options; defaults apply when not set.
    pub fn options(mut self, options: RouterOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// The external page factory, required.
    pub fn page_factory(mut self, factory: Arc<dyn PageFactory>) -> Self {
        self.page_factory = Some(factory);
        self
    }

    /// The external transition engine, required.
    pub fn transition_factory(mut self, factory: Arc<dyn TransitionFactory>) -> Self {
        self.transition_factory = Some(factory);
        self
    }

    /// The navigation-link resolver, required.
    pub fn resolver(mut self, resolver: Arc<dyn LinkResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// The loading indicator; defaults to [`NoopLoader`].
    pub fn loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// The host document; defaults to a [`MemoryDocument`].
    pub fn document(mut self, document: Arc<dyn DocumentHandle>) -> Self {
        self.document = Some(document);
        self
    }

    /// The native session history; defaults to a [`MemoryHistory`] starting
    /// at the base URL.
    pub fn session(mut self, session: Arc<dyn SessionHistory>) -> Self {
        self.session = Some(session);
        self
    }

    /// The content cache to share with a prefetcher; defaults to a fresh
    /// empty cache.
    pub fn cache(mut self, cache: Arc<ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The fetcher issuing content requests; defaults to a fresh client.
    pub fn fetcher(mut self, fetcher: PageFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Validate the configuration and assemble the router.
    pub fn build(self) -> Result<Router, RouterError> {
        let base_url = self
            .base_url
            .filter(|b| !b.is_empty())
            .ok_or_else(|| RouterError::Configuration("router needs a base url".into()))?;
        let base_url = Url::parse(&base_url)
            .map_err(|err| RouterError::Configuration(format!("invalid base url: {err}")))?;

        let page_factory = self
            .page_factory
            .ok_or_else(|| RouterError::Configuration("router needs a page factory".into()))?;
        let resolver = self.resolver.ok_or_else(|| {
            RouterError::Configuration("router needs a navigation resolver".into())
        })?;
        let transition_factory = self.transition_factory.ok_or_else(|| {
            RouterError::Configuration("router needs a transition factory".into())
        })?;

        let loader = self.loader.unwrap_or_else(|| Arc::new(NoopLoader));
        let document = self
            .document
            .unwrap_or_else(|| Arc::new(MemoryDocument::new()));
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(MemoryHistory::new(base_url.to_string())));
        let cache = self.cache.unwrap_or_else(|| Arc::new(ContentCache::new()));
        let fetcher = self.fetcher.unwrap_or_default();

        let (tx, rx) = unbounded();
        let (events, _) = broadcast::channel(16);

        Ok(Router {
            options: Arc::new(self.options.unwrap_or_default()),
            base_url,
            page_factory,
            transition_factory,
            resolver,
            loader,
            document,
            session,
            cache,
            fetcher,
            history: HistoryStack::new(),
            events,
            tx,
            rx,
            state: None,
            previous_state: None,
            direction: Direction::Forward,
            page: None,
            former_pages: Vec::new(),
            transition_active: false,
            current_request: None,
            pending_content: None,
            load_begin: None,
            nav_id: 0,
            popstate_registered: false,
        })
    }
}

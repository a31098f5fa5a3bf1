#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};
use wiremock::MockServer;

use softnav::{
    ContentCache, ContentRegion, Direction, InstantTransition, Loader, MemoryDocument,
    MemoryHistory, NavigationState, Page, PageContext, PageFactory, Router, RouterEvent,
    RouterOptions, SiteLinkResolver, Transition, TransitionFactory,
};
use url::Url;

pub const HOME_PARTIAL: &str =
    r#"<div id="home" class="page-content" data-node-type="page">Home</div>"#;
pub const ABOUT_PARTIAL: &str = r#"<div id="about" class="page-content" data-node-type="page" data-meta-title="About us"><h1>About</h1></div>"#;

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn record(log: &EventLog, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

pub fn entries(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub struct RecordingPage {
    name: Option<String>,
    node_type: Option<String>,
    context: PageContext,
    content: ContentRegion,
    log: EventLog,
    hide_delay: Duration,
}

impl RecordingPage {
    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| String::from("anonymous"))
    }
}

#[async_trait]
impl Page for RecordingPage {
    fn context(&self) -> PageContext {
        self.context
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn node_type(&self) -> Option<String> {
        self.node_type.clone()
    }

    fn content(&self) -> ContentRegion {
        self.content.clone()
    }

    async fn show(&self) {
        record(&self.log, format!("show:{}", self.label()));
    }

    async fn hide(&self) {
        if !self.hide_delay.is_zero() {
            sleep(self.hide_delay).await;
        }
        record(&self.log, format!("hide:{}", self.label()));
    }

    fn destroy(&self) {
        record(&self.log, format!("destroy:{}", self.label()));
    }

    fn on_show_ended(&self) {
        record(&self.log, format!("shown:{}", self.label()));
    }
}

pub struct RecordingPageFactory {
    log: EventLog,
    hide_delay: Duration,
    booted: Mutex<Vec<(Option<String>, PageContext, bool)>>,
}

impl RecordingPageFactory {
    pub fn new(log: EventLog) -> Arc<Self> {
        Self::with_hide_delay(log, Duration::from_millis(10))
    }

    pub fn with_hide_delay(log: EventLog, hide_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            log,
            hide_delay,
            booted: Mutex::new(Vec::new()),
        })
    }

    pub fn boots(&self) -> Vec<(Option<String>, PageContext, bool)> {
        self.booted.lock().unwrap().clone()
    }
}

impl PageFactory for RecordingPageFactory {
    fn get_page_instance(
        &self,
        content: &ContentRegion,
        context: PageContext,
        is_home: bool,
    ) -> Arc<dyn Page> {
        self.booted
            .lock()
            .unwrap()
            .push((content.name.clone(), context, is_home));
        Arc::new(RecordingPage {
            name: content.name.clone(),
            node_type: content.node_type.clone(),
            context,
            content: content.clone(),
            log: self.log.clone(),
            hide_delay: self.hide_delay,
        })
    }
}

#[derive(Default)]
pub struct RecordingTransitionFactory {
    picked: Mutex<Vec<(Option<String>, String, Direction)>>,
}

impl RecordingTransitionFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn picked(&self) -> Vec<(Option<String>, String, Direction)> {
        self.picked.lock().unwrap().clone()
    }
}

impl TransitionFactory for RecordingTransitionFactory {
    fn get_transition(
        &self,
        previous: Option<&NavigationState>,
        state: &NavigationState,
        direction: Direction,
    ) -> Box<dyn Transition> {
        self.picked.lock().unwrap().push((
            previous.map(|p| p.href.clone()),
            state.href.clone(),
            direction,
        ));
        Box::new(InstantTransition)
    }
}

/// A transition that keeps animating for a while after the content arrived,
/// like a real reveal animation would.
pub struct DelayedTransition {
    delay: Duration,
}

#[async_trait]
impl Transition for DelayedTransition {
    async fn init(&self, _current: Option<ContentRegion>, incoming: softnav::ContentReceiver) {
        let _ = incoming.content().await;
        sleep(self.delay).await;
    }
}

pub struct DelayedTransitionFactory {
    pub delay: Duration,
}

impl TransitionFactory for DelayedTransitionFactory {
    fn get_transition(
        &self,
        _previous: Option<&NavigationState>,
        _state: &NavigationState,
        _direction: Direction,
    ) -> Box<dyn Transition> {
        Box::new(DelayedTransition { delay: self.delay })
    }
}

#[derive(Default)]
pub struct CountingLoader {
    pub shows: AtomicU32,
    pub hides: AtomicU32,
}

impl Loader for CountingLoader {
    fn show(&self) {
        self.shows.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }
}

/// A mock backend plus every recording collaborator a router needs.
pub struct TestSite {
    pub server: MockServer,
    pub base: String,
    pub history: Arc<MemoryHistory>,
    pub document: Arc<MemoryDocument>,
    pub factory: Arc<RecordingPageFactory>,
    pub transitions: Arc<RecordingTransitionFactory>,
    pub loader: Arc<CountingLoader>,
    pub cache: Arc<ContentCache>,
    pub log: EventLog,
}

impl TestSite {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base = format!("{}/", server.uri());
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        Self {
            history: Arc::new(MemoryHistory::new(base.clone())),
            document: Arc::new(MemoryDocument::with_title("Home")),
            factory: RecordingPageFactory::new(log.clone()),
            transitions: RecordingTransitionFactory::new(),
            loader: Arc::new(CountingLoader::default()),
            cache: Arc::new(ContentCache::new()),
            log,
            server,
            base,
        }
    }

    pub fn resolver(&self) -> Arc<SiteLinkResolver> {
        Arc::new(SiteLinkResolver::new(Url::parse(&self.base).unwrap()))
    }

    pub fn router(&self, options: RouterOptions) -> Router {
        self.router_with_transitions(options, self.transitions.clone())
    }

    pub fn router_with_transitions(
        &self,
        options: RouterOptions,
        transitions: Arc<dyn TransitionFactory>,
    ) -> Router {
        Router::builder()
            .base_url(self.base.clone())
            .options(options)
            .page_factory(self.factory.clone())
            .transition_factory(transitions)
            .resolver(self.resolver())
            .loader(self.loader.clone())
            .document(self.document.clone())
            .session(self.history.clone())
            .cache(self.cache.clone())
            .build()
            .expect("test router configuration is complete")
    }

    /// A router booted from the home partial, ready to run.
    pub fn booted_router(&self, options: RouterOptions) -> Router {
        self.boot_home(self.router(options))
    }

    pub fn boot_home(&self, mut router: Router) -> Router {
        router.init_events();
        let region = ContentRegion::extract(HOME_PARTIAL, "page-content", "data-node-type")
            .expect("home partial has a content region");
        router.boot(region, PageContext::Static, true);
        router
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }
}

pub fn link_to(href: &str) -> softnav::ElementInfo {
    softnav::ElementInfo {
        href: Some(href.to_owned()),
        ..Default::default()
    }
}

/// Wait until the next ajax boot is announced.
pub async fn wait_for_ajax_boot(events: &mut broadcast::Receiver<RouterEvent>) -> Option<String> {
    timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await {
                Ok(RouterEvent::AfterBoot {
                    context: PageContext::Ajax,
                    name,
                    ..
                }) => break name,
                Ok(_) => continue,
                Err(err) => panic!("event channel closed while waiting for boot: {err}"),
            }
        }
    })
    .await
    .expect("timed out waiting for an ajax boot")
}

/// Wait until a navigation failure is announced.
pub async fn wait_for_load_failure(events: &mut broadcast::Receiver<RouterEvent>) -> String {
    timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await {
                Ok(RouterEvent::LoadFailed { state, .. }) => break state.href,
                Ok(_) => continue,
                Err(err) => panic!("event channel closed while waiting for failure: {err}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a load failure")
}

/// Poll until `entry` shows up in the log.
pub async fn wait_for_log_entry(log: &EventLog, entry: &str) {
    timeout(Duration::from_secs(2), async {
        loop {
            if entries(log).iter().any(|e| e == entry) {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for log entry {entry:?}, log: {:?}", entries(log)));
}

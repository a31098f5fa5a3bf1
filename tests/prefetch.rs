//! Prefetch behavior against a mock backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use common::*;
use softnav::{
    DocumentHandle, ElementInfo, MemoryHistory, NavigationState, PageFetcher, PointerIntent,
    PopStateListener, PrefetchTrigger, RouterOptions, SessionHistory,
};

fn trigger_for(site: &TestSite) -> Arc<PrefetchTrigger> {
    Arc::new(PrefetchTrigger::new(
        Arc::new(RouterOptions::default()),
        site.cache.clone(),
        PageFetcher::default(),
        site.resolver(),
        site.history.clone(),
        site.document.clone(),
    ))
}

fn intent_for(href: &str) -> PointerIntent {
    PointerIntent {
        chain: vec![ElementInfo {
            href: Some(href.to_owned()),
            ..Default::default()
        }],
    }
}

#[tokio::test]
async fn repeated_intent_issues_a_single_request() {
    let site = TestSite::start().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ABOUT_PARTIAL)
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&site.server)
        .await;

    let trigger = trigger_for(&site);
    assert!(trigger.clone().boot());

    // Hovering twice before the first prefetch settles: the pending entry
    // counts as present and dedupes the second request.
    site.document.emulate_intent(intent_for(&site.url("/about")));
    site.document.emulate_intent(intent_for(&site.url("/about")));
    assert!(site.cache.contains(&site.url("/about")));

    sleep(Duration::from_millis(300)).await;
    assert!(site.cache.contains(&site.url("/about")));
}

#[tokio::test]
async fn intent_resolves_through_ancestors() {
    let site = TestSite::start().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ABOUT_PARTIAL))
        .expect(1)
        .mount(&site.server)
        .await;

    let trigger = trigger_for(&site);
    trigger.clone().boot();

    // The pointer lands on a span nested inside the link.
    let intent = PointerIntent {
        chain: vec![
            ElementInfo::default(),
            ElementInfo {
                href: Some(site.url("/about")),
                ..Default::default()
            },
        ],
    };
    site.document.emulate_intent(intent);

    sleep(Duration::from_millis(200)).await;
    assert!(site.cache.contains(&site.url("/about")));
}

#[tokio::test]
async fn opted_out_and_foreign_links_are_not_prefetched() {
    let site = TestSite::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ABOUT_PARTIAL))
        .expect(0)
        .mount(&site.server)
        .await;

    let trigger = trigger_for(&site);
    trigger.clone().boot();

    let opted_out = PointerIntent {
        chain: vec![ElementInfo {
            href: Some(site.url("/about")),
            classes: vec!["no-prefetch".into()],
            ..Default::default()
        }],
    };
    site.document.emulate_intent(opted_out);
    site.document
        .emulate_intent(intent_for("https://elsewhere.net/about"));
    site.document.emulate_intent(PointerIntent::default());

    sleep(Duration::from_millis(200)).await;
    assert!(site.cache.is_empty());
}

#[tokio::test]
async fn failed_prefetch_is_evicted() {
    let site = TestSite::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site.server)
        .await;

    let trigger = trigger_for(&site);
    trigger.clone().boot();

    site.document.emulate_intent(intent_for(&site.url("/missing")));
    sleep(Duration::from_millis(300)).await;

    // The failed entry is gone, so a later navigation fetches for real.
    assert!(!site.cache.contains(&site.url("/missing")));
}

struct NoPushHistory {
    inner: MemoryHistory,
}

impl SessionHistory for NoPushHistory {
    fn supports_push(&self) -> bool {
        false
    }

    fn current_href(&self) -> String {
        self.inner.current_href()
    }

    fn push_state(&self, state: &NavigationState, title: &str, url: &str) {
        self.inner.push_state(state, title, url);
    }

    fn replace_state(&self, state: &NavigationState, title: &str, url: &str) {
        self.inner.replace_state(state, title, url);
    }

    fn set_popstate_listener(&self, listener: Option<PopStateListener>) {
        self.inner.set_popstate_listener(listener);
    }

    fn hard_navigate(&self, url: &str) {
        self.inner.hard_navigate(url);
    }
}

#[tokio::test]
async fn trigger_stays_inert_without_push_support() {
    let site = TestSite::start().await;
    let session = Arc::new(NoPushHistory {
        inner: MemoryHistory::new(site.base.clone()),
    });

    let trigger = Arc::new(PrefetchTrigger::new(
        Arc::new(RouterOptions::default()),
        site.cache.clone(),
        PageFetcher::default(),
        site.resolver(),
        session,
        site.document.clone(),
    ));

    assert!(!trigger.clone().boot());

    // No listener was attached, intents go nowhere.
    site.document.emulate_intent(intent_for(&site.url("/about")));
    sleep(Duration::from_millis(100)).await;
    assert!(site.cache.is_empty());
}

#[tokio::test]
async fn router_navigation_awaits_a_pending_prefetch() {
    let site = TestSite::start().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ABOUT_PARTIAL)
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&site.server)
        .await;

    let trigger = trigger_for(&site);
    trigger.clone().boot();

    let router = site.booted_router(RouterOptions::default());
    let handle = router.handle();
    let mut events = handle.events();
    tokio::spawn(router.run());

    // Hover, then click before the prefetch settles: the router picks up
    // the pending entry instead of fetching again.
    site.document.emulate_intent(intent_for(&site.url("/about")));
    handle.on_link_click(link_to("/about"));

    let booted = wait_for_ajax_boot(&mut events).await;
    assert_eq!(booted.as_deref(), Some("about"));
    assert_eq!(site.document.title(), "About us");
}

//! The document seam: everything the router needs from the host page.

use std::sync::{Arc, Mutex};

use crate::content::ContentRegion;
use crate::nav::PointerIntent;

/// Callback receiving pointer-intent signals from the document body.
pub type IntentListener = Arc<dyn Fn(PointerIntent) + Send + Sync>;

/// Operations the router performs against the host document.
///
/// Rendering mechanics stay on the other side of this trait; the router only
/// dictates *what* happens and in which order.
pub trait DocumentHandle: Send + Sync {
    /// The current document title.
    fn title(&self) -> String;

    /// Replace the document title.
    fn set_title(&self, title: &str);

    /// Append a freshly loaded region into the content container, concealed
    /// until the transition reveals it.
    fn append_content(&self, region: &ContentRegion);

    /// Stamp the document body with the current page's identity: the name
    /// becomes the body id and a class, the node type a class.
    fn stamp_body(&self, name: Option<&str>, node_type: Option<&str>);

    /// Register a listener for pointer-intent signals (`mouseover`,
    /// `touchstart`) on the document body.
    fn add_intent_listener(&self, listener: IntentListener);
}

#[derive(Default)]
struct MemoryDocumentInner {
    title: String,
    appended: Vec<ContentRegion>,
    stamps: Vec<(Option<String>, Option<String>)>,
    intent_listeners: Vec<IntentListener>,
}

/// A [`DocumentHandle`] that records every operation in memory.
#[derive(Default)]
pub struct MemoryDocument {
    inner: Mutex<MemoryDocumentInner>,
}

impl MemoryDocument {
    /// Create an empty document with an empty title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with an initial title.
    pub fn with_title(title: impl Into<String>) -> Self {
        let doc = Self::default();
        doc.inner.lock().unwrap().title = title.into();
        doc
    }

    /// Every region appended so far, oldest first.
    pub fn appended(&self) -> Vec<ContentRegion> {
        self.inner.lock().unwrap().appended.clone()
    }

    /// Every body stamp applied so far, as `(name, node_type)` pairs.
    pub fn stamps(&self) -> Vec<(Option<String>, Option<String>)> {
        self.inner.lock().unwrap().stamps.clone()
    }

    /// Deliver a pointer-intent signal to every registered listener, the way
    /// a browser would bubble a `mouseover`.
    pub fn emulate_intent(&self, intent: PointerIntent) {
        let listeners = self.inner.lock().unwrap().intent_listeners.clone();
        for listener in listeners {
            listener(intent.clone());
        }
    }
}

impl DocumentHandle for MemoryDocument {
    fn title(&self) -> String {
        self.inner.lock().unwrap().title.clone()
    }

    fn set_title(&self, title: &str) {
        self.inner.lock().unwrap().title = title.to_owned();
    }

    fn append_content(&self, region: &ContentRegion) {
        self.inner.lock().unwrap().appended.push(region.clone());
    }

    fn stamp_body(&self, name: Option<&str>, node_type: Option<&str>) {
        self.inner
            .lock()
            .unwrap()
            .stamps
            .push((name.map(str::to_owned), node_type.map(str::to_owned)));
    }

    fn add_intent_listener(&self, listener: IntentListener) {
        self.inner.lock().unwrap().intent_listeners.push(listener);
    }
}

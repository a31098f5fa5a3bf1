//! The page seam: concrete page behavior is owned by an external factory,
//! the router depends only on this interface.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::content::ContentRegion;

/// How a page came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageContext {
    /// Booted from the initially delivered document.
    Static,
    /// Booted from content fetched during a soft navigation.
    Ajax,
}

impl fmt::Display for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Ajax => write!(f, "ajax"),
        }
    }
}

/// A page instance produced by the external [`PageFactory`].
///
/// Exactly one page is current at any time; the router owns that reference
/// exclusively. A page that has been navigated away from moves into the
/// former-pages queue until it is destroyed.
#[async_trait]
pub trait Page: Send + Sync {
    /// The context the page was booted in.
    fn context(&self) -> PageContext;

    /// Page name, stamped onto the document body. Usually the content
    /// region's `id`.
    fn name(&self) -> Option<String>;

    /// Page node type, stamped onto the document body.
    fn node_type(&self) -> Option<String>;

    /// Handle to the page's content region.
    fn content(&self) -> ContentRegion;

    /// Reveal the page. Resolves when the show animation has ended.
    async fn show(&self);

    /// Conceal the page. Resolves when the hide animation has ended.
    async fn hide(&self);

    /// Release everything the page holds. Called exactly once, after the
    /// page left the former-pages queue.
    fn destroy(&self);

    /// Recompute lazy-loaded media, called after a navigation settled.
    fn update_lazyload(&self) {}

    /// Notification that [`show`](Page::show) completed.
    fn on_show_ended(&self) {}
}

/// Produces [`Page`] instances for freshly booted content.
pub trait PageFactory: Send + Sync {
    /// Instantiate the page for `content`.
    fn get_page_instance(
        &self,
        content: &ContentRegion,
        context: PageContext,
        is_home: bool,
    ) -> Arc<dyn Page>;
}

//! Network access for page content.

use futures_util::future::BoxFuture;
use reqwest::header::{HeaderValue, CACHE_CONTROL};
use tracing::debug;

use crate::error::FetchError;

/// Header signaling the backend may answer with a partial document
/// (content region only) to save bandwidth.
pub const PARTIAL_HEADER: &str = "X-Allow-Partial";

/// Issues the GET requests that resolve navigation content.
///
/// Every request carries [`PARTIAL_HEADER`] and disables caching at the
/// transport layer; a transport cache serving a partial response to a later
/// full-page load would conflict with the [`ContentCache`](crate::ContentCache)
/// semantics, so content is only ever cached there.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl PageFetcher {
    /// Wrap an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch the raw body of `url`.
    ///
    /// The returned future owns everything it needs, so it can be raced
    /// against an abort handle or shared as a pending cache entry.
    pub fn fetch(&self, url: &str) -> BoxFuture<'static, Result<String, FetchError>> {
        let client = self.client.clone();
        let url = url.to_owned();
        Box::pin(async move {
            debug!("fetching {url}");
            let response = client
                .get(&url)
                .header(PARTIAL_HEADER, HeaderValue::from_static("1"))
                .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
                .send()
                .await
                .map_err(FetchError::from)?
                .error_for_status()
                .map_err(FetchError::from)?;
            response.text().await.map_err(FetchError::from)
        })
    }
}

use std::sync::Arc;

use thiserror::Error;

/// Fatal errors raised while assembling a [`Router`](crate::Router).
///
/// Construction errors are synchronous and never recovered; a router without
/// its required collaborators cannot do anything useful.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A required constructor dependency is missing or invalid.
    #[error("router configuration: {0}")]
    Configuration(String),
}

/// Errors produced while resolving the content of a navigation.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The network fetch for the target page failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The response markup could not be parsed at all.
    #[error("could not parse response markup: {0}")]
    Parse(String),

    /// No element carrying the configured content marker was found in the
    /// response, neither at its root nor among its descendants.
    #[error("no element matching `.{marker}` in response")]
    ContentMissing {
        /// The class marker that was searched for.
        marker: String,
    },
}

/// Errors produced by a single network fetch.
///
/// This type is [`Clone`] so it can flow through shared, possibly still
/// pending cache entries (see [`ContentCache`](crate::ContentCache)).
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The underlying HTTP request failed or returned an error status.
    #[error("request failed: {0}")]
    Request(Arc<reqwest::Error>),

    /// The fetch was superseded by a newer navigation. Expected and silent.
    #[error("fetch superseded by a newer navigation")]
    Aborted,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(Arc::new(err))
    }
}

//! Error types for unbound-dot.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a request never produced a usable response.
#[derive(Error, Debug)]
pub enum TransportFailure {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("fetch task ended without a result")]
    WorkerLost,
}

/// Failure while fetching a single remote list.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("cannot build request for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportFailure,
    },

    #[error("bad HTTP status code for {url}: {status}")]
    BadStatus { url: String, status: StatusCode },

    #[error("cannot read response body from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// URL of the list that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::BadStatus { url, .. }
            | FetchError::Read { url, .. } => url,
        }
    }

    /// Status code carried by a non-200 response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the fetch was aborted by its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            FetchError::Transport {
                source: TransportFailure::Cancelled,
                ..
            }
        )
    }
}

#[derive(Error, Debug)]
pub enum UnboundError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown DNS provider: {0}")]
    UnknownProvider(String),
}

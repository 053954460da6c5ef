//! HTTP fetcher for downloading hostname and IP blocklists.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{FetchError, TransportFailure};
use crate::utils::format_count;

/// Default whole-request timeout for list downloads
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Unique entries of one list, hostnames or IPs/CIDRs
pub type LineSet = HashSet<String>;

/// Create the HTTP client shared by every list download.
///
/// The timeout covers connect, send and body read. Cancellation is handled
/// separately through the token passed to [`get_list`].
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(format!("unbound-dot/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Download one newline-delimited list.
///
/// Any status other than 200 is an error. Empty lines are dropped, so an
/// empty body yields an empty set rather than an error. Lines that are not
/// valid UTF-8 are skipped with a warning.
pub async fn get_list(
    token: &CancellationToken,
    client: &Client,
    url: &str,
) -> Result<LineSet, FetchError> {
    let request = client
        .get(url)
        .build()
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let response = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(cancelled(url)),
        result = client.execute(request) => result.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: TransportFailure::Http(e),
        })?,
    };

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::BadStatus {
            url: url.to_string(),
            status,
        });
    }

    let body = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(cancelled(url)),
        result = response.bytes() => result.map_err(|source| FetchError::Read {
            url: url.to_string(),
            source,
        })?,
    };

    let entries = parse_list(url, &body);
    debug!("Fetched {} - {} entries", url, format_count(entries.len()));
    Ok(entries)
}

fn cancelled(url: &str) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        source: TransportFailure::Cancelled,
    }
}

/// Split a list body on `\n` into unique non-empty entries.
///
/// Entries are kept verbatim apart from a trailing `\r`. A line that is not
/// valid UTF-8 is dropped rather than rewritten, since a lossy entry would end
/// up as a bogus zone in the generated config.
pub fn parse_list(url: &str, body: &[u8]) -> LineSet {
    let mut entries = LineSet::new();
    for (index, line) in body.split(|&b| b == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        match std::str::from_utf8(line) {
            Ok(entry) => {
                entries.insert(entry.to_string());
            }
            Err(e) => warn!("Skipping line {} of {}: {}", index + 1, url, e),
        }
    }
    entries
}

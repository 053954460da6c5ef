//! DNS readiness check run after unbound picks up a new configuration.

use anyhow::{bail, Result};
use std::net::IpAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Hostname resolved to prove DNS works end to end
pub const HOST_TO_RESOLVE: &str = "github.com";

/// Lookup attempts before giving up
const MAX_TRIES: u32 = 10;

/// Per-lookup timeout in seconds
const DNS_TIMEOUT_SECS: u64 = 5;

/// Delay before the first attempt, giving unbound time to start
const INITIAL_WAIT: Duration = Duration::from_millis(300);

/// Delay between failed attempts
const RETRY_WAIT: Duration = Duration::from_millis(500);

/// Resolve a hostname with the system resolver, with timeout.
pub async fn resolve_host(hostname: &str) -> Result<Vec<IpAddr>> {
    let host = hostname.to_string();
    let lookup = tokio::task::spawn_blocking(move || dns_lookup::lookup_host(&host));

    match tokio::time::timeout(Duration::from_secs(DNS_TIMEOUT_SECS), lookup).await {
        Ok(Ok(Ok(ips))) if !ips.is_empty() => Ok(ips),
        Ok(Ok(Ok(_))) => bail!("no addresses for {}", hostname),
        Ok(Ok(Err(e))) => bail!("cannot resolve {}: {}", hostname, e),
        Ok(Err(e)) => bail!("DNS lookup task failed: {}", e),
        Err(_) => bail!("DNS timeout resolving {}", hostname),
    }
}

/// Wait until DNS resolution works, or fail after a fixed number of tries.
///
/// Returns early with an error if the token is cancelled.
pub async fn wait_for_dns(token: &CancellationToken) -> Result<()> {
    sleep_or_cancel(token, INITIAL_WAIT).await?;

    let mut last_error = None;
    for attempt in 1..=MAX_TRIES {
        if token.is_cancelled() {
            bail!("DNS check cancelled");
        }

        match resolve_host(HOST_TO_RESOLVE).await {
            Ok(ips) => {
                info!("DNS is working ({} resolves to {} addresses)", HOST_TO_RESOLVE, ips.len());
                return Ok(());
            }
            Err(e) => {
                debug!("DNS check attempt {}/{} failed: {}", attempt, MAX_TRIES, e);
                last_error = Some(e);
            }
        }

        sleep_or_cancel(token, RETRY_WAIT).await?;
    }

    match last_error {
        Some(e) => bail!("DNS is not working after {} tries: {}", MAX_TRIES, e),
        None => bail!("DNS is not working after {} tries", MAX_TRIES),
    }
}

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> Result<()> {
    tokio::select! {
        _ = token.cancelled() => bail!("DNS check cancelled"),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_localhost() {
        let ips = resolve_host("localhost").await.unwrap();
        assert!(ips.iter().any(|ip| ip.is_loopback()));
    }

    #[tokio::test]
    async fn test_resolve_invalid_name() {
        assert!(resolve_host("invalid.invalid.").await.is_err());
    }

    #[tokio::test]
    async fn test_wait_for_dns_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let err = wait_for_dns(&token).await.unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }
}

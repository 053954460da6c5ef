//! Robustness tests for edge cases and error conditions.
//!
//! These tests verify that blocklist generation degrades gracefully when
//! remote lists cannot be reached.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use unbound_dot::aggregator::{build_blocked, BlockSettings, BlockSources};
use unbound_dot::config::Config;
use unbound_dot::fetcher::{build_client, get_list};
use unbound_dot::FetchError;

/// Base URL of a localhost port nothing listens on
async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Unreachable lists leave only the user entries
#[tokio::test]
async fn test_total_fetch_failure_keeps_user_entries() {
    let settings = BlockSettings {
        malicious: true,
        ads: true,
        surveillance: true,
        blocked_hostnames: vec!["ads.example.com".to_string(), "tracker.net".to_string()],
        blocked_ips: vec!["1.2.3.4".to_string()],
        allowed_hostnames: vec!["example.com".to_string()],
        sources: BlockSources::with_base_url(&closed_base_url().await),
    };
    let client = build_client(Duration::from_secs(5)).unwrap();
    let token = CancellationToken::new();

    let blocked = build_blocked(&token, &client, &settings, &[]).await;

    assert_eq!(blocked.errors.len(), 6);
    assert!(blocked
        .errors
        .iter()
        .all(|e| matches!(e, FetchError::Transport { .. })));
    assert_eq!(
        blocked.hostnames,
        vec!["  local-zone: \"tracker.net\" static".to_string()]
    );
    assert_eq!(blocked.ips, vec!["  private-address: 1.2.3.4".to_string()]);
}

/// Test that network timeout handling works correctly
#[tokio::test]
async fn test_http_client_timeout() {
    let client = build_client(Duration::from_millis(1)).unwrap();
    let token = CancellationToken::new();

    // Non-routable IP (should time out or fail to connect)
    let err = get_list(&token, &client, "http://10.255.255.1:12345/list")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
    assert!(!err.is_cancelled());
}

/// Test that invalid URLs are handled gracefully
#[tokio::test]
async fn test_invalid_url_handling() {
    let client = build_client(Duration::from_secs(5)).unwrap();
    let token = CancellationToken::new();

    let err = get_list(&token, &client, "not-a-url").await.unwrap_err();
    assert!(matches!(err, FetchError::Request { .. }));

    // Unsupported scheme is only detected when sending
    let result = get_list(&token, &client, "ftp://invalid-scheme.com/list").await;
    assert!(result.is_err());
}

/// Cancelling before starting fails every fetch without touching the network
#[tokio::test]
async fn test_precancelled_generation() {
    let client = build_client(Duration::from_secs(5)).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let blocked = build_blocked(&token, &client, &BlockSettings::default(), &[]).await;

    // Default settings enable the malicious category only
    assert_eq!(blocked.errors.len(), 2);
    assert!(blocked.errors.iter().all(|e| e.is_cancelled()));
    assert!(blocked.hostnames.is_empty());
    assert!(blocked.ips.is_empty());
}

/// Test that YAML parsing handles malformed input
#[test]
fn test_yaml_malformed_input() {
    assert!(Config::from_yaml("{{{{not valid yaml").is_err());
    assert!(Config::from_yaml("unbound: [1, 2]").is_err());
    assert!(Config::from_yaml("blocking:\n  blocked_ips: [999.1.1.1]").is_err());

    // Empty documents fall back to defaults
    assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
}

/// Test Unicode handling in block entries
#[test]
fn test_unicode_entries_rejected() {
    assert!(Config::from_yaml("blocking:\n  blocked_ips: [\"192.168.1.1\u{200B}\"]").is_err());
    assert!(Config::from_yaml("blocking:\n  blocked_hostnames: [\"exämple.com\"]").is_err());
    assert!(Config::from_yaml("blocking:\n  allowed_hostnames: [\"example\u{FEFF}.com\"]").is_err());
}

//! Blocklist aggregation: concurrent list downloads merged with user overrides.
//!
//! Each enabled category gets its own fetch task. Results come back over a
//! channel and all set mutation happens here, after collection, so workers
//! never share state. Output lines are sorted so the generated config is
//! reproducible regardless of which download finished first.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{FetchError, TransportFailure};
use crate::fetcher::{get_list, LineSet};
use crate::utils::format_count;

const FILES_BASE_URL: &str = "https://raw.githubusercontent.com/qdm12/files/master";

pub const MALICIOUS_HOSTNAMES_URL: &str =
    "https://raw.githubusercontent.com/qdm12/files/master/malicious-hostnames.updated";
pub const ADS_HOSTNAMES_URL: &str =
    "https://raw.githubusercontent.com/qdm12/files/master/ads-hostnames.updated";
pub const SURVEILLANCE_HOSTNAMES_URL: &str =
    "https://raw.githubusercontent.com/qdm12/files/master/surveillance-hostnames.updated";
pub const MALICIOUS_IPS_URL: &str =
    "https://raw.githubusercontent.com/qdm12/files/master/malicious-ips.updated";
pub const ADS_IPS_URL: &str = "https://raw.githubusercontent.com/qdm12/files/master/ads-ips.updated";
pub const SURVEILLANCE_IPS_URL: &str =
    "https://raw.githubusercontent.com/qdm12/files/master/surveillance-ips.updated";

/// Blocking category, each backed by one hostname list and one IP list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Malicious,
    Ads,
    Surveillance,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Malicious, Category::Ads, Category::Surveillance];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Malicious => "malicious",
            Category::Ads => "ads",
            Category::Surveillance => "surveillance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which categories to block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockCategories {
    pub malicious: bool,
    pub ads: bool,
    pub surveillance: bool,
}

impl BlockCategories {
    /// Enabled categories, always in the same order.
    pub fn enabled(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| match c {
                Category::Malicious => self.malicious,
                Category::Ads => self.ads,
                Category::Surveillance => self.surveillance,
            })
            .collect()
    }
}

/// One URL per category for a given list kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceUrls {
    pub malicious: String,
    pub ads: String,
    pub surveillance: String,
}

impl SourceUrls {
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Malicious => &self.malicious,
            Category::Ads => &self.ads,
            Category::Surveillance => &self.surveillance,
        }
    }
}

/// Remote list locations for hostnames and IPs.
///
/// Defaults point at the upstream lists; a config file may point them at a mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlockSources {
    pub hostnames: SourceUrls,
    pub ips: SourceUrls,
}

impl Default for BlockSources {
    fn default() -> Self {
        Self {
            hostnames: SourceUrls {
                malicious: MALICIOUS_HOSTNAMES_URL.to_string(),
                ads: ADS_HOSTNAMES_URL.to_string(),
                surveillance: SURVEILLANCE_HOSTNAMES_URL.to_string(),
            },
            ips: SourceUrls {
                malicious: MALICIOUS_IPS_URL.to_string(),
                ads: ADS_IPS_URL.to_string(),
                surveillance: SURVEILLANCE_IPS_URL.to_string(),
            },
        }
    }
}

impl BlockSources {
    /// Sources served from a different base URL, using the upstream file names.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let url = |category: Category, kind: &str| format!("{}/{}-{}.updated", base, category, kind);
        Self {
            hostnames: SourceUrls {
                malicious: url(Category::Malicious, "hostnames"),
                ads: url(Category::Ads, "hostnames"),
                surveillance: url(Category::Surveillance, "hostnames"),
            },
            ips: SourceUrls {
                malicious: url(Category::Malicious, "ips"),
                ads: url(Category::Ads, "ips"),
                surveillance: url(Category::Surveillance, "ips"),
            },
        }
    }

    /// True when the upstream lists are used.
    pub fn is_upstream(&self) -> bool {
        self.hostnames.malicious.starts_with(FILES_BASE_URL)
            && self.ips.malicious.starts_with(FILES_BASE_URL)
    }
}

/// User blocking settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlockSettings {
    /// Block hostnames and IPs known to serve malware
    pub malicious: bool,

    /// Block advertising hostnames and IPs
    pub ads: bool,

    /// Block tracking and surveillance hostnames and IPs
    pub surveillance: bool,

    /// Extra hostnames to block
    pub blocked_hostnames: Vec<String>,

    /// Extra IPs or CIDRs to block
    pub blocked_ips: Vec<String>,

    /// Hostnames to never block
    pub allowed_hostnames: Vec<String>,

    /// Remote list locations
    pub sources: BlockSources,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            malicious: true,
            ads: false,
            surveillance: false,
            blocked_hostnames: Vec::new(),
            blocked_ips: Vec::new(),
            allowed_hostnames: Vec::new(),
            sources: BlockSources::default(),
        }
    }
}

impl BlockSettings {
    pub fn categories(&self) -> BlockCategories {
        BlockCategories {
            malicious: self.malicious,
            ads: self.ads,
            surveillance: self.surveillance,
        }
    }
}

/// Aggregated unbound lines plus every list that could not be fetched
#[derive(Debug, Default)]
pub struct BlockedLines {
    pub hostnames: Vec<String>,
    pub ips: Vec<String>,
    pub errors: Vec<FetchError>,
}

/// Build hostname and IP block lines concurrently.
///
/// `private_addresses` are merged with the user-blocked IPs. Returns only once
/// both aggregations, and every fetch they started, are done.
pub async fn build_blocked(
    token: &CancellationToken,
    client: &Client,
    settings: &BlockSettings,
    private_addresses: &[String],
) -> BlockedLines {
    let categories = settings.categories();
    let blocked_ips: Vec<String> = settings
        .blocked_ips
        .iter()
        .chain(private_addresses)
        .cloned()
        .collect();
    let ((hostnames, hostname_errors), (ips, ip_errors)) = tokio::join!(
        build_blocked_hostnames(
            token,
            client,
            &settings.sources.hostnames,
            categories,
            &settings.blocked_hostnames,
            &settings.allowed_hostnames,
        ),
        build_blocked_ips(
            token,
            client,
            &settings.sources.ips,
            categories,
            &blocked_ips,
        ),
    );

    let mut errors = hostname_errors;
    errors.extend(ip_errors);

    info!(
        "Blocking {} hostnames and {} IPs ({} lists failed)",
        format_count(hostnames.len()),
        format_count(ips.len()),
        errors.len()
    );

    BlockedLines {
        hostnames,
        ips,
        errors,
    }
}

/// Fetch hostname lists and merge them with the user block and allow lists.
pub async fn build_blocked_hostnames(
    token: &CancellationToken,
    client: &Client,
    urls: &SourceUrls,
    categories: BlockCategories,
    blocked_hostnames: &[String],
    allowed_hostnames: &[String],
) -> (Vec<String>, Vec<FetchError>) {
    let (fetched, errors) = fetch_categories(token, client, urls, categories).await;
    let lines = merge_hostnames(fetched, blocked_hostnames, allowed_hostnames);
    (lines, errors)
}

/// Fetch IP lists and merge them with the user block list.
pub async fn build_blocked_ips(
    token: &CancellationToken,
    client: &Client,
    urls: &SourceUrls,
    categories: BlockCategories,
    blocked_ips: &[String],
) -> (Vec<String>, Vec<FetchError>) {
    let (fetched, errors) = fetch_categories(token, client, urls, categories).await;
    let lines = merge_ips(fetched, blocked_ips);
    (lines, errors)
}

/// Download every enabled category list in parallel and union the results.
///
/// Failed categories are logged and returned; they never hide the entries
/// of the categories that succeeded.
async fn fetch_categories(
    token: &CancellationToken,
    client: &Client,
    urls: &SourceUrls,
    categories: BlockCategories,
) -> (LineSet, Vec<FetchError>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut pending = Vec::new();

    for category in categories.enabled() {
        let tx = tx.clone();
        let token = token.clone();
        let client = client.clone();
        let url = urls.get(category).to_string();
        pending.push((category, url.clone()));
        tokio::spawn(async move {
            let result = get_list(&token, &client, &url).await;
            let _ = tx.send((category, result));
        });
    }
    drop(tx);

    collect_results(rx, pending).await
}

type FetchResult = (Category, Result<LineSet, FetchError>);

/// Receive one result per pending category.
///
/// The channel closes once every worker is gone. Categories still pending at
/// that point belong to workers that panicked, and are reported as
/// [`TransportFailure::WorkerLost`].
async fn collect_results(
    mut rx: mpsc::UnboundedReceiver<FetchResult>,
    mut pending: Vec<(Category, String)>,
) -> (LineSet, Vec<FetchError>) {
    let mut unique = LineSet::new();
    let mut errors = Vec::new();

    while !pending.is_empty() {
        let Some((category, result)) = rx.recv().await else {
            break;
        };
        pending.retain(|(c, _)| *c != category);

        match result {
            Ok(entries) => {
                debug!("{} list: {} entries", category, format_count(entries.len()));
                unique.extend(entries);
            }
            Err(e) => {
                warn!("Failed to fetch {} list: {}", category, e);
                errors.push(e);
            }
        }
    }

    for (category, url) in pending {
        warn!("{} list fetch ended without a result", category);
        errors.push(FetchError::Transport {
            url,
            source: TransportFailure::WorkerLost,
        });
    }

    (unique, errors)
}

/// True if `hostname` is an allowed hostname or one of its subdomains.
pub fn is_allowed(hostname: &str, allowed_hostnames: &[String]) -> bool {
    allowed_hostnames.iter().any(|allowed| {
        hostname == allowed
            || hostname
                .strip_suffix(allowed.as_str())
                .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Merge fetched hostnames with user overrides into sorted `local-zone` lines.
///
/// User-blocked hostnames are skipped when they match an allow entry exactly or
/// as a subdomain. Allow entries are then removed from the set, but only by
/// exact name: a fetched subdomain of an allowed hostname stays blocked.
pub fn merge_hostnames(
    mut hostnames: LineSet,
    blocked_hostnames: &[String],
    allowed_hostnames: &[String],
) -> Vec<String> {
    for blocked in blocked_hostnames {
        if !is_allowed(blocked, allowed_hostnames) {
            hostnames.insert(blocked.clone());
        }
    }

    for allowed in allowed_hostnames {
        hostnames.remove(allowed);
    }

    let mut lines: Vec<String> = hostnames.iter().map(|h| hostname_line(h)).collect();
    lines.sort();
    lines
}

/// Merge fetched IPs/CIDRs with user-blocked ones into sorted `private-address` lines.
pub fn merge_ips(mut ips: LineSet, blocked_ips: &[String]) -> Vec<String> {
    ips.extend(blocked_ips.iter().cloned());

    let mut lines: Vec<String> = ips.iter().map(|ip| private_address_line(ip)).collect();
    lines.sort();
    lines
}

pub fn hostname_line(hostname: &str) -> String {
    format!("  local-zone: \"{}\" static", hostname)
}

pub fn private_address_line(ip: &str) -> String {
    format!("  private-address: {}", ip)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn label() -> impl Strategy<Value = String> {
        "[a-z]{1,6}"
    }

    fn hostname() -> impl Strategy<Value = String> {
        prop::collection::vec(label(), 1..4).prop_map(|labels| labels.join("."))
    }

    fn hostnames(max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(hostname(), 0..max)
    }

    fn zone(line: &str) -> &str {
        line.trim_start_matches("  local-zone: \"")
            .trim_end_matches("\" static")
    }

    proptest! {
        /// Output lines are always sorted
        #[test]
        fn prop_hostname_lines_sorted(
            fetched in hostnames(30),
            blocked in hostnames(10),
            allowed in hostnames(5)
        ) {
            let lines = merge_hostnames(fetched.into_iter().collect(), &blocked, &allowed);
            let mut sorted = lines.clone();
            sorted.sort();
            prop_assert_eq!(lines, sorted);
        }

        /// Allowed hostnames never appear in the output
        #[test]
        fn prop_allowed_never_blocked(
            fetched in hostnames(30),
            blocked in hostnames(10),
            allowed in hostnames(5)
        ) {
            let lines = merge_hostnames(fetched.into_iter().collect(), &blocked, &allowed);
            for line in &lines {
                prop_assert!(!allowed.iter().any(|a| a == zone(line)));
            }
        }

        /// A user-blocked subdomain of an allowed hostname is never blocked
        #[test]
        fn prop_user_blocked_subdomain_of_allowed_excluded(
            sub in label(),
            allowed in hostname()
        ) {
            let blocked = vec![format!("{}.{}", sub, allowed)];
            let lines = merge_hostnames(LineSet::new(), &blocked, &[allowed]);
            prop_assert!(lines.is_empty());
        }

        /// Merging does not depend on the order lists arrive in
        #[test]
        fn prop_merge_order_independent(
            first in hostnames(20),
            second in hostnames(20),
            blocked in hostnames(10),
            allowed in hostnames(5)
        ) {
            let forward: LineSet = first.iter().chain(second.iter()).cloned().collect();
            let backward: LineSet = second.iter().chain(first.iter()).cloned().collect();
            let mut reversed_blocked = blocked.clone();
            reversed_blocked.reverse();

            prop_assert_eq!(
                merge_hostnames(forward, &blocked, &allowed),
                merge_hostnames(backward, &reversed_blocked, &allowed)
            );
        }

        /// IP lines are sorted and contain every user-blocked entry once
        #[test]
        fn prop_ip_lines_sorted_unique(
            fetched in prop::collection::vec("[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}", 0..30),
            blocked in prop::collection::vec("[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}", 0..10)
        ) {
            let lines = merge_ips(fetched.into_iter().collect(), &blocked);
            let mut sorted = lines.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(&lines, &sorted);
            for ip in &blocked {
                prop_assert!(lines.contains(&private_address_line(ip)));
            }
        }
    }
}

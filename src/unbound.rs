//! Unbound configuration rendering and persistence.
//!
//! The rendered document is a `server:` block of sorted options followed by
//! the blocklist lines, then a `forward-zone:` block sending every query over
//! DNS over TLS to the selected providers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::fs_abstraction::FileSystem;
use crate::provider::Provider;

pub const UNBOUND_CONF_FILENAME: &str = "unbound.conf";
pub const INCLUDE_CONF_FILENAME: &str = "include.conf";
pub const CA_CERTS_FILENAME: &str = "ca-certificates.crt";
pub const ROOT_HINTS_FILENAME: &str = "root.hints";
pub const ROOT_KEY_FILENAME: &str = "root.key";

const CONF_FILE_MODE: u32 = 0o644;

/// Private and local ranges unbound strips from public answers, guarding
/// against DNS rebinding
pub const DEFAULT_PRIVATE_ADDRESSES: [&str; 9] = [
    "127.0.0.0/8",
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "169.254.0.0/16",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
    "::ffff:0:0/96",
];

/// Resolver settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UnboundSettings {
    /// Port unbound listens on
    pub listening_port: u16,

    /// Cache answers from upstream providers
    pub caching: bool,

    /// Unbound verbosity level (0-5)
    pub verbosity_level: u8,

    /// DNSSEC validation log level (0-2)
    pub validation_log_level: u8,

    /// Answer and query over IPv4
    pub ipv4: bool,

    /// Answer and query over IPv6
    pub ipv6: bool,

    /// Upstream DNS over TLS providers
    pub providers: Vec<Provider>,

    /// IPs or CIDRs never accepted in public answers
    pub private_addresses: Vec<String>,
}

impl Default for UnboundSettings {
    fn default() -> Self {
        Self {
            listening_port: 53,
            caching: true,
            verbosity_level: 1,
            validation_log_level: 0,
            ipv4: true,
            ipv6: false,
            providers: vec![Provider::Cloudflare],
            private_addresses: DEFAULT_PRIVATE_ADDRESSES
                .iter()
                .map(|a| a.to_string())
                .collect(),
        }
    }
}

fn yes_no(value: bool) -> String {
    let word = if value { "yes" } else { "no" };
    word.to_string()
}

fn quoted(value: impl std::fmt::Display) -> String {
    format!("\"{}\"", value)
}

/// Render `  key: value` lines sorted as whole lines.
fn section_lines(options: Vec<(&str, String)>) -> Vec<String> {
    let mut lines: Vec<String> = options
        .into_iter()
        .map(|(key, value)| format!("  {}: {}", key, value))
        .collect();
    lines.sort();
    lines
}

/// Generate the full unbound configuration.
///
/// `hostname_lines` and `ip_lines` are inserted verbatim after the server
/// options, in that order.
pub fn generate_unbound_conf(
    settings: &UnboundSettings,
    hostname_lines: &[String],
    ip_lines: &[String],
    unbound_dir: &Path,
    username: &str,
) -> Vec<String> {
    let in_dir = |filename: &str| quoted(unbound_dir.join(filename).display());

    let mut server = vec![
        // Logging
        ("verbosity", settings.verbosity_level.to_string()),
        ("val-log-level", settings.validation_log_level.to_string()),
        ("use-syslog", yes_no(false)),
        // Performance
        ("num-threads", "2".to_string()),
        ("prefetch", yes_no(true)),
        ("prefetch-key", yes_no(true)),
        ("key-cache-size", "32m".to_string()),
        ("key-cache-slabs", "4".to_string()),
        ("msg-cache-size", "8m".to_string()),
        ("msg-cache-slabs", "4".to_string()),
        ("rrset-cache-size", "8m".to_string()),
        ("rrset-cache-slabs", "4".to_string()),
        ("cache-min-ttl", "3600".to_string()),
        ("cache-max-ttl", "9000".to_string()),
        // Privacy
        ("rrset-roundrobin", yes_no(true)),
        ("hide-identity", yes_no(true)),
        ("hide-version", yes_no(true)),
        // Security
        ("tls-cert-bundle", in_dir(CA_CERTS_FILENAME)),
        ("root-hints", in_dir(ROOT_HINTS_FILENAME)),
        ("trust-anchor-file", in_dir(ROOT_KEY_FILENAME)),
        ("harden-below-nxdomain", yes_no(true)),
        ("harden-referral-path", yes_no(true)),
        ("harden-algo-downgrade", yes_no(true)),
        // Network
        ("do-ip4", yes_no(settings.ipv4)),
        ("do-ip6", yes_no(settings.ipv6)),
        ("interface", "0.0.0.0".to_string()),
        ("port", settings.listening_port.to_string()),
        // Other
        ("username", quoted(username)),
        ("include", INCLUDE_CONF_FILENAME.to_string()),
    ];

    if settings.providers.iter().any(|p| !p.supports_dnssec()) {
        server.retain(|(key, _)| *key != "trust-anchor-file");
    }

    let forward_zone = vec![
        ("name", quoted(".")),
        ("forward-tls-upstream", yes_no(true)),
        ("forward-no-cache", yes_no(!settings.caching)),
    ];

    let mut lines = Vec::with_capacity(
        server.len() + hostname_lines.len() + ip_lines.len() + forward_zone.len() + 2,
    );
    lines.push("server:".to_string());
    lines.extend(section_lines(server));
    lines.extend_from_slice(hostname_lines);
    lines.extend_from_slice(ip_lines);

    lines.push("forward-zone:".to_string());
    lines.extend(section_lines(forward_zone));
    for provider in &settings.providers {
        let data = provider.data();
        for ip in &data.ips {
            lines.push(format!("  forward-addr: {}@{}#{}", ip, data.port, data.host));
        }
    }

    lines
}

/// Write the rendered lines to `unbound.conf` in `unbound_dir`.
///
/// Also creates an empty `include.conf` if there is none, since the server
/// block always includes it.
pub fn write_unbound_conf(
    fs: &dyn FileSystem,
    unbound_dir: &Path,
    lines: &[String],
) -> Result<PathBuf> {
    fs.create_dir_all(unbound_dir)
        .with_context(|| format!("Failed to create directory {:?}", unbound_dir))?;

    let conf_path = unbound_dir.join(UNBOUND_CONF_FILENAME);
    fs.write(&conf_path, lines.join("\n").as_bytes())
        .with_context(|| format!("Failed to write {:?}", conf_path))?;
    fs.set_permissions_mode(&conf_path, CONF_FILE_MODE)
        .with_context(|| format!("Failed to set permissions on {:?}", conf_path))?;

    let include_path = unbound_dir.join(INCLUDE_CONF_FILENAME);
    if !fs.exists(&include_path) {
        debug!("Creating empty {:?}", include_path);
        fs.write(&include_path, b"")
            .with_context(|| format!("Failed to create {:?}", include_path))?;
    }

    info!("Wrote {} lines to {:?}", lines.len(), conf_path);
    Ok(conf_path)
}

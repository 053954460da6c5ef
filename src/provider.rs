//! Upstream DNS-over-TLS providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::UnboundError;

/// DNS over TLS port used by every provider
pub const DOT_PORT: u16 = 853;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    Cloudflare,
    Google,
    Quad9,
    Quad9Secured,
    Quad9Unsecured,
    Cleanbrowsing,
    Libredns,
}

/// Addresses and TLS name of a provider's DNS over TLS service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderData {
    pub ips: Vec<IpAddr>,
    pub host: &'static str,
    pub port: u16,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::Cloudflare,
        Provider::Google,
        Provider::Quad9,
        Provider::Quad9Secured,
        Provider::Quad9Unsecured,
        Provider::Cleanbrowsing,
        Provider::Libredns,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Cloudflare => "cloudflare",
            Provider::Google => "google",
            Provider::Quad9 => "quad9",
            Provider::Quad9Secured => "quad9-secured",
            Provider::Quad9Unsecured => "quad9-unsecured",
            Provider::Cleanbrowsing => "cleanbrowsing",
            Provider::Libredns => "libredns",
        }
    }

    /// LibreDNS does not serve DNSSEC, so no trust anchor may be configured for it.
    pub fn supports_dnssec(&self) -> bool {
        !matches!(self, Provider::Libredns)
    }

    pub fn data(&self) -> ProviderData {
        let (ips, host): (Vec<IpAddr>, &'static str) = match self {
            Provider::Cloudflare => (
                vec![
                    v4(1, 1, 1, 1),
                    v4(1, 0, 0, 1),
                    v6([0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1111]),
                    v6([0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1001]),
                ],
                "cloudflare-dns.com",
            ),
            Provider::Google => (
                vec![
                    v4(8, 8, 8, 8),
                    v4(8, 8, 4, 4),
                    v6([0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888]),
                    v6([0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8844]),
                ],
                "dns.google",
            ),
            Provider::Quad9 => (
                vec![
                    v4(9, 9, 9, 9),
                    v4(149, 112, 112, 112),
                    v6([0x2620, 0xfe, 0, 0, 0, 0, 0, 0xfe]),
                    v6([0x2620, 0xfe, 0, 0, 0, 0, 0, 0x9]),
                ],
                "dns.quad9.net",
            ),
            Provider::Quad9Secured => (
                vec![
                    v4(9, 9, 9, 11),
                    v4(149, 112, 112, 11),
                    v6([0x2620, 0xfe, 0, 0, 0, 0, 0, 0x11]),
                    v6([0x2620, 0xfe, 0, 0, 0, 0, 0xfe, 0x11]),
                ],
                "dns11.quad9.net",
            ),
            Provider::Quad9Unsecured => (
                vec![
                    v4(9, 9, 9, 10),
                    v4(149, 112, 112, 10),
                    v6([0x2620, 0xfe, 0, 0, 0, 0, 0, 0x10]),
                    v6([0x2620, 0xfe, 0, 0, 0, 0, 0xfe, 0x10]),
                ],
                "dns10.quad9.net",
            ),
            Provider::Cleanbrowsing => (
                vec![
                    v4(185, 228, 168, 9),
                    v4(185, 228, 169, 9),
                    v6([0x2a0d, 0x2a00, 0x1, 0, 0, 0, 0, 0x2]),
                    v6([0x2a0d, 0x2a00, 0x2, 0, 0, 0, 0, 0x2]),
                ],
                "security-filter-dns.cleanbrowsing.org",
            ),
            Provider::Libredns => (
                vec![
                    v4(116, 202, 176, 26),
                    v6([0x2a01, 0x4f8, 0x1c0c, 0x8274, 0, 0, 0, 0x1]),
                ],
                "dot.libredns.gr",
            ),
        };

        ProviderData {
            ips,
            host,
            port: DOT_PORT,
        }
    }
}

fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

fn v6(segments: [u16; 8]) -> IpAddr {
    IpAddr::V6(Ipv6Addr::from(segments))
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = UnboundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| UnboundError::UnknownProvider(s.to_string()))
    }
}

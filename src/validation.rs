//! Validation of user-supplied block and allow entries.

use anyhow::{bail, Result};
use ipnet::IpNet;
use std::net::IpAddr;

/// Maximum length of a full hostname (RFC 1035)
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single label
const MAX_LABEL_LEN: usize = 63;

/// Validate an IP address or CIDR string and return the parsed IpNet.
///
/// If the input is a plain IP address (without /prefix), it will be converted
/// to a /32 (IPv4) or /128 (IPv6) network.
///
/// # Examples
/// ```
/// use unbound_dot::validation::validate_ip_or_cidr;
/// assert!(validate_ip_or_cidr("192.168.1.1").is_ok());
/// assert!(validate_ip_or_cidr("192.168.0.0/24").is_ok());
/// assert!(validate_ip_or_cidr("invalid").is_err());
/// ```
pub fn validate_ip_or_cidr(ip_str: &str) -> Result<IpNet> {
    if ip_str.contains('/') {
        ip_str
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid CIDR: {}", ip_str))
    } else {
        let ip: IpAddr = ip_str
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid IP address: {}", ip_str))?;
        Ok(IpNet::from(ip))
    }
}

/// Validate a hostname made of dot-separated RFC 1123 labels.
///
/// Underscores are tolerated since they show up in real blocklists.
///
/// # Examples
/// ```
/// use unbound_dot::validation::validate_hostname;
/// assert!(validate_hostname("ads.example.com").is_ok());
/// assert!(validate_hostname("-bad.com").is_err());
/// ```
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.is_empty() {
        bail!("Hostname cannot be empty");
    }
    if hostname.len() > MAX_HOSTNAME_LEN {
        bail!("Hostname too long ({} chars): {}", hostname.len(), hostname);
    }

    for label in hostname.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            bail!("Invalid hostname '{}': bad label length", hostname);
        }
        if label.starts_with('-') || label.ends_with('-') {
            bail!("Invalid hostname '{}': label '{}' starts or ends with '-'", hostname, label);
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            bail!("Invalid hostname '{}': invalid characters", hostname);
        }
    }

    Ok(())
}

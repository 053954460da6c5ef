//! Configuration management for unbound-dot.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::aggregator::BlockSettings;
use crate::error::UnboundError;
use crate::fetcher::DEFAULT_TIMEOUT_SECS;
use crate::unbound::UnboundSettings;
use crate::validation::{validate_hostname, validate_ip_or_cidr};

const MAX_VERBOSITY_LEVEL: u8 = 5;
const MAX_VALIDATION_LOG_LEVEL: u8 = 2;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding unbound.conf, root hints, root key and CA bundle
    pub unbound_dir: PathBuf,

    /// User unbound drops privileges to
    pub username: String,

    /// Whole-request timeout for each list download
    pub http_timeout_secs: u64,

    /// Check that DNS resolves after writing the configuration
    pub check_dns: bool,

    /// Seconds between blocklist refreshes after the first generation, 0 to disable
    pub update_period_secs: u64,

    /// Resolver settings
    pub unbound: UnboundSettings,

    /// Blocklist settings
    pub blocking: BlockSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unbound_dir: PathBuf::from("/etc/unbound"),
            username: "unbound".to_string(),
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            check_dns: true,
            update_period_secs: 0,
            unbound: UnboundSettings::default(),
            blocking: BlockSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            warn!(
                "Config file {:?} not found, using default settings",
                path.as_ref()
            );
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Refresh period, if periodic updates are enabled
    pub fn update_period(&self) -> Option<Duration> {
        (self.update_period_secs > 0).then(|| Duration::from_secs(self.update_period_secs))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), UnboundError> {
        let fail = |msg: String| -> Result<(), UnboundError> { Err(UnboundError::Config(msg)) };
        let unbound = &self.unbound;

        if unbound.listening_port == 0 {
            return fail("listening_port cannot be 0".to_string());
        }
        if unbound.verbosity_level > MAX_VERBOSITY_LEVEL {
            return fail(format!(
                "verbosity_level {} must be between 0 and {}",
                unbound.verbosity_level, MAX_VERBOSITY_LEVEL
            ));
        }
        if unbound.validation_log_level > MAX_VALIDATION_LOG_LEVEL {
            return fail(format!(
                "validation_log_level {} must be between 0 and {}",
                unbound.validation_log_level, MAX_VALIDATION_LOG_LEVEL
            ));
        }
        if !unbound.ipv4 && !unbound.ipv6 {
            return fail("at least one of ipv4 and ipv6 must be enabled".to_string());
        }
        if unbound.providers.is_empty() {
            return fail("at least one DNS provider is required".to_string());
        }
        if self.username.is_empty() || self.username.contains('"') {
            return fail(format!("invalid username {:?}", self.username));
        }
        if self.http_timeout_secs == 0 {
            return fail("http_timeout_secs cannot be 0".to_string());
        }

        let blocking = &self.blocking;
        for hostname in blocking
            .blocked_hostnames
            .iter()
            .chain(&blocking.allowed_hostnames)
        {
            if let Err(e) = validate_hostname(hostname) {
                return fail(e.to_string());
            }
        }
        for ip in blocking.blocked_ips.iter().chain(&unbound.private_addresses) {
            if let Err(e) = validate_ip_or_cidr(ip) {
                return fail(e.to_string());
            }
        }

        for url in [
            &blocking.sources.hostnames.malicious,
            &blocking.sources.hostnames.ads,
            &blocking.sources.hostnames.surveillance,
            &blocking.sources.ips.malicious,
            &blocking.sources.ips.ads,
            &blocking.sources.ips.surveillance,
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return fail(format!("blocklist URL must be HTTP(S): {}", url));
            }
        }

        Ok(())
    }
}

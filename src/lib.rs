//! # unbound-dot - Unbound DNS over TLS configurator
//!
//! Generates an Unbound configuration that forwards every query over DNS over
//! TLS and blocks hostnames and IPs taken from remote blocklists plus the
//! user's own block and allow lists.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       unbound-dot                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: generate, check, providers, version        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Unbound settings + blocking settings                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls, tokio-util cancellation)        │
//! │    └── One newline-delimited list per request               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator                                                 │
//! │    ├── Fan-out per category (malicious, ads, surveillance)  │
//! │    └── Merge with user block/allow lists, sorted output     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Unbound renderer + writer                                  │
//! │    └── server: / forward-zone: blocks, unbound.conf         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use unbound_dot::aggregator::build_blocked;
//! use unbound_dot::config::Config;
//! use unbound_dot::fetcher::build_client;
//! use unbound_dot::fs_abstraction::real_fs;
//! use unbound_dot::unbound::{generate_unbound_conf, write_unbound_conf};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("/etc/unbound-dot/config.yaml")?;
//!     let client = build_client(config.http_timeout())?;
//!     let token = CancellationToken::new();
//!
//!     // Failed lists are reported but never block the others
//!     let blocked = build_blocked(
//!         &token,
//!         &client,
//!         &config.blocking,
//!         &config.unbound.private_addresses,
//!     )
//!     .await;
//!
//!     let lines = generate_unbound_conf(
//!         &config.unbound,
//!         &blocked.hostnames,
//!         &blocked.ips,
//!         &config.unbound_dir,
//!         &config.username,
//!     );
//!     write_unbound_conf(real_fs(), &config.unbound_dir, &lines)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - Concurrent list fetching and merging
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`dns`] - DNS readiness check
//! - [`error`] - Fetch and configuration errors
//! - [`fetcher`] - HTTP download of a single list
//! - [`fs_abstraction`] - Mockable filesystem access
//! - [`provider`] - DNS over TLS provider data
//! - [`signal`] - Cancellation on SIGINT/SIGTERM
//! - [`unbound`] - Configuration rendering and writing
//! - [`utils`] - Formatting helpers
//! - [`validation`] - Hostname and IP validation

pub mod aggregator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dns;
pub mod error;
pub mod fetcher;
pub mod fs_abstraction;
pub mod provider;
pub mod signal;
pub mod unbound;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{FetchError, UnboundError};

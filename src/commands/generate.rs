//! Generate command implementation.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::aggregator::build_blocked;
use crate::config::Config;
use crate::dns::wait_for_dns;
use crate::fetcher::build_client;
use crate::fs_abstraction::real_fs;
use crate::unbound::{generate_unbound_conf, write_unbound_conf};
use crate::utils::format_count;

/// Run the generate command
pub async fn run(dry_run: bool, config_path: &Path, token: &CancellationToken) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    let client = build_client(config.http_timeout())?;

    if dry_run {
        for line in render(&config, &client, token).await? {
            println!("{}", line);
        }
        return Ok(());
    }

    generate_and_write(&config, &client, token).await?;

    if config.check_dns {
        wait_for_dns(token).await?;
    }

    match config.update_period() {
        Some(period) => run_periodic(&config, &client, token, period).await,
        None => Ok(()),
    }
}

/// Fetch blocklists and render the full configuration.
async fn render(
    config: &Config,
    client: &Client,
    token: &CancellationToken,
) -> Result<Vec<String>> {
    let enabled = config.blocking.categories().enabled();
    info!("Building blocklists for {} categories...", enabled.len());

    let blocked = build_blocked(
        token,
        client,
        &config.blocking,
        &config.unbound.private_addresses,
    )
    .await;

    if token.is_cancelled() {
        bail!("Cancelled before the configuration was written");
    }

    // One hostname list and one IP list per category
    if !enabled.is_empty() && blocked.errors.len() == enabled.len() * 2 {
        error!("Every blocklist failed, only user-specified entries are blocked");
    } else if !blocked.errors.is_empty() {
        warn!(
            "{} blocklists could not be fetched, continuing with partial data",
            blocked.errors.len()
        );
    }

    info!(
        "{} hostname and {} IP lines rendered",
        format_count(blocked.hostnames.len()),
        format_count(blocked.ips.len())
    );

    Ok(generate_unbound_conf(
        &config.unbound,
        &blocked.hostnames,
        &blocked.ips,
        &config.unbound_dir,
        &config.username,
    ))
}

/// Render the configuration and write it to the unbound directory.
async fn generate_and_write(
    config: &Config,
    client: &Client,
    token: &CancellationToken,
) -> Result<PathBuf> {
    let lines = render(config, client, token).await?;
    let path = write_unbound_conf(real_fs(), &config.unbound_dir, &lines)?;

    println!();
    println!("[OK] {} written ({} lines)", path.display(), lines.len());
    Ok(path)
}

/// Regenerate the configuration every `period` until `token` is cancelled.
///
/// A failed refresh is logged and the previous configuration stays in place.
pub async fn run_periodic(
    config: &Config,
    client: &Client,
    token: &CancellationToken,
    period: Duration,
) -> Result<()> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    interval.tick().await;
    info!("Refreshing blocklists every {:?}", period);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        if let Err(e) = generate_and_write(config, client, token).await {
            if token.is_cancelled() {
                break;
            }
            error!("Blocklist refresh failed: {:#}", e);
        }
    }

    info!("Stopped periodic blocklist refresh");
    Ok(())
}

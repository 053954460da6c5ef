//! unbound-dot - Unbound DNS over TLS configurator
//!
//! Generates unbound.conf from user settings and aggregated blocklists.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use unbound_dot::cli::{Cli, Commands};
use unbound_dot::signal::spawn_shutdown_listener;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // Logs go to stderr so `generate --dry-run` output stays a clean config
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let token = CancellationToken::new();
    spawn_shutdown_listener(token.clone());

    match cli.command {
        Commands::Generate { dry_run } => {
            unbound_dot::commands::generate::run(dry_run, &cli.config, &token).await
        }
        Commands::Check => unbound_dot::commands::check::run(&token).await,
        Commands::Providers => {
            unbound_dot::commands::providers::run();
            Ok(())
        }
        Commands::Version => {
            println!("unbound-dot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

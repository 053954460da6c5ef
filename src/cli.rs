//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unbound-dot")]
#[command(author, version, about = "Unbound DNS over TLS configurator with blocklists")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "/etc/unbound-dot/config.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch blocklists and write unbound.conf
    Generate {
        /// Print the configuration to stdout instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Wait until DNS resolution works
    Check,

    /// List supported DNS over TLS providers
    Providers,

    /// Show version
    Version,
}

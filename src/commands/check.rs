//! Check command implementation.

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::dns::{wait_for_dns, HOST_TO_RESOLVE};

/// Run the check command
pub async fn run(token: &CancellationToken) -> Result<()> {
    wait_for_dns(token).await?;
    println!("[OK] DNS is working ({} resolves)", HOST_TO_RESOLVE);
    Ok(())
}

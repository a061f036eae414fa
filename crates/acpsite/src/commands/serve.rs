//! Preview server command.

use std::path::Path;

use anyhow::{Context, Result};

/// Run the serve command.
pub async fn run(port: u16, dir: &Path, open: bool) -> Result<()> {
    acpsite_server::serve_static(dir, "127.0.0.1", port, open)
        .await
        .context("Run 'acpsite build' first")?;

    Ok(())
}

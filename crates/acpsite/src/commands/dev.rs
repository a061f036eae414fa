//! Development server command.

use std::sync::Arc;

use anyhow::Result;
use acpsite_server::{DevServer, DevServerConfig};
use acpsite_static::ThemeStore;

use crate::config::Config;

/// Run the dev server.
pub async fn run(config: &Config, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let server_config = DevServerConfig {
        content_dir: config.docs.dir.clone(),
        port,
        open,
        title: config.docs.title.clone(),
        styles: config.docs.styles.clone(),
        ..Default::default()
    };
    let theme = Arc::new(ThemeStore::new(config.theme));

    DevServer::new(server_config, theme).start().await?;

    Ok(())
}

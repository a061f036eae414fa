//! Preview server for a built site.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use acpsite_mdx::DOCS_PREFIX;

use crate::server::ServerError;

/// Router serving files from `dir`, with the built 404 page for misses.
pub fn static_router(dir: &Path) -> Router {
    let not_found = ServeFile::new(dir.join("404.html"));
    Router::new().fallback_service(ServeDir::new(dir).not_found_service(not_found))
}

/// Serve a built site until the process is stopped.
pub async fn serve_static(dir: &Path, host: &str, port: u16, open: bool) -> Result<(), ServerError> {
    if !dir.is_dir() {
        return Err(ServerError::MissingDirectory(dir.display().to_string()));
    }

    let address = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServerError::BindError(address.clone(), e.to_string()))?;

    let url = format!("http://{}{}", address, DOCS_PREFIX);
    tracing::info!("Serving {} at {}", dir.display(), url);

    if open {
        if let Err(e) = open::that(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    axum::serve(listener, static_router(dir))
        .await
        .map_err(|e| ServerError::ServeError(e.to_string()))
}

//! Development server implementation.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::sync::broadcast::error::RecvError;

use acpsite_content::{doc_href, ContentSource};
use acpsite_mdx::DOCS_PREFIX;
use acpsite_static::{
    AssetPipeline, PageRenderer, SiteOptions, ThemeState, ThemeStore, ThemeVariant,
};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{hmr_client_script, HmrHub, HmrMessage};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Content source root
    pub content_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Site title
    pub title: String,

    /// Extra stylesheets served under `/assets/`
    pub styles: Vec<PathBuf>,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/docs"),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
            title: "ACP Protocol".to_string(),
            styles: vec![],
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {0}: {1}")]
    BindError(String, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Server error: {0}")]
    ServeError(String),

    #[error("Directory not found: {0}. Run 'acpsite build' first.")]
    MissingDirectory(String),
}

/// A rendered response body and whether the document existed.
enum RenderedPage {
    Found(String),
    NotFound(String),
}

/// Shared server state.
struct AppState {
    source: ContentSource,
    renderer: PageRenderer,
    theme: Arc<ThemeStore>,
    hmr: HmrHub,
    styles: Vec<PathBuf>,
}

impl AppState {
    fn new(config: &DevServerConfig, theme: Arc<ThemeStore>, hmr: HmrHub) -> Self {
        let styles = config
            .styles
            .iter()
            .filter_map(|path| AssetPipeline::stylesheet_href(path))
            .collect();

        Self {
            source: ContentSource::new(&config.content_dir),
            renderer: PageRenderer::new(SiteOptions {
                title: config.title.clone(),
                styles,
                dev: true,
            }),
            theme,
            hmr,
            styles: config.styles.clone(),
        }
    }

    /// Render a slug against the current content tree and theme.
    fn render(&self, slug: &[String]) -> Result<RenderedPage, minijinja::Error> {
        let nav = self.source.build_navigation();
        let theme = self.theme.snapshot();

        match self.source.doc_by_slug(slug) {
            Some(doc) => Ok(RenderedPage::Found(
                self.renderer.render_doc(&doc, &nav, theme)?,
            )),
            None => Ok(RenderedPage::NotFound(self.renderer.render_not_found(
                &nav,
                &doc_href(slug),
                theme,
            )?)),
        }
    }
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
    theme: Arc<ThemeStore>,
}

impl DevServer {
    /// Create a new development server using the given theme store.
    pub fn new(config: DevServerConfig, theme: Arc<ThemeStore>) -> Self {
        Self { config, theme }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let hmr = HmrHub::new();
        let state = Arc::new(AppState::new(&self.config, Arc::clone(&self.theme), hmr.clone()));

        // Theme changes reach every open page
        let theme_hub = hmr.clone();
        let subscription = self.theme.subscribe(move |theme| {
            theme_hub.send(HmrMessage::from(*theme));
        });

        let mut watch_paths = vec![self.config.content_dir.clone()];
        watch_paths.extend(self.config.styles.iter().cloned());

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let watch_hub = hmr.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&watch_hub, event);
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state);

        let address = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| ServerError::BindError(address.clone(), e.to_string()))?;

        let url = format!("http://{}{}", address, DOCS_PREFIX);
        tracing::info!("Starting dev server at {}", url);

        if self.config.open {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let served = axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()));

        self.theme.unsubscribe(subscription);
        served
    }
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::temporary(DOCS_PREFIX) }))
        .route("/docs", get(docs_root_handler))
        .route("/docs/", get(docs_root_handler))
        .route("/docs/{*slug}", get(doc_handler))
        .route("/assets/{file}", get(asset_handler))
        .route("/themes/{file}", get(theme_css_handler))
        .route("/__theme/{variant}", post(set_theme_handler))
        .route("/__hmr", get(ws_handler))
        .route("/__hmr.js", get(hmr_script_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Handle file watch events.
fn handle_watch_event(hmr: &HmrHub, event: WatchEvent) {
    let path = event.path().display();
    match event {
        WatchEvent::ContentModified(_) => tracing::info!("Content modified: {}", path),
        WatchEvent::Created(_) => tracing::info!("Created: {}", path),
        WatchEvent::Deleted(_) => tracing::info!("Deleted: {}", path),
        WatchEvent::Modified(_) => tracing::debug!("Modified: {}", path),
    }

    // Pages are rendered per request, so a reload always shows the new tree
    hmr.send(HmrMessage::Reload);
}

async fn render_slug(state: Arc<AppState>, slug: Vec<String>) -> Response {
    let rendered = tokio::task::spawn_blocking(move || state.render(&slug)).await;

    match rendered {
        Ok(Ok(RenderedPage::Found(html))) => Html(html).into_response(),
        Ok(Ok(RenderedPage::NotFound(html))) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Ok(Err(e)) => {
            tracing::warn!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::warn!("Render task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn docs_root_handler(State(state): State<Arc<AppState>>) -> Response {
    render_slug(state, Vec::new()).await
}

async fn doc_handler(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    let slug = slug
        .trim_end_matches('/')
        .split('/')
        .map(str::to_string)
        .collect();

    render_slug(state, slug).await
}

async fn not_found_handler(State(state): State<Arc<AppState>>) -> Response {
    let rendered = tokio::task::spawn_blocking(move || {
        let nav = state.source.build_navigation();
        state
            .renderer
            .render_not_found(&nav, "", state.theme.snapshot())
    })
    .await;

    match rendered {
        Ok(Ok(html)) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Bundled assets plus configured stylesheets, matched by file name.
async fn asset_handler(State(state): State<Arc<AppState>>, Path(file): Path<String>) -> Response {
    match file.as_str() {
        "main.css" => css_response(AssetPipeline::generate_css()),
        "main.js" => (
            [(header::CONTENT_TYPE, "application/javascript")],
            AssetPipeline::generate_js(),
        )
            .into_response(),
        _ => {
            let Some(path) = state
                .styles
                .iter()
                .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(file.as_str()))
            else {
                return StatusCode::NOT_FOUND.into_response();
            };

            match tokio::fs::read_to_string(path).await {
                Ok(css) => css_response(css),
                Err(e) => {
                    tracing::warn!("Failed to read stylesheet {}: {}", path.display(), e);
                    StatusCode::NOT_FOUND.into_response()
                }
            }
        }
    }
}

async fn theme_css_handler(Path(file): Path<String>) -> Response {
    let variant = file
        .strip_suffix(".css")
        .and_then(|name| name.parse::<ThemeVariant>().ok());

    match variant {
        Some(variant) => css_response(AssetPipeline::theme_css(variant)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Switch the theme variant for every connected page.
async fn set_theme_handler(
    State(state): State<Arc<AppState>>,
    Path(variant): Path<String>,
) -> Response {
    match variant.parse::<ThemeVariant>() {
        Ok(variant) => {
            state.theme.set_variant(variant);
            tracing::info!("Theme variant set to {}", variant);
            Json::<ThemeState>(state.theme.snapshot()).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

fn css_response(css: String) -> Response {
    ([(header::CONTENT_TYPE, "text/css")], css).into_response()
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut rx = state.hmr.subscribe();

    if send_message(&mut socket, &HmrMessage::Connected).await.is_err() {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if send_message(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Live reload client skipped {} messages", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &HmrMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::warn!("Failed to encode live reload message: {}", e);
    })?;

    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

/// Handler for the live reload client script.
async fn hmr_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        hmr_client_script("/__hmr"),
    )
}

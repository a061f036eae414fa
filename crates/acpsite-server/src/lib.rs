//! Development server with live reload for the ACP documentation site.
//!
//! Renders documents on every request so pages always match the content
//! tree, watches the content directory, and pushes reload and theme change
//! messages to open pages over a WebSocket.

pub mod server;
pub mod static_files;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use static_files::serve_static;
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{HmrHub, HmrMessage};

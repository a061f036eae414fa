//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use acpsite_static::{ColorMode, ThemeState, ThemeVariant};

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HmrMessage {
    /// Full page reload
    Reload,

    /// The active theme changed
    Theme {
        variant: ThemeVariant,
        color_mode: ColorMode,
    },

    /// Connection established
    Connected,
}

impl From<ThemeState> for HmrMessage {
    fn from(state: ThemeState) -> Self {
        HmrMessage::Theme {
            variant: state.variant,
            color_mode: state.color_mode,
        }
    }
}

/// Hub for broadcasting messages to all connected clients.
#[derive(Debug, Clone)]
pub struct HmrHub {
    sender: broadcast::Sender<HmrMessage>,
}

impl HmrHub {
    /// Create a new hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: HmrMessage) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(msg);
    }

    /// Subscribe to messages.
    pub fn subscribe(&self) -> broadcast::Receiver<HmrMessage> {
        self.sender.subscribe()
    }
}

impl Default for HmrHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the client-side live reload script.
///
/// The socket URL is derived from the page location, so the script works on
/// any host and port the server binds to.
pub fn hmr_client_script(ws_path: &str) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
  const ws = new WebSocket(scheme + location.host + '{}');
  let reconnectAttempts = 0;
  const maxReconnectAttempts = 10;

  ws.onopen = function() {{
    console.log('[HMR] Connected');
    reconnectAttempts = 0;
  }};

  ws.onmessage = function(event) {{
    const msg = JSON.parse(event.data);
    console.log('[HMR]', msg.type);

    switch (msg.type) {{
      case 'reload':
        location.reload();
        break;

      case 'theme':
        if (window.acpTheme) {{
          window.acpTheme.applyVariant(msg.variant);
          window.acpTheme.applyMode(msg.color_mode);
        }} else {{
          location.reload();
        }}
        break;

      case 'connected':
        console.log('[HMR] Server acknowledged connection');
        break;
    }}
  }};

  ws.onclose = function() {{
    console.log('[HMR] Disconnected');
    if (reconnectAttempts < maxReconnectAttempts) {{
      reconnectAttempts++;
      setTimeout(function() {{
        console.log('[HMR] Reconnecting...');
        location.reload();
      }}, 1000 * reconnectAttempts);
    }}
  }};

  ws.onerror = function(e) {{
    console.error('[HMR] WebSocket error:', e);
  }};
}})();
"#,
        ws_path
    )
}

//! Theme variants, color modes and the shared theme store.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Errors from parsing theme names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    #[error("Unknown theme variant: {0} (expected one of: acp, synthwave)")]
    UnknownVariant(String),

    #[error("Unknown color mode: {0} (expected one of: light, dark, system)")]
    UnknownColorMode(String),
}

/// A named color palette. Each variant ships as `/themes/<name>.css`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Acp,
    Synthwave,
}

impl ThemeVariant {
    pub const ALL: [ThemeVariant; 2] = [ThemeVariant::Acp, ThemeVariant::Synthwave];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeVariant::Acp => "acp",
            ThemeVariant::Synthwave => "synthwave",
        }
    }

    /// Site path of the variant's stylesheet.
    pub fn stylesheet_href(self) -> String {
        format!("/themes/{}.css", self.as_str())
    }
}

impl fmt::Display for ThemeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeVariant {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acp" => Ok(ThemeVariant::Acp),
            "synthwave" => Ok(ThemeVariant::Synthwave),
            other => Err(ThemeError::UnknownVariant(other.to_string())),
        }
    }
}

/// Light/dark preference. `System` follows the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ColorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
            ColorMode::System => "system",
        }
    }

    /// Mode the toggle button switches to: system, dark, light, then around.
    pub fn next(self) -> Self {
        match self {
            ColorMode::System => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
            ColorMode::Light => ColorMode::System,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ColorMode::Light),
            "dark" => Ok(ColorMode::Dark),
            "system" => Ok(ColorMode::System),
            other => Err(ThemeError::UnknownColorMode(other.to_string())),
        }
    }
}

/// Theme settings applied to rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemeState {
    #[serde(default)]
    pub variant: ThemeVariant,

    #[serde(default)]
    pub color_mode: ColorMode,
}

/// Handle returned by [`ThemeStore::subscribe`].
pub type SubscriptionId = u64;

type Listener = Arc<dyn Fn(&ThemeState) + Send + Sync>;

struct StoreInner {
    state: ThemeState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: SubscriptionId,
}

/// Current theme plus the callbacks interested in changes.
///
/// Listeners run after the lock is released, so a listener may read the
/// store or unsubscribe itself.
pub struct ThemeStore {
    inner: Mutex<StoreInner>,
}

impl ThemeStore {
    pub fn new(state: ThemeState) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                state,
                listeners: Vec::new(),
                next_id: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ThemeState {
        self.lock().state
    }

    /// Register a callback invoked with the new state after every change.
    pub fn subscribe(
        &self,
        listener: impl Fn(&ThemeState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Remove a callback. Returns false when the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    /// Replace the state and notify every subscriber.
    pub fn set(&self, state: ThemeState) {
        let listeners: Vec<Listener> = {
            let mut inner = self.lock();
            inner.state = state;
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        for listener in listeners {
            listener(&state);
        }
    }

    pub fn set_variant(&self, variant: ThemeVariant) {
        let state = ThemeState {
            variant,
            ..self.snapshot()
        };
        self.set(state);
    }

    pub fn set_color_mode(&self, color_mode: ColorMode) {
        let state = ThemeState {
            color_mode,
            ..self.snapshot()
        };
        self.set(state);
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(ThemeState::default())
    }
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ThemeStore")
            .field("state", &inner.state)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

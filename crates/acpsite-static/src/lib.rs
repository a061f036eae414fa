//! Static site generator for the ACP documentation.
//!
//! Renders every document in the content source to HTML with sidebar
//! navigation, breadcrumbs, a table of contents and previous/next links, and
//! owns the theme model shared with the dev server.

pub mod assets;
pub mod builder;
pub mod page;
pub mod render;
pub mod templates;
pub mod theme;

pub use assets::AssetPipeline;
pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use page::{PageRenderer, SiteOptions};
pub use render::render_markdown;
pub use theme::{ColorMode, SubscriptionId, ThemeError, ThemeState, ThemeStore, ThemeVariant};

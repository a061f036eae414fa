//! Content source for the documentation site.
//!
//! Reads a directory of `.md`/`.mdx` documents and exposes the structure the
//! page layer renders: documents by slug, the sidebar navigation tree,
//! previous/next pagination and breadcrumb trails. Every call rescans the
//! directory, so results always match what is on disk.

pub mod navigation;
pub mod pagination;
pub mod source;

pub use navigation::{build_navigation, NavItem, NavSection, SectionMeta, META_FILE, OVERVIEW_TITLE};
pub use pagination::{breadcrumbs, paginate, Breadcrumb, Pagination};
pub use source::{doc_href, ContentError, ContentSource, Document};

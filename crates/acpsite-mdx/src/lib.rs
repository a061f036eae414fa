//! Markdown to MDX content pipeline.
//!
//! This crate holds the pure text side of the documentation site: metadata
//! header parsing, heading-derived tables of contents, metadata inference from
//! raw Markdown, and the transform that makes Markdown safe for an MDX renderer.
//! Nothing here touches the filesystem.

pub mod codeblock;
pub mod frontmatter;
pub mod infer;
pub mod toc;
pub mod transform;

/// Path prefix every document href starts with.
pub const DOCS_PREFIX: &str = "/docs";

pub use codeblock::{split_fenced, Fence, FenceTracker, Segment, SegmentKind};
pub use frontmatter::{
    extract_frontmatter, extract_frontmatter_lenient, render_frontmatter, split_frontmatter,
    Frontmatter, FrontmatterError,
};
pub use infer::{format_title, infer_metadata, DocMetadata, DEFAULT_ORDER};
pub use toc::{extract_toc, flatten_toc, HeadingEntry, Slugger};
pub use transform::{escape_jsx, transform_document, ChapterLink, LinkTable, MDX_COMPONENTS};

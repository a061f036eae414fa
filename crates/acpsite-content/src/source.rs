//! Document lookup over a content directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use acpsite_mdx::{extract_frontmatter_lenient, extract_toc, infer_metadata, HeadingEntry, DOCS_PREFIX};

use crate::navigation::{build_navigation, NavSection};
use crate::pagination::{paginate, Pagination};

/// Build the href for a slug. The only addressing scheme the site uses.
pub fn doc_href(slug: &[String]) -> String {
    format!("{}/{}", DOCS_PREFIX, slug.join("/"))
}

/// Check whether a file or directory name is hidden from the site.
pub(crate) fn is_excluded(name: &str) -> bool {
    name.starts_with('_')
}

/// File stem of a document file, or `None` for anything else.
pub(crate) fn doc_stem(name: &str) -> Option<&str> {
    name.strip_suffix(".mdx")
        .or_else(|| name.strip_suffix(".md"))
        .filter(|stem| !stem.is_empty())
}

/// Immediate children of a directory, sorted by file name.
pub(crate) fn list_dir(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
}

/// One document read from the content source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Path segments identifying the document
    pub slug: Vec<String>,

    pub title: String,

    pub description: Option<String>,

    /// Navigation order, defaulted when the document declares none
    pub order: i32,

    /// Document text without its metadata header
    pub raw_content: String,

    /// Table of contents built from the document's headings
    pub toc: Vec<HeadingEntry>,

    /// File the document was read from
    #[serde(skip)]
    pub source_path: PathBuf,
}

impl Document {
    pub fn href(&self) -> String {
        doc_href(&self.slug)
    }
}

/// Errors from strict document loading.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// A directory of documentation content.
#[derive(Debug, Clone)]
pub struct ContentSource {
    root: PathBuf,
}

impl ContentSource {
    /// Create a content source rooted at `root`. The directory may not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the file backing a slug.
    ///
    /// `<slug>.mdx` and `<slug>.md` win over `<slug>/index.mdx` and
    /// `<slug>/index.md`. Segments that could escape the content root never
    /// resolve, and neither do hidden `_` segments.
    pub fn resolve_doc_path(&self, slug: &[String]) -> Option<PathBuf> {
        if slug.iter().any(|s| {
            s.is_empty() || s == "." || s == ".." || s.contains(['/', '\\']) || is_excluded(s)
        }) {
            return None;
        }

        let base = slug.iter().fold(self.root.clone(), |path, s| path.join(s));
        let mut candidates = Vec::with_capacity(4);

        if !slug.is_empty() {
            for ext in ["mdx", "md"] {
                let mut file = base.clone().into_os_string();
                file.push(".");
                file.push(ext);
                candidates.push(PathBuf::from(file));
            }
        }
        candidates.push(base.join("index.mdx"));
        candidates.push(base.join("index.md"));

        candidates.into_iter().find(|path| path.is_file())
    }

    /// Look up a document. `None` means not found.
    pub fn doc_by_slug(&self, slug: &[String]) -> Option<Document> {
        let path = self.resolve_doc_path(slug)?;

        match self.load_document(slug, &path) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Skipping document {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Look up a document, failing loudly when it is missing or unreadable.
    pub fn require_doc(&self, slug: &[String]) -> Result<Document, ContentError> {
        let path = self
            .resolve_doc_path(slug)
            .ok_or_else(|| ContentError::NotFound(doc_href(slug)))?;

        self.load_document(slug, &path)
    }

    /// Read and parse the document at `path` under the given slug.
    pub fn load_document(&self, slug: &[String], path: &Path) -> Result<Document, ContentError> {
        let source = fs::read_to_string(path).map_err(|e| ContentError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let name = match doc_stem(file_name) {
            Some("index") => slug.last().map(String::as_str).unwrap_or("index"),
            _ => file_name,
        };

        let metadata = infer_metadata(&source, name);
        let (_, body) = extract_frontmatter_lenient(&source);

        Ok(Document {
            slug: slug.to_vec(),
            order: metadata.order_or_default(),
            title: metadata.title,
            description: metadata.description,
            toc: extract_toc(body),
            raw_content: body.to_string(),
            source_path: path.to_path_buf(),
        })
    }

    /// Every document slug, in sorted directory order.
    ///
    /// Index files map to their directory's slug; the root index is the empty
    /// slug. A missing root yields no slugs.
    pub fn all_doc_slugs(&self) -> Vec<Vec<String>> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let mut seen = HashSet::new();

        WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || e.file_name().to_str().is_some_and(|n| !is_excluded(n))
            })
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let stem = doc_stem(e.file_name().to_str()?)?;
                let relative = e.path().strip_prefix(&self.root).ok()?;

                let mut slug: Vec<String> = relative
                    .parent()
                    .map(|p| {
                        p.components()
                            .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                if stem != "index" {
                    slug.push(stem.to_string());
                }
                Some(slug)
            })
            .filter(|slug| seen.insert(slug.clone()))
            .collect()
    }

    /// Navigation tree for the current state of the content directory.
    pub fn build_navigation(&self) -> Vec<NavSection> {
        build_navigation(&self.root)
    }

    /// Previous and next documents around `slug`.
    pub fn doc_pagination(&self, slug: &[String]) -> Pagination {
        paginate(&self.build_navigation(), &doc_href(slug))
    }
}

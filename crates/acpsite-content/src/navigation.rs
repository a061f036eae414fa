//! Navigation tree built from the content directory layout.
//!
//! Documents directly under the root form the "Overview" section. Every
//! top-level directory becomes a section; documents one directory deeper are
//! flattened into their top-level section. Anything whose name starts with `_`
//! is hidden, and index documents are reachable by URL but never listed.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use acpsite_mdx::{format_title, infer_metadata, DEFAULT_ORDER};

use crate::source::{doc_href, doc_stem, is_excluded, list_dir};

/// Per-directory section metadata file.
pub const META_FILE: &str = "_meta.json";

/// Title of the section holding root-level documents.
pub const OVERVIEW_TITLE: &str = "Overview";

/// A navigation link to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: String,
    pub slug: Vec<String>,
    pub href: String,
    pub order: i32,
}

/// A group of navigation links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSection {
    pub title: String,
    /// Directory name, empty for the overview section
    pub slug: String,
    pub order: i32,
    pub items: Vec<NavItem>,
}

impl NavSection {
    pub fn is_overview(&self) -> bool {
        self.slug.is_empty()
    }
}

/// Contents of a `_meta.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SectionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl SectionMeta {
    /// Read the metadata file in `dir`. Missing or malformed files read as `None`.
    pub fn load(dir: &Path) -> Option<Self> {
        let path = dir.join(META_FILE);
        let content = fs::read_to_string(&path).ok()?;

        match serde_json::from_str(&content) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!("Ignoring malformed {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Build the navigation tree for a content root.
///
/// A missing root yields an empty tree. Sections with no listable documents
/// are dropped.
pub fn build_navigation(root: &Path) -> Vec<NavSection> {
    if !root.is_dir() {
        tracing::debug!("Content directory {} does not exist", root.display());
        return Vec::new();
    }

    let mut overview = Vec::new();
    let mut sections = Vec::new();

    for entry in list_dir(root) {
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if is_excluded(name) {
            continue;
        }

        if entry.file_type().is_dir() {
            if let Some(section) = build_section(entry.path(), name) {
                sections.push(section);
            }
        } else if let Some(item) = nav_item(entry.path(), &[]) {
            overview.push(item);
        }
    }

    sections.sort_by_key(|section| section.order);

    if !overview.is_empty() {
        overview.sort_by_key(|item| item.order);
        sections.insert(
            0,
            NavSection {
                title: OVERVIEW_TITLE.to_string(),
                slug: String::new(),
                order: 0,
                items: overview,
            },
        );
    }

    sections
}

fn build_section(dir: &Path, dir_name: &str) -> Option<NavSection> {
    let meta = SectionMeta::load(dir).unwrap_or_default();
    let mut items = Vec::new();

    for entry in list_dir(dir) {
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if is_excluded(name) {
            continue;
        }

        if entry.file_type().is_dir() {
            let parent = [dir_name.to_string(), name.to_string()];
            for nested in list_dir(entry.path()) {
                let nested_name = nested.file_name().to_str().unwrap_or("_");
                if nested.file_type().is_file() && !is_excluded(nested_name) {
                    items.extend(nav_item(nested.path(), &parent));
                }
            }
        } else {
            items.extend(nav_item(entry.path(), &[dir_name.to_string()]));
        }
    }

    if items.is_empty() {
        tracing::debug!("Skipping empty section {}", dir.display());
        return None;
    }

    items.sort_by_key(|item| item.order);

    Some(NavSection {
        title: meta
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format_title(dir_name)),
        slug: dir_name.to_string(),
        order: meta.order.unwrap_or(DEFAULT_ORDER),
        items,
    })
}

fn nav_item(path: &Path, parent: &[String]) -> Option<NavItem> {
    let file_name = path.file_name()?.to_str()?;
    let stem = doc_stem(file_name)?;
    if stem == "index" {
        return None;
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let metadata = infer_metadata(&source, file_name);
    let mut slug = parent.to_vec();
    slug.push(stem.to_string());

    Some(NavItem {
        title: metadata.title.clone(),
        href: doc_href(&slug),
        order: metadata.order_or_default(),
        slug,
    })
}

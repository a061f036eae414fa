//! Document metadata inference.
//!
//! Source Markdown pulled from the protocol repository rarely carries a
//! metadata header, so title, description and order are recovered from the
//! text and the file name. Inference never fails: every field either has a
//! value or is absent.

use std::sync::LazyLock;

use regex::Regex;

use crate::frontmatter::{extract_frontmatter_lenient, Frontmatter};

/// Order assigned to documents and sections that declare none.
pub const DEFAULT_ORDER: i32 = 999;

static H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("valid h1 regex"));
static DOC_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*Document Type\*\*:\s*(.+?)(?:\n|$)").expect("valid document type regex")
});
static AUDIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*Audience\*\*:\s*(.+?)(?:\n|$)").expect("valid audience regex")
});
static FIRST_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#.+\n+([^#\n][^\n]+)").expect("valid paragraph regex"));
static ORDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-").expect("valid order prefix regex"));
static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-").expect("valid numeric prefix regex"));

/// Metadata resolved for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMetadata {
    pub title: String,
    pub description: Option<String>,
    /// Explicit or filename-derived order; callers default to [`DEFAULT_ORDER`]
    pub order: Option<i32>,
}

impl DocMetadata {
    /// Order with the low-priority default applied.
    pub fn order_or_default(&self) -> i32 {
        self.order.unwrap_or(DEFAULT_ORDER)
    }

    /// Convert into a metadata header.
    pub fn to_frontmatter(&self) -> Frontmatter {
        Frontmatter {
            title: self.title.clone(),
            description: self.description.clone(),
            order: self.order,
        }
    }
}

/// Infer metadata from raw file content and its file name.
///
/// Explicit header fields win; anything missing falls back to what the body
/// and the file name reveal.
pub fn infer_metadata(content: &str, file_name: &str) -> DocMetadata {
    let (frontmatter, body) = extract_frontmatter_lenient(content);
    let frontmatter = frontmatter.unwrap_or_default();

    let title = frontmatter
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| extract_title(body, file_name));

    let description = frontmatter
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .or_else(|| extract_description(body));

    let order = frontmatter.order.or_else(|| extract_order(file_name));

    DocMetadata {
        title,
        description,
        order,
    }
}

/// Title from the first level-1 heading, falling back to the file name.
pub fn extract_title(content: &str, file_name: &str) -> String {
    H1.captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| format_title(file_name))
}

/// Description from labeled fields or the first short paragraph.
pub fn extract_description(content: &str) -> Option<String> {
    if let Some(doc_type) = DOC_TYPE.captures(content) {
        let doc_type = doc_type[1].trim();
        return Some(match AUDIENCE.captures(content) {
            Some(audience) => format!("{} for {}", doc_type, audience[1].trim().to_lowercase()),
            None => doc_type.to_string(),
        });
    }

    let caps = FIRST_PARAGRAPH.captures(content)?;
    let paragraph = caps[1].trim();
    let len = paragraph.chars().count();

    (len > 20 && len < 200 && !paragraph.starts_with("**")).then(|| paragraph.to_string())
}

/// Order from a leading `NN-` file name prefix.
pub fn extract_order(file_name: &str) -> Option<i32> {
    ORDER_PREFIX
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
}

/// Turn a file or directory name into a display title.
///
/// `03-cache-format.md` becomes `Cache Format`.
pub fn format_title(name: &str) -> String {
    let name = name
        .strip_suffix(".mdx")
        .or_else(|| name.strip_suffix(".md"))
        .unwrap_or(name);
    let name = NUMERIC_PREFIX.replace(name, "");

    name.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

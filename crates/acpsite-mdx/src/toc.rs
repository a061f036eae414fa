//! Table of contents extraction.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::codeblock::{FenceTracker, LineKind};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,3})\s+(.+)$").expect("valid heading regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.+?)`").expect("valid inline code regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]\(.+?\)").expect("valid link regex"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(lt|gt|amp|quot);").expect("valid entity regex"));

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Anchor ID, unique within the document
    pub id: String,
    /// Heading text with inline markup removed
    pub text: String,
    /// Heading level (2 or 3)
    pub level: u8,
    /// Level-3 entries nested under a level-2 entry
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HeadingEntry>,
}

/// Extract a two-level table of contents from Markdown.
///
/// Only `##` and `###` headings outside fenced code participate. A `###`
/// heading is attached to the latest `##` heading and dropped when there is
/// none yet.
pub fn extract_toc(content: &str) -> Vec<HeadingEntry> {
    let mut slugger = Slugger::new();
    let mut entries: Vec<HeadingEntry> = Vec::new();
    let mut fences = FenceTracker::new();

    for line in content.lines() {
        if fences.advance(line) != LineKind::Prose {
            continue;
        }

        let Some(caps) = HEADING.captures(line) else {
            continue;
        };

        let level = caps[1].len() as u8;
        let text = strip_inline_markup(&caps[2]);
        let id = slugger.slug(&text);
        let entry = HeadingEntry {
            id,
            text,
            level,
            children: Vec::new(),
        };

        if level == 2 {
            entries.push(entry);
        } else if let Some(parent) = entries.last_mut() {
            parent.children.push(entry);
        }
    }

    entries
}

/// Flatten entries into document order, each parent followed by its children.
pub fn flatten_toc(entries: &[HeadingEntry]) -> Vec<&HeadingEntry> {
    entries
        .iter()
        .flat_map(|entry| std::iter::once(entry).chain(entry.children.iter()))
        .collect()
}

/// Remove bold, italic, inline code and link markup, keeping the visible text.
///
/// Entities written by the JSX escape are decoded, so the text matches what a
/// Markdown renderer displays for the heading.
pub fn strip_inline_markup(text: &str) -> String {
    let text = decode_entities(text);
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    text.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| match &caps[1] {
            "lt" => "<",
            "gt" => ">",
            "amp" => "&",
            _ => "\"",
        })
        .into_owned()
}

/// GitHub-compatible heading slug generator.
///
/// Tracks every slug handed out so repeated headings get `-1`, `-2`, ...
/// suffixes. Use one slugger per document.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    /// Create a slugger with no slugs handed out yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next unique slug for `text`.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();

        while self.occurrences.contains_key(&slug) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            slug = format!("{}-{}", base, count);
        }

        self.occurrences.insert(slug.clone(), 0);
        slug
    }
}

/// Convert heading text to a URL fragment.
///
/// Lowercases, drops punctuation, and maps every whitespace character to `-`
/// without collapsing runs.
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

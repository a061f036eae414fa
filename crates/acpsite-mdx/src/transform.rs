//! Markdown to MDX content transform.
//!
//! Source Markdown is written for plain renderers. An MDX renderer parses `<`
//! as JSX, rejects HTML comments and chokes on untagged fences, so documents
//! pass through here before they land in the content tree.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::codeblock::{split_fenced, Fence, FenceTracker, LineKind, SegmentKind};
use crate::frontmatter::{render_frontmatter, split_frontmatter};
use crate::infer::DocMetadata;
use crate::DOCS_PREFIX;

/// Components the transform emits itself. These are never escaped.
pub const MDX_COMPONENTS: &[&str] = &["Callout"];

static TITLE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+(.+)$").expect("valid title heading regex"));
static CHAPTER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\((?:\.\./)?(?:chapters/)?(\d+-[\w-]+)\.md\)")
        .expect("valid chapter link regex")
});
static EXAMPLE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\((?:\.\./)?examples/([\w-]+)\.md\)")
        .expect("valid example link regex")
});
static INLINE_TOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)## Table of Contents\n\n.*?\n---\n").expect("valid inline toc regex")
});
static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("valid comment regex"));
static CALLOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"> \*\*(Note|Warning|Important):\*\*[ \t]*(.+)").expect("valid callout regex")
});
static JSX_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([A-Z][a-zA-Z_]*)[>\s|]").expect("valid jsx regex"));
static COMPARISON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<[0-9]").expect("valid comparison regex"));

/// One source chapter and where it lands in the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLink {
    /// Source path, e.g. `chapters/05-annotations.md`
    pub source: String,
    /// Output path under the content root, e.g. `core-concepts/annotations.mdx`
    pub output: String,
}

/// Lookup table from source chapters to site paths.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    chapters: Vec<ChapterLink>,
}

impl LinkTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chapter mapping.
    pub fn insert(&mut self, source: impl Into<String>, output: impl Into<String>) {
        self.chapters.push(ChapterLink {
            source: source.into(),
            output: output.into(),
        });
    }

    /// Builder-style [`LinkTable::insert`].
    pub fn with_chapter(mut self, source: impl Into<String>, output: impl Into<String>) -> Self {
        self.insert(source, output);
        self
    }

    /// Resolve a chapter file stem such as `05-annotations` to its site href.
    pub fn resolve(&self, chapter: &str) -> Option<String> {
        self.chapters
            .iter()
            .find(|link| {
                Path::new(&link.source)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| stem == chapter)
            })
            .map(|link| {
                let output = link.output.trim_start_matches('/');
                let output = output
                    .strip_suffix(".mdx")
                    .or_else(|| output.strip_suffix(".md"))
                    .unwrap_or(output);
                format!("{}/{}", DOCS_PREFIX, output)
            })
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Transform raw Markdown into MDX-safe content with a metadata header.
///
/// A document that already opens with a header keeps it byte-for-byte.
/// Otherwise a leading `#` heading equal to the title is dropped and a header
/// is synthesized from `metadata`. Fenced code is only touched to give
/// untagged fences a `text` language.
pub fn transform_document(content: &str, metadata: &DocMetadata, links: &LinkTable) -> String {
    match split_frontmatter(content) {
        Ok(Some((header, body))) => format!("{}{}", header, transform_body(body, links)),
        _ => {
            let body = strip_title_heading(content, &metadata.title);
            let header = render_frontmatter(&metadata.to_frontmatter());
            format!("{}\n\n{}\n", header, transform_body(body, links).trim())
        }
    }
}

/// Drop a leading level-1 heading if it repeats the title.
fn strip_title_heading<'a>(content: &'a str, title: &str) -> &'a str {
    let trimmed = content.trim_start();
    let (first_line, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));

    match TITLE_HEADING.captures(first_line.trim_end()) {
        Some(caps) if caps[1].trim().to_lowercase() == title.trim().to_lowercase() => {
            rest.trim_start_matches(['\n', '\r'])
        }
        _ => content,
    }
}

fn transform_body(body: &str, links: &LinkTable) -> String {
    split_fenced(body)
        .into_iter()
        .map(|segment| match segment.kind {
            SegmentKind::Code => default_fence_language(segment.text),
            SegmentKind::Prose => transform_prose(segment.text, links),
        })
        .collect()
}

fn transform_prose(text: &str, links: &LinkTable) -> String {
    let text = CHAPTER_LINK.replace_all(text, |caps: &Captures| match links.resolve(&caps[2]) {
        Some(href) => format!("[{}]({})", &caps[1], href),
        None => caps[0].to_string(),
    });

    let text = EXAMPLE_LINK.replace_all(&text, |caps: &Captures| {
        format!("[{}]({}/examples/{})", &caps[1], DOCS_PREFIX, &caps[2])
    });

    let text = INLINE_TOC.replace_all(&text, "");
    let text = HTML_COMMENT.replace_all(&text, "{/* ${1} */}");

    let text = CALLOUT.replace_all(&text, |caps: &Captures| {
        format!(
            "<Callout type=\"{}\">\n{}\n</Callout>",
            caps[1].to_lowercase(),
            caps[2].trim_end()
        )
    });

    escape_jsx(&text)
}

/// Give an untagged opening fence the `text` language.
fn default_fence_language(block: &str) -> String {
    let (first, rest) = match block.find('\n') {
        Some(pos) => block.split_at(pos),
        None => (block, ""),
    };

    match Fence::parse(first) {
        Some(fence) if fence.info.is_empty() => {
            let first = first.trim_end_matches('\r');
            let ending = &block[first.len()..block.len() - rest.len()];
            format!("{}text{}{}", first.trim_end(), ending, rest)
        }
        _ => block.to_string(),
    }
}

/// Escape angle brackets that an MDX renderer would read as JSX.
///
/// Outside fenced code and inline code spans, `<` followed by an
/// uppercase-led word or a digit becomes `&lt;`, and a `>` right after an
/// uppercase placeholder becomes `&gt;`. This is a heuristic: a genuine
/// comparison against a capitalized identifier is escaped too.
pub fn escape_jsx(text: &str) -> String {
    let mut fences = FenceTracker::new();

    text.split_inclusive('\n')
        .map(|line| match fences.advance(line) {
            LineKind::Prose => escape_line(line),
            _ => line.to_string(),
        })
        .collect()
}

fn escape_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_inline_code = false;

    for (i, c) in line.char_indices() {
        if c == '`' {
            in_inline_code = !in_inline_code;
            out.push(c);
            continue;
        }

        if !in_inline_code && c == '<' {
            let rest = &line[i..];
            let jsx_like = JSX_LIKE
                .captures(rest)
                .is_some_and(|caps| !MDX_COMPONENTS.contains(&&caps[1]));
            if jsx_like || COMPARISON.is_match(rest) {
                out.push_str("&lt;");
                continue;
            }
        }

        if !in_inline_code && c == '>' && ends_with_placeholder(&out) {
            out.push_str("&gt;");
            continue;
        }

        out.push(c);
    }

    out
}

/// Check whether the last 20 characters end in an uppercase placeholder word.
fn ends_with_placeholder(out: &str) -> bool {
    out.chars()
        .rev()
        .take(20)
        .take_while(|c| c.is_ascii_uppercase() || *c == '_')
        .any(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta(title: &str) -> DocMetadata {
        DocMetadata {
            title: title.to_string(),
            description: None,
            order: None,
        }
    }

    fn links() -> LinkTable {
        LinkTable::new()
            .with_chapter("chapters/05-annotations.md", "core-concepts/annotations.mdx")
            .with_chapter("chapters/03-cache-format.md", "core-concepts/cache-format.mdx")
    }

    #[test]
    fn synthesizes_header_and_strips_title() {
        let content = "# Introduction\n\nWelcome to the protocol.\n";
        let metadata = DocMetadata {
            title: "Introduction".to_string(),
            description: Some("An overview".to_string()),
            order: Some(1),
        };

        let out = transform_document(content, &metadata, &LinkTable::new());

        assert_eq!(
            out,
            "---\ntitle: Introduction\ndescription: An overview\norder: 1\n---\n\nWelcome to the protocol.\n"
        );
    }

    #[test]
    fn keeps_heading_that_differs_from_title() {
        let out = transform_document("# Something Else\n\nBody", &meta("Intro"), &LinkTable::new());

        assert!(out.contains("# Something Else"));
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let out = transform_document("# CACHE format\n\nBody", &meta("Cache Format"), &LinkTable::new());

        assert!(!out.contains("# CACHE format"));
        assert!(out.ends_with("Body\n"));
    }

    #[test]
    fn existing_header_is_untouched() {
        let content = "---\ntitle: \"Kept\"   \norder: 0\n---\n\n# Kept\n\nText with <Generic> type.\n";

        let out = transform_document(content, &meta("Ignored"), &LinkTable::new());

        assert!(out.starts_with("---\ntitle: \"Kept\"   \norder: 0\n---\n\n# Kept\n"));
        assert!(out.contains("Text with &lt;Generic> type."));
    }

    #[test]
    fn transform_is_idempotent_on_processed_output() {
        let content = "# Guide\n\n<!-- hidden -->\n\n```\nplain\n```\n\n> **Note:** Read <THIS>\n";

        let once = transform_document(content, &meta("Guide"), &links());
        let twice = transform_document(&once, &meta("Guide"), &links());

        assert_eq!(once, twice);
    }

    #[test]
    fn rewrites_chapter_links() {
        let content = "See [annotations](../chapters/05-annotations.md) and [cache](03-cache-format.md).";

        let out = transform_prose(content, &links());

        assert_eq!(
            out,
            "See [annotations](/docs/core-concepts/annotations) and [cache](/docs/core-concepts/cache-format)."
        );
    }

    #[test]
    fn leaves_unresolved_chapter_links() {
        let content = "See [discovery](chapters/09-discovery.md).";

        assert_eq!(transform_prose(content, &links()), content);
    }

    #[test]
    fn rewrites_example_links() {
        let out = transform_prose("[minimal](../examples/minimal.md)", &LinkTable::new());

        assert_eq!(out, "[minimal](/docs/examples/minimal)");
    }

    #[test]
    fn removes_inline_table_of_contents() {
        let content = "Intro\n\n## Table of Contents\n\n1. [One](#one)\n2. [Two](#two)\n\n---\n\n## One\n";

        let out = transform_prose(content, &LinkTable::new());

        assert_eq!(out, "Intro\n\n\n## One\n");
    }

    #[test]
    fn converts_html_comments() {
        let out = transform_prose("a <!-- note\nmore --> b", &LinkTable::new());

        assert_eq!(out, "a {/*  note\nmore  */} b");
    }

    #[test]
    fn defaults_untagged_fences_to_text() {
        let content = "Intro\n\n```\nplain\n```\n\n```rust\nfn main() {}\n```\n";

        let out = transform_body(content, &LinkTable::new());

        assert_eq!(
            out,
            "Intro\n\n```text\nplain\n```\n\n```rust\nfn main() {}\n```\n"
        );
    }

    #[test]
    fn converts_callouts() {
        let content = "> **Note:** Caches are optional.\n\n> **Warning:** Do not commit secrets.\n";

        let out = transform_prose(content, &LinkTable::new());

        assert_eq!(
            out,
            "<Callout type=\"note\">\nCaches are optional.\n</Callout>\n\n<Callout type=\"warning\">\nDo not commit secrets.\n</Callout>\n"
        );
    }

    #[test]
    fn escapes_placeholders_outside_code() {
        let content = "Use <SOME_TOKEN> here.\n\n```\n<SOME_TOKEN>\n```\n";

        let out = escape_jsx(content);

        assert_eq!(
            out,
            "Use &lt;SOME_TOKEN&gt; here.\n\n```\n<SOME_TOKEN>\n```\n"
        );
    }

    #[test]
    fn skips_inline_code_spans() {
        let out = escape_jsx("Type `Vec<String>` versus Vec<String>");

        assert_eq!(out, "Type `Vec<String>` versus Vec&lt;String>");
    }

    #[test]
    fn escapes_numeric_comparisons() {
        assert_eq!(escape_jsx("latency <100ms"), "latency &lt;100ms");
        assert_eq!(escape_jsx("a < b and x<y"), "a < b and x<y");
    }

    #[test]
    fn escapes_union_placeholders() {
        assert_eq!(escape_jsx("<Read|Write>"), "&lt;Read|Write>");
    }

    #[test]
    fn leaves_emitted_components_alone() {
        let callout = "<Callout type=\"note\">\nText\n</Callout>\n";

        assert_eq!(escape_jsx(callout), callout);
    }

    #[test]
    fn link_table_resolves_by_file_stem() {
        let table = links();

        assert_eq!(
            table.resolve("05-annotations"),
            Some("/docs/core-concepts/annotations".to_string())
        );
        assert_eq!(table.resolve("05-annot"), None);
        assert_eq!(table.len(), 2);
    }
}

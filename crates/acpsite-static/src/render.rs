//! Markdown to HTML rendering for transformed documents.

use std::sync::LazyLock;

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;

use acpsite_mdx::{split_fenced, SegmentKind, Slugger};

static MDX_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{/\*.*?\*/\}").expect("valid comment regex"));
static CALLOUT_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^<Callout type="([a-z]+)">[ \t]*$"#).expect("valid callout regex")
});
static CALLOUT_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^</Callout>[ \t]*$").expect("valid callout regex"));

/// Render a document body to HTML.
///
/// Level 2 and 3 headings get anchor ids produced the same way as the table
/// of contents, so TOC links land on the right heading.
pub fn render_markdown(content: &str) -> String {
    let prepared = prepare_mdx(content);

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut events: Vec<Event> = Parser::new_ext(&prepared, options).collect();
    assign_heading_ids(&mut events);

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    html_output
}

/// Rewrite MDX-only constructs into plain Markdown and HTML.
///
/// Comments are dropped and callouts become `div.callout` blocks. Fenced code
/// is left untouched.
pub fn prepare_mdx(content: &str) -> String {
    split_fenced(content)
        .into_iter()
        .map(|segment| match segment.kind {
            SegmentKind::Code => segment.text.to_string(),
            SegmentKind::Prose => {
                let text = MDX_COMMENT.replace_all(segment.text, "");
                let text = CALLOUT_OPEN.replace_all(&text, "<div class=\"callout callout-${1}\">\n");
                CALLOUT_CLOSE.replace_all(&text, "\n</div>").into_owned()
            }
        })
        .collect()
}

fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut slugger = Slugger::new();

    for i in 0..events.len() {
        let Event::Start(Tag::Heading { level, .. }) = &events[i] else {
            continue;
        };
        if !matches!(level, HeadingLevel::H2 | HeadingLevel::H3) {
            continue;
        }

        let anchor = slugger.slug(&heading_text(&events[i + 1..]));
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor));
        }
    }
}

fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();

    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }

    text.trim().to_string()
}

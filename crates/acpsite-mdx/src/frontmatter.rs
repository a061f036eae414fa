//! Metadata header extraction and rendering.

use serde::{Deserialize, Serialize};

/// Parsed metadata header from a document.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Frontmatter {
    /// Page title. Empty when the header omits it.
    #[serde(default)]
    pub title: String,

    /// Page description for SEO and the page lead paragraph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Order in navigation (lower = first)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl Frontmatter {
    /// Title, if the header actually carries a non-blank one.
    pub fn title(&self) -> Option<&str> {
        let title = self.title.trim();
        (!title.is_empty()).then_some(title)
    }
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}

/// Split a document into its raw header block and the content after it.
///
/// The header slice runs from the start of `source` through the closing `---`,
/// so it can be written back byte-for-byte. Returns `None` when the document
/// does not open with a header.
pub fn split_frontmatter(source: &str) -> Result<Option<(&str, &str)>, FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok(None);
    }

    let leading = source.len() - trimmed.len();
    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let header_end = leading + 3 + close_pos + 4;
    Ok(Some((&source[..header_end], &source[header_end..])))
}

/// Extract frontmatter from document content.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let Some((header, remaining)) = split_frontmatter(source)? else {
        return Ok((None, source));
    };

    let header = header.trim_start();
    let yaml_content = header[3..header.len() - 3].trim();

    let frontmatter: Frontmatter = if yaml_content.is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
    };

    Ok((Some(frontmatter), remaining.trim_start()))
}

/// Extract frontmatter, treating a malformed header as absent.
///
/// An unclosed header leaves the whole source as content. A closed header with
/// invalid YAML is still cut off the content, since it is not prose.
pub fn extract_frontmatter_lenient(source: &str) -> (Option<Frontmatter>, &str) {
    match extract_frontmatter(source) {
        Ok(parsed) => parsed,
        Err(FrontmatterError::InvalidYaml(_)) => match split_frontmatter(source) {
            Ok(Some((_, remaining))) => (None, remaining.trim_start()),
            _ => (None, source),
        },
        Err(FrontmatterError::Unclosed) => (None, source),
    }
}

/// Render a metadata header, including its `---` delimiters.
pub fn render_frontmatter(frontmatter: &Frontmatter) -> String {
    // Serializing a plain struct of strings and integers cannot fail.
    let yaml = serde_yaml::to_string(frontmatter).unwrap_or_default();
    format!("---\n{}---", yaml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Introduction
description: An overview of the protocol
order: 1
---

# Introduction
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title, "Introduction");
        assert_eq!(
            fm.description,
            Some("An overview of the protocol".to_string())
        );
        assert_eq!(fm.order, Some(1));
        assert!(content.starts_with("# Introduction"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn lenient_extraction_drops_bad_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n\nBody text";

        let (fm, content) = extract_frontmatter_lenient(source);

        assert!(fm.is_none());
        assert_eq!(content, "Body text");
    }

    #[test]
    fn lenient_extraction_keeps_unclosed_source() {
        let source = "---\ntitle: Test\n# No closing";

        let (fm, content) = extract_frontmatter_lenient(source);

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn missing_title_is_none() {
        let (fm, _) = extract_frontmatter("---\norder: 3\n---\nBody").unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title(), None);
        assert_eq!(fm.order, Some(3));
    }

    #[test]
    fn split_keeps_header_bytes() {
        let source = "---\ntitle: \"Quoted\"\norder: 2\n---\n\nBody";

        let (header, rest) = split_frontmatter(source).unwrap().unwrap();

        assert_eq!(header, "---\ntitle: \"Quoted\"\norder: 2\n---");
        assert_eq!(rest, "\n\nBody");
    }

    #[test]
    fn renders_header_that_parses_back() {
        let fm = Frontmatter {
            title: "Cache \"Format\"".to_string(),
            description: Some("Understanding: the cache".to_string()),
            order: Some(4),
        };

        let rendered = render_frontmatter(&fm);
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.ends_with("\n---"));

        let (parsed, _) = extract_frontmatter(&rendered).unwrap();
        assert_eq!(parsed.unwrap(), fm);
    }

    #[test]
    fn renders_without_optional_fields() {
        let fm = Frontmatter {
            title: "Terminology".to_string(),
            ..Default::default()
        };

        assert_eq!(render_frontmatter(&fm), "---\ntitle: Terminology\n---");
    }
}

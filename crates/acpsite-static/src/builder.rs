//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use acpsite_content::{doc_href, ContentError, ContentSource, Document, NavSection};
use acpsite_mdx::{flatten_toc, DOCS_PREFIX};

use crate::assets::AssetPipeline;
use crate::page::{PageRenderer, SiteOptions};
use crate::theme::{ThemeState, ThemeVariant};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Content source root
    pub content_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Absolute site URL used in the sitemap and robots.txt
    pub site_url: String,

    /// Site title
    pub title: String,

    /// Paths to CSS stylesheets to include
    pub styles: Vec<PathBuf>,

    /// Theme baked into the generated pages
    pub theme: ThemeState,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/docs"),
            output_dir: PathBuf::from("dist"),
            minify: true,
            site_url: "https://acp-protocol.dev".to_string(),
            title: "ACP Protocol".to_string(),
            styles: vec![],
            theme: ThemeState::default(),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read content: {0}")]
    ReadError(String),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

#[derive(Debug, Serialize)]
struct SearchEntry<'a> {
    title: &'a str,
    description: &'a str,
    url: String,
    headings: Vec<&'a str>,
    content: String,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    source: ContentSource,
    renderer: PageRenderer,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        let styles = config
            .styles
            .iter()
            .filter_map(|path| AssetPipeline::stylesheet_href(path))
            .collect();

        let renderer = PageRenderer::new(SiteOptions {
            title: config.title.clone(),
            styles,
            dev: false,
        });

        Self {
            source: ContentSource::new(&config.content_dir),
            config,
            renderer,
        }
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if !self.config.content_dir.is_dir() {
            return Err(BuildError::ReadError(format!(
                "Content directory not found: {}",
                self.config.content_dir.display()
            )));
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let docs = self.load_documents()?;
        let nav = self.source.build_navigation();
        tracing::debug!("Loaded {} documents in {} sections", docs.len(), nav.len());

        docs.par_iter()
            .map(|doc| self.build_page(doc, &nav))
            .collect::<Result<Vec<()>, BuildError>>()?;

        self.build_not_found(&nav)?;
        self.write_root_redirect()?;
        self.generate_assets()?;
        self.generate_search_index(&docs)?;
        self.generate_sitemap(&docs)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: docs.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Load every document. Any unreadable document fails the build.
    fn load_documents(&self) -> Result<Vec<Document>, BuildError> {
        self.source
            .all_doc_slugs()
            .iter()
            .map(|slug| self.source.require_doc(slug).map_err(BuildError::from))
            .collect()
    }

    /// Output path for a document: `<output>/docs/<slug>/index.html`.
    fn output_path(&self, slug: &[String]) -> PathBuf {
        let docs_root = self
            .config
            .output_dir
            .join(DOCS_PREFIX.trim_start_matches('/'));

        slug.iter()
            .fold(docs_root, |dir, segment| dir.join(segment))
            .join("index.html")
    }

    fn build_page(&self, doc: &Document, nav: &[NavSection]) -> Result<(), BuildError> {
        let html = self
            .renderer
            .render_doc(doc, nav, self.config.theme)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        write_file(&self.output_path(&doc.slug), html)
    }

    fn build_not_found(&self, nav: &[NavSection]) -> Result<(), BuildError> {
        let html = self
            .renderer
            .render_not_found(nav, "", self.config.theme)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        write_file(&self.config.output_dir.join("404.html"), html)
    }

    /// The site root forwards to the docs root.
    fn write_root_redirect(&self) -> Result<(), BuildError> {
        let html = format!(
            "<!DOCTYPE html>\n<meta charset=\"utf-8\">\n<meta http-equiv=\"refresh\" content=\"0; url={0}\">\n<link rel=\"canonical\" href=\"{0}\">\n",
            DOCS_PREFIX
        );

        write_file(&self.config.output_dir.join("index.html"), html)
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        let themes_dir = self.config.output_dir.join("themes");

        let css = AssetPipeline::maybe_minify(AssetPipeline::generate_css(), self.config.minify);
        write_file(&assets_dir.join("main.css"), css)?;
        write_file(&assets_dir.join("main.js"), AssetPipeline::generate_js())?;

        for variant in ThemeVariant::ALL {
            let css = AssetPipeline::maybe_minify(AssetPipeline::theme_css(variant), self.config.minify);
            write_file(&themes_dir.join(format!("{}.css", variant)), css)?;
        }

        // Copy configured stylesheets
        for style_path in &self.config.styles {
            let Some(filename) = style_path.file_name() else {
                continue;
            };
            if !style_path.is_file() {
                tracing::warn!("Stylesheet not found: {}", style_path.display());
                continue;
            }

            let content = fs::read_to_string(style_path).map_err(|e| {
                BuildError::ReadError(format!("{}: {}", style_path.display(), e))
            })?;
            write_file(
                &assets_dir.join(filename),
                AssetPipeline::maybe_minify(content, self.config.minify),
            )?;
            tracing::info!("Copied stylesheet from {}", style_path.display());
        }

        Ok(())
    }

    /// Generate search index.
    fn generate_search_index(&self, docs: &[Document]) -> Result<(), BuildError> {
        let index: Vec<SearchEntry> = docs
            .iter()
            .map(|doc| SearchEntry {
                title: &doc.title,
                description: doc.description.as_deref().unwrap_or_default(),
                url: doc_href(&doc.slug),
                headings: flatten_toc(&doc.toc)
                    .into_iter()
                    .map(|entry| entry.text.as_str())
                    .collect(),
                content: search_excerpt(&doc.raw_content),
            })
            .collect();

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        write_file(&self.config.output_dir.join("search-index.json"), json)
    }

    /// Generate sitemap and robots.txt.
    fn generate_sitemap(&self, docs: &[Document]) -> Result<(), BuildError> {
        let site_url = self.config.site_url.trim_end_matches('/');

        let urls: Vec<String> = docs
            .iter()
            .map(|doc| {
                format!(
                    "  <url>\n    <loc>{}{}</loc>\n  </url>",
                    site_url,
                    doc_href(&doc.slug)
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        write_file(&self.config.output_dir.join("sitemap.xml"), sitemap)?;

        let robots = format!("User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml\n", site_url);
        write_file(&self.config.output_dir.join("robots.txt"), robots)
    }
}

/// First prose lines of a document, for search.
fn search_excerpt(content: &str) -> String {
    let mut fences = acpsite_mdx::FenceTracker::new();

    content
        .lines()
        .filter(|line| {
            fences.advance(line) == acpsite_mdx::codeblock::LineKind::Prose
                && !line.trim().is_empty()
                && !line.starts_with('#')
                && !line.starts_with('<')
        })
        .take(10)
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }

    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(temp: &Path) -> (PathBuf, PathBuf) {
        let docs = temp.join("content/docs");
        write(&docs, "index.mdx", "---\ntitle: Home\norder: 0\n---\n\nWelcome.\n");
        write(
            &docs,
            "getting-started/01-introduction.mdx",
            "---\ntitle: Introduction\ndescription: What ACP is\norder: 1\n---\n\n## Goals\n\nSearchable content.\n",
        );
        write(
            &docs,
            "getting-started/02-install.mdx",
            "---\ntitle: Install\norder: 2\n---\n\n```bash\nnpm i\n```\n",
        );
        write(&docs, "getting-started/_meta.json", r#"{"title":"Getting Started","order":1}"#);
        (docs, temp.join("dist"))
    }

    #[tokio::test]
    async fn builds_simple_site() {
        let temp = tempdir().unwrap();
        let (docs, out) = site(temp.path());

        let builder = StaticBuilder::new(BuildConfig {
            content_dir: docs,
            output_dir: out.clone(),
            ..Default::default()
        });
        let result = builder.build().await.unwrap();

        assert_eq!(result.pages, 3);
        assert!(out.join("docs/index.html").exists());
        assert!(out.join("docs/getting-started/01-introduction/index.html").exists());
        assert!(out.join("docs/getting-started/02-install/index.html").exists());
        assert!(out.join("index.html").exists());
        assert!(out.join("404.html").exists());
        assert!(out.join("assets/main.css").exists());
        assert!(out.join("assets/main.js").exists());
        assert!(out.join("themes/acp.css").exists());
        assert!(out.join("themes/synthwave.css").exists());

        let not_found = fs::read_to_string(out.join("404.html")).unwrap();
        assert!(not_found.contains("Page not found"));
        assert!(!not_found.contains("<code></code>"));
    }

    #[tokio::test]
    async fn pages_link_neighbours_and_headings() {
        let temp = tempdir().unwrap();
        let (docs, out) = site(temp.path());

        StaticBuilder::new(BuildConfig {
            content_dir: docs,
            output_dir: out.clone(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        let page =
            fs::read_to_string(out.join("docs/getting-started/01-introduction/index.html")).unwrap();
        assert!(page.contains(r#"<h2 id="goals">Goals</h2>"#));
        assert!(page.contains("<span>Next</span>Install</a>"));
        assert!(page.contains("Getting Started"));
    }

    #[tokio::test]
    async fn generates_search_index_and_sitemap() {
        let temp = tempdir().unwrap();
        let (docs, out) = site(temp.path());

        StaticBuilder::new(BuildConfig {
            content_dir: docs,
            output_dir: out.clone(),
            site_url: "https://docs.example.com/".to_string(),
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        let index = fs::read_to_string(out.join("search-index.json")).unwrap();
        assert!(index.contains("Searchable content."));
        assert!(index.contains("\"Goals\""));
        assert!(!index.contains("npm i"));

        let sitemap = fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains(
            "<loc>https://docs.example.com/docs/getting-started/02-install</loc>"
        ));

        let robots = fs::read_to_string(out.join("robots.txt")).unwrap();
        assert!(robots.contains("Sitemap: https://docs.example.com/sitemap.xml"));
    }

    #[tokio::test]
    async fn copies_configured_stylesheets() {
        let temp = tempdir().unwrap();
        let (docs, out) = site(temp.path());
        let style = temp.path().join("brand.css");
        fs::write(&style, ".brand { color: red; }").unwrap();

        StaticBuilder::new(BuildConfig {
            content_dir: docs,
            output_dir: out.clone(),
            styles: vec![style, temp.path().join("missing.css")],
            minify: false,
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        assert!(out.join("assets/brand.css").exists());
        let page = fs::read_to_string(out.join("docs/index.html")).unwrap();
        assert!(page.contains("brand.css"));
    }

    #[tokio::test]
    async fn missing_content_dir_fails() {
        let temp = tempdir().unwrap();

        let result = StaticBuilder::new(BuildConfig {
            content_dir: temp.path().join("nope"),
            output_dir: temp.path().join("dist"),
            ..Default::default()
        })
        .build()
        .await;

        assert!(matches!(result, Err(BuildError::ReadError(_))));
    }

    #[test]
    fn excerpt_skips_code_and_headings() {
        let excerpt = search_excerpt("## Heading\n\nFirst line.\n\n```\ncode\n```\nSecond line.");

        assert_eq!(excerpt, "First line. Second line.");
    }
}

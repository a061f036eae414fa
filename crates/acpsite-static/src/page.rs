//! Full page rendering shared by the static build and the dev server.

use acpsite_content::{breadcrumbs, doc_href, paginate, Document, NavSection, Pagination};

use crate::render::render_markdown;
use crate::templates::{Context, TemplateEngine};
use crate::theme::ThemeState;

/// Site-wide settings every page needs.
#[derive(Debug, Clone, Default)]
pub struct SiteOptions {
    pub title: String,
    /// Hrefs of extra stylesheets
    pub styles: Vec<String>,
    /// Pages include the live reload client
    pub dev: bool,
}

/// Turns documents into complete HTML pages.
pub struct PageRenderer {
    templates: TemplateEngine,
    site: SiteOptions,
}

impl PageRenderer {
    pub fn new(site: SiteOptions) -> Self {
        Self {
            templates: TemplateEngine::new(),
            site,
        }
    }

    /// Render one document with sidebar, breadcrumbs, TOC and neighbours.
    pub fn render_doc(
        &self,
        doc: &Document,
        nav: &[NavSection],
        theme: ThemeState,
    ) -> Result<String, minijinja::Error> {
        let href = doc_href(&doc.slug);

        let context = Context {
            title: doc.title.clone(),
            description: doc.description.clone(),
            site_title: self.site.title.clone(),
            content: render_markdown(&doc.raw_content),
            sections: nav.to_vec(),
            toc: doc.toc.clone(),
            breadcrumbs: breadcrumbs(&doc.slug, &doc.title),
            pagination: paginate(nav, &href),
            current_href: href,
            theme,
            styles: self.site.styles.clone(),
            dev: self.site.dev,
        };

        self.templates.render_page("doc.html", &context)
    }

    /// Render the page shown for an unknown href.
    pub fn render_not_found(
        &self,
        nav: &[NavSection],
        href: &str,
        theme: ThemeState,
    ) -> Result<String, minijinja::Error> {
        let context = Context {
            title: "Page not found".to_string(),
            description: None,
            site_title: self.site.title.clone(),
            content: String::new(),
            sections: nav.to_vec(),
            current_href: href.to_string(),
            toc: Vec::new(),
            breadcrumbs: Vec::new(),
            pagination: Pagination::default(),
            theme,
            styles: self.site.styles.clone(),
            dev: self.site.dev,
        };

        self.templates.render_page("404.html", &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    use acpsite_content::ContentSource;

    #[test]
    fn renders_document_from_source() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("guides")).unwrap();
        fs::write(
            temp.path().join("guides/01-install.mdx"),
            "---\ntitle: Install\n---\n\n## Requirements\n\nA shell.\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("guides/02-deploy.mdx"),
            "---\ntitle: Deploy\ndescription: Ship it\n---\n\n## Steps\n",
        )
        .unwrap();

        let source = ContentSource::new(temp.path());
        let nav = source.build_navigation();
        let doc = source
            .doc_by_slug(&["guides".to_string(), "01-install".to_string()])
            .unwrap();
        let renderer = PageRenderer::new(SiteOptions {
            title: "ACP Protocol".to_string(),
            ..Default::default()
        });

        let html = renderer.render_doc(&doc, &nav, ThemeState::default()).unwrap();

        assert!(html.contains("<title>Install - ACP Protocol</title>"));
        assert!(html.contains(r#"<h2 id="requirements">Requirements</h2>"#));
        assert!(html.contains(r##"<a href="#requirements">Requirements</a>"##));
        assert!(html.contains("<span>Next</span>Deploy</a>"));
        assert!(!html.contains("<span>Previous</span>"));
    }

    #[test]
    fn renders_not_found_page() {
        let renderer = PageRenderer::new(SiteOptions::default());

        let html = renderer
            .render_not_found(&[], "/docs/nope", ThemeState::default())
            .unwrap();

        assert!(html.contains("Page not found"));
    }
}

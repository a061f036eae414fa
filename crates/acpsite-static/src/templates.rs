//! Template engine for rendering documentation pages.

use minijinja::{context, Environment};
use serde::Serialize;

use acpsite_content::{Breadcrumb, NavSection, Pagination};
use acpsite_mdx::HeadingEntry;

use crate::theme::{ThemeState, ThemeVariant};

/// Context for rendering a page template.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Short summary shown under the title and in the description meta tag
    pub description: Option<String>,
    /// Site title
    pub site_title: String,
    /// Rendered content HTML
    pub content: String,
    /// Sidebar navigation
    pub sections: Vec<NavSection>,
    /// Href of the page being rendered, used to mark the active link
    pub current_href: String,
    /// Table of contents
    pub toc: Vec<HeadingEntry>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub pagination: Pagination,
    /// Theme the page is served with
    pub theme: ThemeState,
    /// Extra stylesheet hrefs
    pub styles: Vec<String>,
    /// Include the live reload client
    pub dev: bool,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("base.html".to_string(), BASE_TEMPLATE.to_string())
            .expect("Failed to add base template");
        env.add_template_owned("doc.html".to_string(), DOC_TEMPLATE.to_string())
            .expect("Failed to add doc template");
        env.add_template_owned("nav.html".to_string(), NAV_TEMPLATE.to_string())
            .expect("Failed to add nav template");
        env.add_template_owned("toc.html".to_string(), TOC_TEMPLATE.to_string())
            .expect("Failed to add toc template");
        env.add_template_owned("404.html".to_string(), NOT_FOUND_TEMPLATE.to_string())
            .expect("Failed to add not found template");

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(
        &self,
        template: &str,
        context: &Context,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        let variants: Vec<&str> = ThemeVariant::ALL.iter().map(|v| v.as_str()).collect();

        tmpl.render(context! {
            title => &context.title,
            description => &context.description,
            site_title => &context.site_title,
            content => &context.content,
            sections => &context.sections,
            current_href => &context.current_href,
            toc => &context.toc,
            breadcrumbs => &context.breadcrumbs,
            prev => &context.pagination.prev,
            next => &context.pagination.next,
            theme => context.theme.variant.as_str(),
            color_mode => context.theme.color_mode.as_str(),
            variants => variants,
            styles => &context.styles,
            dev => context.dev,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en" data-theme="{{ theme }}" data-color-mode="{{ color_mode }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site_title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}<link rel="stylesheet" href="/assets/main.css">
  <link rel="stylesheet" href="/themes/{{ theme }}.css" id="theme-variant">
  {% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}
</head>
<body{% if dev %} data-dev{% endif %}>
  <button class="menu-btn" type="button" aria-label="Toggle navigation">Menu</button>
  <div class="layout">
    <nav class="sidebar">
      {% include "nav.html" %}
    </nav>
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
  <script src="/assets/main.js"></script>
  {% if dev %}<script src="/__hmr.js"></script>{% endif %}
</body>
</html>"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc">
  {% if breadcrumbs | length > 1 %}
  <nav class="breadcrumbs" aria-label="Breadcrumb">
    <ol>
    {% for crumb in breadcrumbs %}
      <li>{% if loop.last %}<span aria-current="page">{{ crumb.title }}</span>{% else %}<a href="{{ crumb.href }}">{{ crumb.title }}</a>{% endif %}</li>
    {% endfor %}
    </ol>
  </nav>
  {% endif %}
  <h1 class="doc-title">{{ title }}</h1>
  {% if description %}<p class="doc-description">{{ description }}</p>{% endif %}
  <div class="content">
    {{ content | safe }}
  </div>
  {% if prev or next %}
  <nav class="pagination" aria-label="Pagination">
    {% if prev %}<a class="prev" href="{{ prev.href }}"><span>Previous</span>{{ prev.title }}</a>{% endif %}
    {% if next %}<a class="next" href="{{ next.href }}"><span>Next</span>{{ next.title }}</a>{% endif %}
  </nav>
  {% endif %}
</article>

{% if toc %}
<aside class="toc">
  <h2>On this page</h2>
  {% include "toc.html" %}
</aside>
{% endif %}
{% endblock %}"##;

const TOC_TEMPLATE: &str = r##"<ul>
{% for entry in toc %}
  <li class="toc-level-{{ entry.level }}">
    <a href="#{{ entry.id }}">{{ entry.text }}</a>
    {% if entry.children %}
    <ul>
      {% for child in entry.children %}
      <li class="toc-level-{{ child.level }}"><a href="#{{ child.id }}">{{ child.text }}</a></li>
      {% endfor %}
    </ul>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

const NAV_TEMPLATE: &str = r##"<div class="nav-header">
  <a href="/docs" class="nav-logo">{{ site_title }}</a>
  <div class="theme-controls">
    <select class="theme-variant-select" aria-label="Theme">
      {% for variant in variants %}<option value="{{ variant }}"{% if variant == theme %} selected{% endif %}>{{ variant }}</option>{% endfor %}
    </select>
    <button class="color-mode-toggle" type="button" data-mode="{{ color_mode }}">{{ color_mode }}</button>
  </div>
</div>
{% for section in sections %}
<div class="nav-section">
  <h3 class="nav-section-title">{{ section.title }}</h3>
  <ul class="nav-list">
  {% for item in section.items %}
    <li class="nav-item{% if item.href == current_href %} active{% endif %}">
      <a href="{{ item.href }}">{{ item.title }}</a>
    </li>
  {% endfor %}
  </ul>
</div>
{% endfor %}"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc not-found">
  <h1 class="doc-title">Page not found</h1>
  {% if current_href %}
  <p class="doc-description">No document lives at <code>{{ current_href }}</code>.</p>
  {% endif %}
  <p><a href="/docs">Back to the documentation</a></p>
</article>
{% endblock %}"##;

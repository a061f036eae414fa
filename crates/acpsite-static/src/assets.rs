//! Asset pipeline for CSS and JavaScript processing.

use std::path::Path;

use crate::theme::ThemeVariant;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main JavaScript file.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Stylesheet defining the palette of one theme variant.
    pub fn theme_css(variant: ThemeVariant) -> String {
        match variant {
            ThemeVariant::Acp => ACP_THEME_CSS.to_string(),
            ThemeVariant::Synthwave => SYNTHWAVE_THEME_CSS.to_string(),
        }
    }

    /// Site path a user stylesheet is published under.
    pub fn stylesheet_href(path: &Path) -> Option<String> {
        path.file_name()
            .and_then(|f| f.to_str())
            .map(|name| format!("/assets/{}", name))
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Minify when asked, falling back to the original text on failure.
    pub fn maybe_minify(css: String, minify: bool) -> String {
        if !minify {
            return css;
        }
        match Self::minify_css(&css) {
            Ok(minified) => minified,
            Err(e) => {
                tracing::warn!("Keeping unminified CSS: {}", e);
                css
            }
        }
    }
}

// Layout only. Colors come from the active theme variant stylesheet.
const DEFAULT_CSS: &str = r#"/* ACP Docs - layout */

:root {
  --sidebar-width: 280px;
  --toc-width: 220px;
  --content-max-width: 800px;
  --radius: 0.5rem;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: var(--font-sans, system-ui, -apple-system, sans-serif);
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: 100vh;
}

/* Sidebar */
.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1.5rem;
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
}

.nav-header {
  display: flex;
  flex-direction: column;
  gap: 0.75rem;
  margin-bottom: 1.5rem;
}

.nav-logo {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.theme-controls {
  display: flex;
  gap: 0.5rem;
}

.theme-controls select,
.theme-controls button {
  font: inherit;
  font-size: 0.75rem;
  padding: 0.25rem 0.5rem;
  background: var(--background);
  color: var(--foreground);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  cursor: pointer;
}

.nav-section {
  margin-bottom: 1.25rem;
}

.nav-section-title {
  font-size: 0.75rem;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.5rem;
}

.nav-list {
  list-style: none;
}

.nav-item a {
  display: block;
  padding: 0.375rem 0.75rem;
  color: var(--muted-foreground);
  text-decoration: none;
  border-radius: var(--radius);
  transition: background 0.15s, color 0.15s;
}

.nav-item a:hover {
  background: var(--accent);
  color: var(--accent-foreground);
}

.nav-item.active > a {
  background: var(--primary);
  color: var(--primary-foreground);
}

/* Main content */
.main {
  display: grid;
  grid-template-columns: 1fr var(--toc-width);
  gap: 2rem;
  padding: 2rem;
  max-width: calc(var(--content-max-width) + var(--toc-width) + 4rem);
}

.doc {
  max-width: var(--content-max-width);
}

.breadcrumbs ol {
  display: flex;
  flex-wrap: wrap;
  gap: 0.5rem;
  list-style: none;
  font-size: 0.875rem;
  color: var(--muted-foreground);
  margin-bottom: 1rem;
}

.breadcrumbs li + li::before {
  content: "/";
  margin-right: 0.5rem;
}

.breadcrumbs a {
  color: inherit;
  text-decoration: none;
}

.doc-title {
  font-size: 2.5rem;
  font-weight: 700;
  margin-bottom: 0.5rem;
}

.doc-description {
  font-size: 1.125rem;
  color: var(--muted-foreground);
  margin-bottom: 2rem;
}

.content h2 {
  font-size: 1.5rem;
  font-weight: 600;
  margin: 2rem 0 1rem;
  padding-bottom: 0.5rem;
  border-bottom: 1px solid var(--border);
  scroll-margin-top: 1rem;
}

.content h3 {
  font-size: 1.25rem;
  font-weight: 600;
  margin: 1.5rem 0 0.75rem;
  scroll-margin-top: 1rem;
}

.content p,
.content ul,
.content ol,
.content table {
  margin-bottom: 1rem;
}

.content ul,
.content ol {
  padding-left: 1.5rem;
}

.content a {
  color: var(--primary);
  text-decoration: underline;
  text-underline-offset: 4px;
}

.content table {
  border-collapse: collapse;
  width: 100%;
}

.content th,
.content td {
  border: 1px solid var(--border);
  padding: 0.5rem 0.75rem;
  text-align: left;
}

/* Code blocks */
.content pre {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  font-family: var(--font-mono, ui-monospace, monospace);
  font-size: 0.875rem;
  margin-bottom: 1rem;
  position: relative;
}

.content code {
  font-family: var(--font-mono, ui-monospace, monospace);
  font-size: 0.875em;
  background: var(--muted);
  padding: 0.125rem 0.375rem;
  border-radius: 0.25rem;
}

.content pre code {
  background: none;
  padding: 0;
  color: var(--card-foreground);
}

.copy-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.25rem 0.75rem;
  font-size: 0.75rem;
  background: var(--secondary);
  color: var(--secondary-foreground);
  border: none;
  border-radius: var(--radius);
  cursor: pointer;
}

/* Callouts */
.callout {
  border-left: 4px solid var(--primary);
  background: var(--muted);
  border-radius: var(--radius);
  padding: 1rem 1.25rem;
  margin-bottom: 1rem;
}

.callout p:last-child {
  margin-bottom: 0;
}

.callout-warning {
  border-left-color: var(--warning);
}

.callout-important {
  border-left-color: var(--destructive);
}

/* Previous / next */
.pagination {
  display: flex;
  justify-content: space-between;
  gap: 1rem;
  margin-top: 3rem;
  padding-top: 1.5rem;
  border-top: 1px solid var(--border);
}

.pagination a {
  display: flex;
  flex-direction: column;
  padding: 0.75rem 1rem;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  color: var(--foreground);
  text-decoration: none;
}

.pagination .next {
  margin-left: auto;
  text-align: right;
}

.pagination span {
  font-size: 0.75rem;
  color: var(--muted-foreground);
}

/* Table of contents */
.toc {
  position: sticky;
  top: 2rem;
  align-self: start;
}

.toc h2 {
  font-size: 0.75rem;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc ul ul {
  padding-left: 1rem;
}

.toc li {
  margin-bottom: 0.25rem;
}

.toc a {
  font-size: 0.875rem;
  color: var(--muted-foreground);
  text-decoration: none;
}

.toc a:hover {
  color: var(--foreground);
}

.not-found {
  text-align: center;
  padding: 4rem 0;
}

/* Responsive */
.menu-btn {
  display: none;
  position: fixed;
  top: 1rem;
  left: 1rem;
  z-index: 100;
  padding: 0.5rem;
  background: var(--primary);
  color: var(--primary-foreground);
  border: none;
  border-radius: var(--radius);
  cursor: pointer;
}

@media (max-width: 1024px) {
  .layout {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: fixed;
    left: -100%;
    z-index: 50;
    transition: left 0.3s;
    width: var(--sidebar-width);
  }

  .sidebar.open {
    left: 0;
  }

  .main {
    grid-template-columns: 1fr;
  }

  .toc {
    display: none;
  }

  .menu-btn {
    display: block;
  }
}
"#;

const ACP_THEME_CSS: &str = r#"/* ACP theme */
[data-theme="acp"] {
  --background: #ffffff;
  --foreground: #0f172a;
  --muted: #f1f5f9;
  --muted-foreground: #475569;
  --border: #e2e8f0;
  --card: #f8fafc;
  --card-foreground: #0f172a;
  --primary: #2563eb;
  --primary-foreground: #ffffff;
  --secondary: #e2e8f0;
  --secondary-foreground: #0f172a;
  --accent: #dbeafe;
  --accent-foreground: #1e3a8a;
  --warning: #d97706;
  --destructive: #dc2626;
}

[data-theme="acp"][data-color-mode="dark"] {
  --background: #0b1120;
  --foreground: #e2e8f0;
  --muted: #111827;
  --muted-foreground: #94a3b8;
  --border: #1f2937;
  --card: #0f172a;
  --card-foreground: #e2e8f0;
  --primary: #3b82f6;
  --secondary: #1f2937;
  --secondary-foreground: #e2e8f0;
  --accent: #1e293b;
  --accent-foreground: #bfdbfe;
}

@media (prefers-color-scheme: dark) {
  [data-theme="acp"][data-color-mode="system"] {
    --background: #0b1120;
    --foreground: #e2e8f0;
    --muted: #111827;
    --muted-foreground: #94a3b8;
    --border: #1f2937;
    --card: #0f172a;
    --card-foreground: #e2e8f0;
    --primary: #3b82f6;
    --secondary: #1f2937;
    --secondary-foreground: #e2e8f0;
    --accent: #1e293b;
    --accent-foreground: #bfdbfe;
  }
}
"#;

const SYNTHWAVE_THEME_CSS: &str = r#"/* Synthwave theme */
[data-theme="synthwave"] {
  --background: #fdf4ff;
  --foreground: #2e1065;
  --muted: #fae8ff;
  --muted-foreground: #6b21a8;
  --border: #f0abfc;
  --card: #faf5ff;
  --card-foreground: #2e1065;
  --primary: #db2777;
  --primary-foreground: #ffffff;
  --secondary: #f5d0fe;
  --secondary-foreground: #2e1065;
  --accent: #fce7f3;
  --accent-foreground: #9d174d;
  --warning: #f59e0b;
  --destructive: #e11d48;
}

[data-theme="synthwave"][data-color-mode="dark"] {
  --background: #1a1033;
  --foreground: #f5d0fe;
  --muted: #241445;
  --muted-foreground: #c4b5fd;
  --border: #3b1f6e;
  --card: #1f1240;
  --card-foreground: #f5d0fe;
  --primary: #f472b6;
  --secondary: #3b1f6e;
  --secondary-foreground: #f5d0fe;
  --accent: #2e1a5c;
  --accent-foreground: #22d3ee;
}

@media (prefers-color-scheme: dark) {
  [data-theme="synthwave"][data-color-mode="system"] {
    --background: #1a1033;
    --foreground: #f5d0fe;
    --muted: #241445;
    --muted-foreground: #c4b5fd;
    --border: #3b1f6e;
    --card: #1f1240;
    --card-foreground: #f5d0fe;
    --primary: #f472b6;
    --secondary: #3b1f6e;
    --secondary-foreground: #f5d0fe;
    --accent: #2e1a5c;
    --accent-foreground: #22d3ee;
  }
}
"#;

const DEFAULT_JS: &str = r#"// ACP Docs - runtime
(function() {
  'use strict';

  const VARIANT_KEY = 'acp-theme-variant';
  const MODE_KEY = 'acp-color-mode';
  const VARIANTS = ['acp', 'synthwave'];
  const MODES = ['system', 'dark', 'light'];
  const root = document.documentElement;
  const isDev = document.body.hasAttribute('data-dev');

  function read(key) {
    try { return localStorage.getItem(key); } catch (err) { return null; }
  }

  function write(key, value) {
    try { localStorage.setItem(key, value); } catch (err) { /* storage unavailable */ }
  }

  function applyVariant(variant) {
    if (!VARIANTS.includes(variant)) return;
    root.dataset.theme = variant;
    const link = document.getElementById('theme-variant');
    if (link) link.setAttribute('href', '/themes/' + variant + '.css');
    const select = document.querySelector('.theme-variant-select');
    if (select) select.value = variant;
    write(VARIANT_KEY, variant);
  }

  function applyMode(mode) {
    if (!MODES.includes(mode)) return;
    root.dataset.colorMode = mode;
    const toggle = document.querySelector('.color-mode-toggle');
    if (toggle) {
      toggle.dataset.mode = mode;
      toggle.textContent = mode;
    }
    write(MODE_KEY, mode);
  }

  // Stored preferences win over the defaults baked into the page
  const storedVariant = read(VARIANT_KEY);
  if (storedVariant) applyVariant(storedVariant);
  const storedMode = read(MODE_KEY);
  if (storedMode) applyMode(storedMode);

  const select = document.querySelector('.theme-variant-select');
  if (select) {
    select.addEventListener('change', () => {
      applyVariant(select.value);
      if (isDev) fetch('/__theme/' + select.value, { method: 'POST' });
    });
  }

  const toggle = document.querySelector('.color-mode-toggle');
  if (toggle) {
    toggle.addEventListener('click', () => {
      const current = root.dataset.colorMode || 'system';
      applyMode(MODES[(MODES.indexOf(current) + 1) % MODES.length]);
    });
  }

  window.acpTheme = { applyVariant: applyVariant, applyMode: applyMode };

  // Mobile menu toggle
  const menuBtn = document.querySelector('.menu-btn');
  const sidebar = document.querySelector('.sidebar');

  if (menuBtn && sidebar) {
    menuBtn.addEventListener('click', () => {
      sidebar.classList.toggle('open');
    });
  }

  // Copy button for code blocks
  document.querySelectorAll('.content pre').forEach(pre => {
    if (pre.querySelector('.copy-btn')) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async () => {
      const code = pre.querySelector('code');
      const text = code ? code.textContent : pre.textContent;

      try {
        await navigator.clipboard.writeText(text || '');
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(() => { btn.textContent = 'Copy'; }, 2000);
    });

    pre.appendChild(btn);
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains(":root"));
        assert!(css.contains(".callout"));
        assert!(css.contains(".pagination"));
    }

    #[test]
    fn generates_theme_switcher() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("acp-theme-variant"));
        assert!(js.contains("'system', 'dark', 'light'"));
        assert!(js.contains("/__theme/"));
    }

    #[test]
    fn theme_css_per_variant() {
        for variant in ThemeVariant::ALL {
            let css = AssetPipeline::theme_css(variant);
            assert!(css.contains(&format!("[data-theme=\"{}\"]", variant)));
            assert!(css.contains("prefers-color-scheme: dark"));
        }
    }

    #[test]
    fn stylesheet_href_uses_file_name() {
        assert_eq!(
            AssetPipeline::stylesheet_href(Path::new("styles/brand.css")).as_deref(),
            Some("/assets/brand.css")
        );
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.button {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".button"));
    }

    #[test]
    fn minifies_bundled_stylesheets() {
        assert!(AssetPipeline::minify_css(&AssetPipeline::generate_css()).is_ok());
        assert!(AssetPipeline::minify_css(&AssetPipeline::theme_css(ThemeVariant::Acp)).is_ok());
    }
}

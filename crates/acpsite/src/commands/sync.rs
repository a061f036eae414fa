//! Markdown sync command.
//!
//! Converts Markdown from an external repository into the MDX content tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use acpsite_content::{doc_href, META_FILE};
use acpsite_mdx::infer::extract_order;
use acpsite_mdx::{
    format_title, infer_metadata, render_frontmatter, transform_document, Frontmatter, LinkTable,
};

use crate::config::{ChapterMapping, Config, SchemaSettings, SpecSettings, SyncSettings};
use crate::schema::{schema_index, schema_page, schema_slug};

/// Outcome of a sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Output files written, relative to the content root
    pub converted: Vec<PathBuf>,
    /// Sources that could not be found
    pub skipped: Vec<PathBuf>,
    /// Raw schema files copied for direct download
    pub copied: Vec<PathBuf>,
}

/// Metadata forced onto a converted document.
#[derive(Debug, Default)]
struct Overrides {
    title: Option<String>,
    description: Option<String>,
    order: Option<i32>,
}

impl From<&ChapterMapping> for Overrides {
    fn from(chapter: &ChapterMapping) -> Self {
        Self {
            title: chapter.title.clone(),
            description: chapter.description.clone(),
            order: chapter.order,
        }
    }
}

/// Run the sync command.
pub async fn run(config: &Config, clean: bool) -> Result<()> {
    let settings = &config.sync;
    tracing::info!(
        "Syncing {} into {}",
        settings.source_dir.display(),
        config.docs.dir.display()
    );

    let report = sync(settings, &config.docs.dir, clean || settings.clean)?;

    for path in &report.skipped {
        tracing::warn!("Skipped (not found): {}", path.display());
    }
    tracing::info!(
        "Converted {} files, skipped {}, copied {} schemas",
        report.converted.len(),
        report.skipped.len(),
        report.copied.len()
    );

    Ok(())
}

/// Convert every configured source into `content_dir`.
pub fn sync(settings: &SyncSettings, content_dir: &Path, clean: bool) -> Result<SyncReport> {
    let source_dir = &settings.source_dir;
    if !source_dir.is_dir() {
        bail!("Source directory not found: {}", source_dir.display());
    }

    if clean && content_dir.exists() {
        fs::remove_dir_all(content_dir)
            .with_context(|| format!("Failed to clean {}", content_dir.display()))?;
        tracing::info!("Cleaned {}", content_dir.display());
    }

    let spec_chapters = match &settings.spec {
        Some(spec) => numbered_chapters(&source_dir.join(&spec.dir)),
        None => Vec::new(),
    };

    let mut links = LinkTable::new();
    for chapter in &settings.chapters {
        links.insert(
            chapter.source.to_string_lossy(),
            chapter.output.to_string_lossy(),
        );
    }
    if let Some(spec) = &settings.spec {
        for file_name in &spec_chapters {
            links.insert(
                file_name.as_str(),
                spec_output(spec, file_name).to_string_lossy(),
            );
        }
    }

    let mut report = SyncReport::default();

    if let Some(index) = &settings.index {
        let overrides = Overrides {
            order: Some(0),
            ..Default::default()
        };
        convert_into(
            &mut report,
            &source_dir.join(index),
            content_dir,
            Path::new("index.mdx"),
            &overrides,
            &links,
        )?;
    }

    for mapping in &settings.dirs {
        let dir = source_dir.join(&mapping.source);
        if !dir.is_dir() {
            report.skipped.push(dir);
            continue;
        }

        for entry in WalkDir::new(&dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
        {
            let relative = entry.path().strip_prefix(&dir).unwrap_or(entry.path());
            let output = mapping.output.join(relative).with_extension("mdx");
            convert_into(
                &mut report,
                entry.path(),
                content_dir,
                &output,
                &Overrides::default(),
                &links,
            )?;
        }
    }

    for chapter in &settings.chapters {
        convert_into(
            &mut report,
            &source_dir.join(&chapter.source),
            content_dir,
            &chapter.output,
            &Overrides::from(chapter),
            &links,
        )?;
    }

    if let Some(spec) = &settings.spec {
        sync_spec(&mut report, spec, source_dir, content_dir, &spec_chapters, &links)?;
    }

    if let Some(schemas) = &settings.schemas {
        sync_schemas(&mut report, schemas, source_dir, content_dir)?;
    }

    for (section, meta) in &settings.sections {
        let dir = content_dir.join(section);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let json = serde_json::to_string_pretty(meta)? + "\n";
        let path = dir.join(META_FILE);
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Created {}/{}", section, META_FILE);
    }

    Ok(report)
}

/// Markdown file names in `dir`, ordered by their numeric prefix.
fn numbered_chapters(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".md"))
        .collect();

    files.sort_by_key(|name| extract_order(name).unwrap_or(0));
    files
}

/// `05-annotations.md` lands at `<output>/annotations.mdx`.
fn spec_output(spec: &SpecSettings, file_name: &str) -> PathBuf {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    spec.output
        .join(strip_order_prefix(stem))
        .with_extension("mdx")
}

fn strip_order_prefix(name: &str) -> &str {
    match name.split_once('-') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) => rest,
        _ => name,
    }
}

/// Site href for a content path such as `reference/schemas/cache.mdx`.
fn content_href(path: &Path) -> String {
    let slug: Vec<String> = path
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    doc_href(&slug)
}

fn write_page(content_dir: &Path, output: &Path, page: &str) -> Result<()> {
    let path = content_dir.join(output);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, page).with_context(|| format!("Failed to write {}", path.display()))
}

/// Convert the numbered chapters and write their index page.
fn sync_spec(
    report: &mut SyncReport,
    spec: &SpecSettings,
    source_dir: &Path,
    content_dir: &Path,
    chapters: &[String],
    links: &LinkTable,
) -> Result<()> {
    let dir = source_dir.join(&spec.dir);
    if !dir.is_dir() {
        report.skipped.push(dir);
        return Ok(());
    }

    let header = render_frontmatter(&Frontmatter {
        title: spec.title.clone(),
        description: Some(spec.description.clone()),
        order: Some(spec.order),
    });
    let list: Vec<String> = chapters
        .iter()
        .map(|file_name| {
            format!(
                "- [{}]({})",
                format_title(file_name),
                content_href(&spec_output(spec, file_name))
            )
        })
        .collect();
    let index = format!(
        "{}\n\n# {}\n\nThe complete technical specification for the AI Context Protocol.\n\n## Chapters\n\n{}\n",
        header,
        spec.title,
        list.join("\n")
    );

    let index_path = spec.output.join("index.mdx");
    write_page(content_dir, &index_path, &index)?;
    report.converted.push(index_path);

    for file_name in chapters {
        let overrides = Overrides {
            order: extract_order(file_name),
            ..Default::default()
        };
        convert_into(
            report,
            &dir.join(file_name),
            content_dir,
            &spec_output(spec, file_name),
            &overrides,
            links,
        )?;
    }

    Ok(())
}

/// Render every `*.schema.json` as a page and optionally publish the raw files.
fn sync_schemas(
    report: &mut SyncReport,
    schemas: &SchemaSettings,
    source_dir: &Path,
    content_dir: &Path,
) -> Result<()> {
    let dir = source_dir.join(&schemas.dir);
    if !dir.is_dir() {
        report.skipped.push(dir);
        return Ok(());
    }

    let files: Vec<PathBuf> = WalkDir::new(&dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    let mut slugs = Vec::new();
    for path in &files {
        let Some(slug) = path.file_name().and_then(|n| n.to_str()).and_then(schema_slug) else {
            continue;
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let schema: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        let output = schemas.output.join(format!("{}.mdx", slug));
        write_page(content_dir, &output, &schema_page(slug, &schema, &schemas.url))?;
        tracing::info!("Generated {}", output.display());
        report.converted.push(output);
        slugs.push(slug.to_string());
    }

    let index_path = schemas.output.join("index.mdx");
    let section_href = content_href(&schemas.output);
    write_page(
        content_dir,
        &index_path,
        &schema_index(&slugs, &section_href, &schemas.url, schemas.order),
    )?;
    report.converted.push(index_path);

    if let Some(public_dir) = &schemas.public_dir {
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {}", public_dir.display()))?;

        for path in files.iter().filter(|p| p.extension().is_some_and(|e| e == "json")) {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let dest = public_dir.join(file_name);
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {}", path.display()))?;
            report.copied.push(dest);
        }
    }

    Ok(())
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("mdx")
    )
}

/// Convert one file, recording a missing source as skipped.
fn convert_into(
    report: &mut SyncReport,
    source: &Path,
    content_dir: &Path,
    output: &Path,
    overrides: &Overrides,
    links: &LinkTable,
) -> Result<()> {
    if !source.is_file() {
        report.skipped.push(source.to_path_buf());
        return Ok(());
    }

    convert_file(source, &content_dir.join(output), overrides, links)?;
    tracing::info!("Converted {} -> {}", source.display(), output.display());
    report.converted.push(output.to_path_buf());
    Ok(())
}

fn convert_file(source: &Path, output: &Path, overrides: &Overrides, links: &LinkTable) -> Result<()> {
    let content = fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let file_name = source.file_name().and_then(|n| n.to_str()).unwrap_or("");

    let mut metadata = infer_metadata(&content, file_name);
    if let Some(title) = &overrides.title {
        metadata.title = title.clone();
    }
    if let Some(description) = &overrides.description {
        metadata.description = Some(description.clone());
    }
    if let Some(order) = overrides.order {
        metadata.order = Some(order);
    }

    let mdx = transform_document(&content, &metadata, links);

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(output, mdx).with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use acpsite_content::{ContentSource, SectionMeta};
    use crate::config::DirMapping;
    use acpsite_mdx::extract_frontmatter;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn settings(source_dir: PathBuf) -> SyncSettings {
        SyncSettings {
            source_dir,
            index: Some(PathBuf::from("docs/index.md")),
            clean: false,
            dirs: vec![DirMapping {
                source: PathBuf::from("docs/concepts"),
                output: PathBuf::from("concepts"),
            }],
            chapters: vec![
                ChapterMapping {
                    source: PathBuf::from("spec/chapters/01-introduction.md"),
                    output: PathBuf::from("getting-started/introduction.mdx"),
                    title: Some("Introduction".to_string()),
                    description: Some("What ACP is".to_string()),
                    order: Some(1),
                },
                ChapterMapping {
                    source: PathBuf::from("spec/chapters/05-annotations.md"),
                    output: PathBuf::from("core-concepts/annotations.mdx"),
                    title: None,
                    description: None,
                    order: None,
                },
            ],
            spec: None,
            schemas: None,
            sections: BTreeMap::from([(
                "getting-started".to_string(),
                SectionMeta {
                    title: Some("Getting Started".to_string()),
                    order: Some(1),
                },
            )]),
        }
    }

    fn source_tree(root: &Path) {
        write(root, "docs/index.md", "# Welcome\n\nStart here to learn the protocol.\n");
        write(root, "docs/concepts/01-locks.md", "# Locks\n\nUse <PLACEHOLDER> values.\n");
        write(root, "docs/concepts/nested/02-scopes.md", "# Scopes\n");
        write(root, "docs/concepts/image.png", "not markdown");
        write(
            root,
            "spec/chapters/01-introduction.md",
            "# Intro Heading\n\nSee [annotations](05-annotations.md).\n",
        );
        write(root, "spec/chapters/05-annotations.md", "# Annotations\n\n> **Note:** Be careful.\n");
    }

    #[test]
    fn converts_configured_sources() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        let content = temp.path().join("content/docs");
        source_tree(&source);

        let report = sync(&settings(source), &content, false).unwrap();

        assert_eq!(report.converted.len(), 5);
        assert!(report.skipped.is_empty());

        let index = fs::read_to_string(content.join("index.mdx")).unwrap();
        assert!(index.starts_with("---\ntitle: Welcome\n"));
        assert!(index.contains("order: 0"));

        let locks = fs::read_to_string(content.join("concepts/01-locks.mdx")).unwrap();
        assert!(locks.contains("order: 1"));
        assert!(locks.contains("&lt;PLACEHOLDER&gt;"));
        assert!(content.join("concepts/nested/02-scopes.mdx").exists());
        assert!(!content.join("concepts/image.mdx").exists());

        let intro = fs::read_to_string(content.join("getting-started/introduction.mdx")).unwrap();
        assert!(intro.contains("title: Introduction"));
        assert!(intro.contains("description: What ACP is"));
        assert!(intro.contains("[annotations](/docs/core-concepts/annotations)"));

        let annotations = fs::read_to_string(content.join("core-concepts/annotations.mdx")).unwrap();
        assert!(annotations.contains("<Callout type=\"note\">"));

        let meta = fs::read_to_string(content.join("getting-started/_meta.json")).unwrap();
        let meta: SectionMeta = serde_json::from_str(&meta).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Getting Started"));
    }

    #[test]
    fn synced_tree_feeds_navigation() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        let content = temp.path().join("content/docs");
        source_tree(&source);

        sync(&settings(source), &content, false).unwrap();
        let nav = ContentSource::new(&content).build_navigation();

        let titles: Vec<_> = nav.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Getting Started", "Concepts", "Core Concepts"]);
        assert_eq!(nav[0].items[0].href, "/docs/getting-started/introduction");
    }

    #[test]
    fn records_missing_sources() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        fs::create_dir_all(&source).unwrap();

        let report = sync(&settings(source), &temp.path().join("out"), false).unwrap();

        assert!(report.converted.is_empty());
        assert_eq!(report.skipped.len(), 4);
    }

    #[test]
    fn clean_removes_stale_files() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        let content = temp.path().join("content/docs");
        source_tree(&source);
        write(&content, "stale.mdx", "---\ntitle: Stale\n---\n");

        sync(&settings(source.clone()), &content, false).unwrap();
        assert!(content.join("stale.mdx").exists());

        sync(&settings(source), &content, true).unwrap();
        assert!(!content.join("stale.mdx").exists());
        assert!(content.join("index.mdx").exists());
    }

    #[test]
    fn missing_source_dir_fails() {
        let temp = tempdir().unwrap();

        let result = sync(&settings(temp.path().join("nope")), temp.path(), false);

        assert!(result.is_err());
    }

    #[test]
    fn spec_chapters_publish_without_prefix() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        let content = temp.path().join("content/docs");
        source_tree(&source);
        write(&source, "spec/chapters/2-bootstrap.md", "# Bootstrap\n");
        write(&source, "spec/chapters/notes.txt", "not a chapter");

        let mut settings = settings(source);
        settings.chapters.clear();
        settings.spec = Some(SpecSettings::default());

        let report = sync(&settings, &content, false).unwrap();
        assert!(report.skipped.is_empty());

        let index = fs::read_to_string(content.join("reference/specification/index.mdx")).unwrap();
        let (frontmatter, _) = extract_frontmatter(&index).unwrap();
        let frontmatter = frontmatter.unwrap();
        assert_eq!(frontmatter.title, "ACP Specification");
        assert_eq!(frontmatter.order, Some(1));
        assert!(index.contains(
            "## Chapters\n\n\
             - [Introduction](/docs/reference/specification/introduction)\n\
             - [Bootstrap](/docs/reference/specification/bootstrap)\n\
             - [Annotations](/docs/reference/specification/annotations)\n"
        ));

        let annotations =
            fs::read_to_string(content.join("reference/specification/annotations.mdx")).unwrap();
        assert!(annotations.contains("order: 5"));
        assert!(!content.join("reference/specification/05-annotations.mdx").exists());

        let intro =
            fs::read_to_string(content.join("reference/specification/introduction.mdx")).unwrap();
        assert!(intro.contains("[annotations](/docs/reference/specification/annotations)"));
    }

    #[test]
    fn explicit_chapter_mapping_wins_link_resolution() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        let content = temp.path().join("content/docs");
        source_tree(&source);

        let mut settings = settings(source);
        settings.spec = Some(SpecSettings::default());

        sync(&settings, &content, false).unwrap();

        let intro =
            fs::read_to_string(content.join("reference/specification/introduction.mdx")).unwrap();
        assert!(intro.contains("[annotations](/docs/core-concepts/annotations)"));
    }

    #[test]
    fn missing_spec_dir_is_skipped() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        source_tree(&source);

        let mut settings = settings(source);
        settings.spec = Some(SpecSettings {
            dir: PathBuf::from("spec/missing"),
            ..Default::default()
        });

        let report = sync(&settings, &temp.path().join("out"), false).unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert!(!temp.path().join("out/reference/specification").exists());
    }

    #[test]
    fn schemas_become_reference_pages() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        let content = temp.path().join("content/docs");
        let public = temp.path().join("public/schemas/v1");
        source_tree(&source);
        write(
            &source,
            "schemas/v1/cache.schema.json",
            r#"{"description": "Cache file", "required": ["version"], "properties": {"version": {"type": "string"}}}"#,
        );
        write(&source, "schemas/v1/config.schema.json", r#"{"type": "object"}"#);
        write(&source, "schemas/v1/README.md", "# Schemas\n");

        let mut settings = settings(source);
        settings.schemas = Some(SchemaSettings {
            public_dir: Some(public.clone()),
            ..Default::default()
        });

        let report = sync(&settings, &content, false).unwrap();

        assert_eq!(report.copied.len(), 2);
        assert!(public.join("cache.schema.json").exists());
        assert!(public.join("config.schema.json").exists());
        assert!(!public.join("README.md").exists());
        assert!(report.converted.contains(&PathBuf::from("reference/schemas/cache.mdx")));
        assert!(report.converted.contains(&PathBuf::from("reference/schemas/index.mdx")));

        let page = fs::read_to_string(content.join("reference/schemas/cache.mdx")).unwrap();
        assert!(page.contains("title: Cache Schema"));
        assert!(page.contains("| `version` | string | Yes | - |"));

        let index = fs::read_to_string(content.join("reference/schemas/index.mdx")).unwrap();
        assert!(index.contains("- [Cache Schema](/docs/reference/schemas/cache)"));
        assert!(index.contains("- [Config Schema](/docs/reference/schemas/config)"));
        assert!(!content.join("reference/schemas/README.mdx").exists());
    }

    #[test]
    fn invalid_schema_fails() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("acp-spec");
        source_tree(&source);
        write(&source, "schemas/v1/broken.schema.json", "{ not json");

        let mut settings = settings(source);
        settings.schemas = Some(SchemaSettings::default());

        assert!(sync(&settings, &temp.path().join("out"), false).is_err());
    }
}

//! `docs.toml` configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use acpsite_content::SectionMeta;
use acpsite_static::ThemeState;

/// Configuration file structure (docs.toml).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub docs: DocsSettings,
    pub theme: ThemeState,
    pub build: BuildSettings,
    pub sync: SyncSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocsSettings {
    /// Content source root
    pub dir: PathBuf,
    /// Static build output
    pub output: PathBuf,
    pub title: String,
    pub site_url: String,
    /// Paths to CSS stylesheets to include
    pub styles: Vec<PathBuf>,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content/docs"),
            output: PathBuf::from("dist"),
            title: "ACP Protocol".to_string(),
            site_url: "https://acp-protocol.dev".to_string(),
            styles: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self { minify: true }
    }
}

/// Where `acpsite sync` pulls Markdown from and where it goes.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Root of the external Markdown repository
    pub source_dir: PathBuf,
    /// Root index document, relative to `source_dir`
    pub index: Option<PathBuf>,
    /// Remove the content directory before converting
    pub clean: bool,
    pub dirs: Vec<DirMapping>,
    pub chapters: Vec<ChapterMapping>,
    /// Numbered specification chapters, published without their prefix
    pub spec: Option<SpecSettings>,
    /// JSON Schema reference pages
    pub schemas: Option<SchemaSettings>,
    /// `_meta.json` contents keyed by section directory
    pub sections: BTreeMap<String, SectionMeta>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("../../acp-spec"),
            index: None,
            clean: false,
            dirs: Vec::new(),
            chapters: Vec::new(),
            spec: None,
            schemas: None,
            sections: BTreeMap::new(),
        }
    }
}

/// A source directory converted recursively into a content directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DirMapping {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// A single source file placed at an explicit content path.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterMapping {
    pub source: PathBuf,
    pub output: PathBuf,
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
}

/// Chapters directory converted into a specification section with an index.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpecSettings {
    /// Chapters directory, relative to `source_dir`
    pub dir: PathBuf,
    /// Output directory under the content root
    pub output: PathBuf,
    pub title: String,
    pub description: String,
    /// Order of the generated index page
    pub order: i32,
}

impl Default for SpecSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("spec/chapters"),
            output: PathBuf::from("reference/specification"),
            title: "ACP Specification".to_string(),
            description: "Complete ACP Protocol Specification".to_string(),
            order: 1,
        }
    }
}

/// JSON Schemas rendered as reference pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Directory holding `*.schema.json`, relative to `source_dir`
    pub dir: PathBuf,
    /// Output directory under the content root
    pub output: PathBuf,
    /// Where the published schema files can be fetched from
    pub url: String,
    /// Copy the raw schema files here as well
    pub public_dir: Option<PathBuf>,
    /// Order of the generated index page
    pub order: i32,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("schemas/v1"),
            output: PathBuf::from("reference/schemas"),
            url: "https://raw.githubusercontent.com/acp-protocol/acp-spec/main/schemas/v1"
                .to_string(),
            public_dir: None,
            order: 2,
        }
    }
}

impl Config {
    /// Load configuration from `path` if it exists.
    ///
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

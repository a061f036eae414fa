//! Static site build command.

use std::path::PathBuf;

use anyhow::Result;
use acpsite_static::{BuildConfig, StaticBuilder};

use crate::config::Config;

/// Map file configuration onto a build, applying command-line overrides.
fn build_config(config: &Config, output: Option<PathBuf>, minify: Option<bool>) -> BuildConfig {
    BuildConfig {
        content_dir: config.docs.dir.clone(),
        output_dir: output.unwrap_or_else(|| config.docs.output.clone()),
        minify: minify.unwrap_or(config.build.minify),
        site_url: config.docs.site_url.clone(),
        title: config.docs.title.clone(),
        styles: config.docs.styles.clone(),
        theme: config.theme,
    }
}

/// Run the build command.
pub async fn run(config: &Config, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building static site...");

    let result = StaticBuilder::new(build_config(config, output, minify))
        .build()
        .await?;

    tracing::info!("Built {} pages in {}ms", result.pages, result.duration_ms);
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        config.docs.output = PathBuf::from("public");

        let from_file = build_config(&config, None, None);
        assert_eq!(from_file.output_dir, PathBuf::from("public"));
        assert!(from_file.minify);

        let overridden = build_config(&config, Some(PathBuf::from("out")), Some(false));
        assert_eq!(overridden.output_dir, PathBuf::from("out"));
        assert!(!overridden.minify);
        assert_eq!(overridden.content_dir, PathBuf::from("content/docs"));
    }
}

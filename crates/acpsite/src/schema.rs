//! JSON Schema reference pages.

use serde_json::Value;

use acpsite_mdx::{escape_jsx, format_title, render_frontmatter, Frontmatter};

/// Suffix every schema file carries.
pub const SCHEMA_SUFFIX: &str = ".schema.json";

/// Page name for a schema file, `cache-entry.schema.json` becomes `cache-entry`.
pub fn schema_slug(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(SCHEMA_SUFFIX)
        .filter(|slug| !slug.is_empty())
}

/// Display name for a schema slug.
pub fn schema_name(slug: &str) -> String {
    format!("{} Schema", format_title(slug))
}

/// Render one schema as an MDX page.
///
/// The page lists top-level properties in declaration order and ends with the
/// full schema as a JSON block.
pub fn schema_page(slug: &str, schema: &Value, url: &str) -> String {
    let name = schema_name(slug);
    let description = schema.get("description").and_then(Value::as_str);

    let header = render_frontmatter(&Frontmatter {
        title: name.clone(),
        description: Some(
            description
                .map(str::to_string)
                .unwrap_or_else(|| format!("JSON Schema for {}", format_title(slug))),
        ),
        order: None,
    });

    let mut body = vec![format!("# {}", name), String::new()];
    if let Some(description) = description {
        body.push(description.to_string());
        body.push(String::new());
    }

    body.push("## Schema URL".to_string());
    body.push(String::new());
    body.push("```text".to_string());
    body.push(format!("{}/{}{}", url.trim_end_matches('/'), slug, SCHEMA_SUFFIX));
    body.push("```".to_string());
    body.push(String::new());

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        body.push("## Properties".to_string());
        body.push(String::new());
        body.push("| Property | Type | Required | Description |".to_string());
        body.push("|----------|------|----------|-------------|".to_string());

        for (prop, def) in properties {
            let required = if required.contains(&prop.as_str()) { "Yes" } else { "No" };
            let description = def
                .get("description")
                .and_then(Value::as_str)
                .map(table_cell)
                .unwrap_or_else(|| "-".to_string());
            body.push(format!(
                "| `{}` | {} | {} | {} |",
                prop,
                property_type(def),
                required,
                description
            ));
        }
        body.push(String::new());
    }

    // Pretty printing a parsed value cannot fail.
    let pretty = serde_json::to_string_pretty(schema).unwrap_or_default();
    body.push("## Full Schema".to_string());
    body.push(String::new());
    body.push("```json".to_string());
    body.push(pretty);
    body.push("```".to_string());

    format!("{}\n\n{}\n", header, escape_jsx(&body.join("\n")))
}

/// Index page linking every schema page under `section_href`.
pub fn schema_index(slugs: &[String], section_href: &str, url: &str, order: i32) -> String {
    let header = render_frontmatter(&Frontmatter {
        title: "JSON Schemas".to_string(),
        description: Some("ACP JSON Schema definitions for validation".to_string()),
        order: Some(order),
    });

    let mut body = vec![
        "# JSON Schemas".to_string(),
        String::new(),
        "ACP uses JSON Schema for validating configuration and cache files.".to_string(),
        String::new(),
        "## Available Schemas".to_string(),
        String::new(),
    ];
    body.extend(
        slugs
            .iter()
            .map(|slug| format!("- [{}]({}/{})", schema_name(slug), section_href, slug)),
    );

    if let Some(first) = slugs.first() {
        body.push(String::new());
        body.push("## Usage".to_string());
        body.push(String::new());
        body.push("Add schema validation to your files:".to_string());
        body.push(String::new());
        body.push("```json".to_string());
        body.push("{".to_string());
        body.push(format!(
            "  \"$schema\": \"{}/{}{}\"",
            url.trim_end_matches('/'),
            first,
            SCHEMA_SUFFIX
        ));
        body.push("}".to_string());
        body.push("```".to_string());
    }

    format!("{}\n\n{}\n", header, body.join("\n"))
}

fn property_type(def: &Value) -> String {
    match def.get("type") {
        Some(Value::String(ty)) => ty.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        _ if def.get("$ref").is_some() => "object".to_string(),
        _ => "any".to_string(),
    }
}

fn table_cell(text: &str) -> String {
    text.replace('\n', " ").replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const URL: &str = "https://example.com/schemas/v1";

    #[test]
    fn slugs_and_names() {
        assert_eq!(schema_slug("cache.schema.json"), Some("cache"));
        assert_eq!(schema_slug("cache.json"), None);
        assert_eq!(schema_slug(".schema.json"), None);
        assert_eq!(schema_name("sync-config"), "Sync Config Schema");
    }

    #[test]
    fn renders_properties_in_declaration_order() {
        let schema: Value = serde_json::from_str(
            r##"{
                "description": "Cache file format",
                "required": ["version"],
                "properties": {
                    "version": { "type": "string", "description": "Format version" },
                    "files": { "type": ["object", "null"] },
                    "meta": { "$ref": "#/definitions/meta" },
                    "notes": { "description": "Free | form <TEXT>" }
                }
            }"##,
        )
        .unwrap();

        let page = schema_page("cache", &schema, URL);

        assert!(page.starts_with("---\ntitle: Cache Schema\ndescription: Cache file format\n---"));
        assert!(page.contains("# Cache Schema\n\nCache file format\n"));
        assert!(page.contains("```text\nhttps://example.com/schemas/v1/cache.schema.json\n```"));

        let rows: Vec<&str> = page.lines().filter(|l| l.starts_with("| `")).collect();
        assert_eq!(
            rows,
            vec![
                "| `version` | string | Yes | Format version |",
                "| `files` | object or null | No | - |",
                "| `meta` | object | No | - |",
                r"| `notes` | any | No | Free \| form &lt;TEXT&gt; |",
            ]
        );
        assert!(page.contains("## Full Schema\n\n```json\n{\n  \"description\": \"Cache file format\","));
    }

    #[test]
    fn schema_without_properties_or_description() {
        let page = schema_page("config", &json!({ "type": "object" }), URL);

        assert!(page.contains("description: JSON Schema for Config"));
        assert!(!page.contains("## Properties"));
        assert!(page.contains("## Full Schema"));
    }

    #[test]
    fn index_links_every_schema() {
        let slugs = vec!["cache".to_string(), "config".to_string()];

        let index = schema_index(&slugs, "/docs/reference/schemas", URL, 2);

        assert!(index.contains("title: JSON Schemas"));
        assert!(index.contains("order: 2"));
        assert!(index.contains("- [Cache Schema](/docs/reference/schemas/cache)\n- [Config Schema](/docs/reference/schemas/config)"));
        assert!(index.contains(r#""$schema": "https://example.com/schemas/v1/cache.schema.json""#));
    }

    #[test]
    fn empty_index_has_no_usage_block() {
        let index = schema_index(&[], "/docs/reference/schemas", URL, 2);

        assert!(!index.contains("## Usage"));
    }
}

//! Notes report rendering and writing
//!
//! Renders crawl records into the flat "notes" text format: one banner per
//! record with QUERIES, CONTENT, TABLE, and MEMBER blocks, then the module
//! call tree as one JSON object per record. Reports land in the output
//! directory as `<kind>-<sanitized name>.notes`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::crawler::{CrawlRecord, FolderMatches};
use crate::error::Result;

const SECTION_RULE_WIDTH: usize = 100;
const HEADER_STARS: usize = 50;

/// Sanitize a module path into a filename-safe report key: slashes become
/// dashes and the markup extension is dropped
pub fn sanitize_module_name(module_name: &str) -> String {
    module_name.replace('/', "-").replace(".htm", "")
}

/// Render crawl records into notes text. Records render in crawl order,
/// children before their callers, with the module call tree at the end.
pub fn render_notes(records: &[CrawlRecord], include_content: bool) -> Result<String> {
    let mut out = String::new();
    out.push_str(&generated_at());

    for record in records {
        let rule = "-".repeat(SECTION_RULE_WIDTH);
        out.push_str(&format!("{}{}{}\n\n", rule, record.module_name, rule));

        out.push_str(&block_header("QUERIES"));
        for query in &record.queries {
            out.push_str(&format!("\t\t{}\n\n", query));
        }

        if include_content {
            out.push_str(&block_header("CONTENT"));
            out.push_str(&format!("\t\t{}\n\n", record.content));
        }

        for (key, fields) in &record.tables {
            out.push_str(&block_header("TABLE"));
            let table_name = key.strip_prefix("TABLE-").unwrap_or(key);
            out.push_str(&format!("\t\tTable Name: {}\n", table_name));
            match fields {
                Some(fields) => out.push_str(&format!(
                    "\t\tFields: {}\n\n",
                    serde_json::to_string(fields)?
                )),
                None => out.push_str("\t\tFields: (none)\n\n"),
            }
        }

        for (key, value) in &record.members {
            out.push_str(&block_header("MEMBER"));
            let member_name = key.strip_prefix("MEMBER-").unwrap_or(key);
            out.push_str(&format!("\t\t{}: {}\n\n", member_name, value));
        }
    }

    out.push_str(&block_header("MODULE CALL TREE"));
    for record in records {
        let mut tree = serde_json::Map::new();
        tree.insert(
            record.module_name.clone(),
            serde_json::to_value(&record.called_modules)?,
        );
        out.push_str(&serde_json::Value::Object(tree).to_string());
        out.push('\n');
    }

    Ok(out)
}

/// Render folder-scan matches into notes text, one section per folder
pub fn render_scan(outcome: &[FolderMatches]) -> String {
    let mut out = String::new();
    out.push_str(&generated_at());

    for folder_matches in outcome {
        out.push_str(&format!("--- {} ---\n\n", folder_matches.folder));
        for module in &folder_matches.modules {
            out.push_str(&format!("{}\n", module));
        }
        out.push('\n');
    }
    out
}

/// Write a crawl report for one starting module, returning the path
pub async fn write_notes(output_dir: &Path, module_name: &str, contents: &str) -> Result<PathBuf> {
    let path = notes_path(output_dir, "QUERIES", module_name);
    write_report(&path, contents).await?;
    Ok(path)
}

/// Write a folder-scan report for one keyword, returning the path
pub async fn write_scan_notes(output_dir: &Path, keyword: &str, contents: &str) -> Result<PathBuf> {
    let path = notes_path(output_dir, "SCAN", keyword);
    write_report(&path, contents).await?;
    Ok(path)
}

fn generated_at() -> String {
    format!("Generated at {}\n\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))
}

fn block_header(title: &str) -> String {
    let stars = "*".repeat(HEADER_STARS);
    format!("\t\t{} {} {}\n\n\n", stars, title, stars)
}

fn notes_path(output_dir: &Path, kind: &str, name: &str) -> PathBuf {
    output_dir.join(format!("{}-{}.notes", kind, sanitize_module_name(name)))
}

async fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    info!("Wrote report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::api::TableField;

    fn record(module_name: &str, called_modules: Option<Vec<&str>>) -> CrawlRecord {
        CrawlRecord {
            module_name: module_name.to_string(),
            queries: vec!["$LOOKUP(FIRSTNAME)".to_string()],
            content: "<html>$LOOKUP(FIRSTNAME)</html>".to_string(),
            called_modules: called_modules
                .map(|paths| paths.into_iter().map(String::from).collect()),
            tables: BTreeMap::new(),
            members: BTreeMap::new(),
        }
    }

    #[test]
    fn test_sanitize_module_name() {
        assert_eq!(
            sanitize_module_name("/contentlibrary/modules/generic.htm"),
            "-contentlibrary-modules-generic"
        );
        assert_eq!(sanitize_module_name("plain"), "plain");
    }

    #[test]
    fn test_render_notes_lists_queries_and_call_tree() {
        let records = vec![
            record("contentlibrary/modules/contained.htm", None),
            record(
                "/contentlibrary/modules/containing.htm",
                Some(vec!["contentlibrary/modules/contained.htm"]),
            ),
        ];

        let notes = render_notes(&records, true).unwrap();

        assert!(notes.contains(" QUERIES "));
        assert!(notes.contains("\t\t$LOOKUP(FIRSTNAME)\n\n"));
        assert!(notes.contains(" CONTENT "));
        assert!(notes.contains(" MODULE CALL TREE "));
        assert!(notes.contains(r#"{"contentlibrary/modules/contained.htm":null}"#));
        assert!(notes.contains(concat!(
            r#"{"/contentlibrary/modules/containing.htm":"#,
            r#"["contentlibrary/modules/contained.htm"]}"#
        )));
    }

    #[test]
    fn test_render_notes_without_content_omits_the_block() {
        let records = vec![record("contentlibrary/modules/generic.htm", None)];
        let notes = render_notes(&records, false).unwrap();
        assert!(!notes.contains(" CONTENT "));
        assert!(notes.contains(" QUERIES "));
    }

    #[test]
    fn test_render_notes_formats_tables_and_members() {
        let mut rec = record("contentlibrary/modules/contained.htm", None);
        rec.tables.insert(
            "TABLE-ALL_USERS".to_string(),
            Some(vec![TableField {
                field_name: "TITLE".to_string(),
                field_type: "STR500".to_string(),
            }]),
        );
        rec.tables.insert("TABLE-COURSES".to_string(), None);
        rec.members
            .insert("MEMBER-RIID_".to_string(), "John Doe".to_string());

        let notes = render_notes(&[rec], true).unwrap();

        assert!(notes.contains("\t\tTable Name: ALL_USERS\n"));
        assert!(notes.contains(r#"{"fieldName":"TITLE","fieldType":"STR500"}"#));
        assert!(notes.contains("\t\tTable Name: COURSES\n\t\tFields: (none)"));
        assert!(notes.contains("\t\tRIID_: John Doe\n\n"));
    }

    #[test]
    fn test_render_scan_sections_per_folder() {
        let outcome = vec![
            FolderMatches {
                folder: "modules".to_string(),
                modules: vec!["/contentlibrary/modules/welcome.htm".to_string()],
            },
            FolderMatches {
                folder: "shared".to_string(),
                modules: Vec::new(),
            },
        ];

        let notes = render_scan(&outcome);

        assert!(notes.contains("--- modules ---"));
        assert!(notes.contains("/contentlibrary/modules/welcome.htm\n"));
        assert!(notes.contains("--- shared ---"));
    }

    #[tokio::test]
    async fn test_write_notes_creates_the_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_notes(
            dir.path(),
            "/contentlibrary/modules/generic.htm",
            "report body",
        )
        .await
        .unwrap();

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("QUERIES--contentlibrary-modules-generic.notes")
        );
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "report body");
    }

    #[tokio::test]
    async fn test_write_scan_notes_names_the_file_after_the_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_scan_notes(dir.path(), "WISHLIST", "scan body")
            .await
            .unwrap();

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("SCAN-WISHLIST.notes")
        );
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "scan body");
    }
}

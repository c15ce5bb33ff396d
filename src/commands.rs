//! Command implementations shared by CLI and MCP server.

use std::fmt::Write;

use tracing::warn;

use crate::catalog::{Catalog, Record};
use crate::config::{Config, expand_tilde};
use crate::engine::SearchEngine;
use crate::index::Document;
use crate::index::builder::RebuildSummary;
use crate::search::{SearchError, SearchResult};

/// A search engine built from every configured catalog.
pub struct LoadedEngine {
    pub engine: SearchEngine,
    /// `None` when the rebuild published nothing; searches then report the
    /// index as not ready.
    pub summary: Option<RebuildSummary>,
    /// Fields searched when the caller names none.
    pub default_fields: Vec<String>,
    pub default_limit: usize,
}

/// Read every configured catalog and index the records they hold.
///
/// Catalogs are read in configuration order. A catalog that fails to load
/// contributes nothing; missing directories are skipped silently. A rebuild
/// that indexes nothing is logged and leaves the engine without a snapshot.
///
/// # Errors
///
/// Returns an error if no catalog could be loaded while some failed.
pub fn load_engine(config: &Config) -> anyhow::Result<LoadedEngine> {
    let mut records: Vec<Record> = Vec::new();
    let mut loaded = 0;
    let mut errors = Vec::new();

    for path_str in &config.catalog.paths {
        let path = expand_tilde(path_str);

        if !path.exists() {
            continue;
        }

        match Catalog::load(&path) {
            Ok(catalog) => {
                loaded += 1;
                records.extend(catalog.into_records());
            }
            Err(e) => errors.push(format!("Load {}: {e}", path.display())),
        }
    }

    if loaded == 0 && !errors.is_empty() {
        anyhow::bail!("Loading catalogs failed:\n  {}", errors.join("\n  "));
    }

    for error in &errors {
        warn!("{error}");
    }

    let engine = SearchEngine::new(config.engine_config());
    let summary = match engine.rebuild_index(&records) {
        Ok(summary) => Some(summary),
        Err(error) => {
            warn!(%error, "index not published, searches will report not ready");
            None
        }
    };

    Ok(LoadedEngine {
        engine,
        summary,
        default_fields: config.default_fields(),
        default_limit: config.search.limit,
    })
}

impl LoadedEngine {
    /// Search with the configured defaults filling in missing arguments.
    #[must_use]
    pub fn search(&self, pattern: &str, fields: &[String], limit: Option<usize>) -> SearchResult {
        let fields = if fields.is_empty() {
            self.default_fields.as_slice()
        } else {
            fields
        };
        self.engine
            .search(pattern, fields, limit.unwrap_or(self.default_limit))
    }

    /// Every indexed document, in index order.
    #[must_use]
    pub fn documents(&self) -> Vec<Document> {
        self.engine
            .snapshot()
            .map(|index| index.documents().to_vec())
            .unwrap_or_default()
    }

    /// Find the document whose `id` field equals `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Document> {
        let index = self.engine.snapshot()?;
        index
            .documents()
            .iter()
            .find(|doc| doc.get("id") == Some(id))
            .cloned()
    }
}

/// Search all configured catalogs.
///
/// # Errors
///
/// Returns an error if config or catalog loading fails, or if the pattern
/// is rejected as invalid for a reason other than being blank.
pub fn search(
    pattern: &str,
    fields: &[String],
    limit: Option<usize>,
) -> anyhow::Result<SearchResult> {
    let config = Config::load()?;
    let loaded = load_engine(&config)?;
    let result = loaded.search(pattern, fields, limit);

    if let Some(SearchError::InvalidQueryPattern { reason }) = &result.error
        && !pattern.trim().is_empty()
    {
        anyhow::bail!("Invalid query pattern: {reason}");
    }

    Ok(result)
}

/// List every record of all configured catalogs.
///
/// # Errors
///
/// Returns an error if config or catalog loading fails.
pub fn list() -> anyhow::Result<Vec<Document>> {
    let config = Config::load()?;
    Ok(load_engine(&config)?.documents())
}

/// Get a record by the value of its `id` field.
///
/// # Errors
///
/// Returns an error if loading fails or no record has that id.
pub fn get(id: &str) -> anyhow::Result<Document> {
    let config = Config::load()?;
    load_engine(&config)?
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Record not found: {id}"))
}

/// Render a search result for terminal output.
#[must_use]
pub fn format_result(pattern: &str, result: &SearchResult) -> String {
    if !result.is_ready() {
        return "Search index not ready: no records have been indexed".to_string();
    }
    if result.is_empty() {
        return format!("No matches found for '{}'", pattern.trim());
    }

    let mut output = String::new();
    for hit in &result.items {
        let title = hit
            .document
            .get("title")
            .or_else(|| hit.document.get("id"))
            .unwrap_or("Untitled");
        let _ = writeln!(output, "## {title} (score {:.3})", hit.score);
        for fragment in &hit.highlights {
            let _ = writeln!(output, "**{}:** {}", fragment.field, fragment.text);
        }
        output.push('\n');
    }
    let _ = write!(
        output,
        "*{} of {} result(s) shown*",
        result.items.len(),
        result.total_result_count
    );

    output
}

/// Render one document as `field: value` lines.
#[must_use]
pub fn format_document(document: &Document) -> String {
    let mut output = String::new();
    for field in &document.fields {
        let _ = writeln!(output, "{}: {}", field.name, field.value);
    }
    output
}

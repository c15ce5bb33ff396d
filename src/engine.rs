//! Published index snapshots and the two operations the rest of the
//! application calls: [`SearchEngine::rebuild_index`] and
//! [`SearchEngine::search`].
//!
//! Readers clone the current `Arc<InvertedIndex>` and work on it without
//! holding any lock. A rebuild constructs a complete new index off to the
//! side and then swaps the published pointer, so in-flight queries finish on
//! the snapshot they started with and later queries see only the new one.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::analysis::{Analyzer, AnalyzerConfig};
use crate::catalog::Record;
use crate::index::builder::{IndexBuilder, RebuildSummary};
use crate::index::{IndexError, InvertedIndex, Schema};
use crate::query::{PlannerConfig, QueryPlanner};
use crate::search::highlight::{HighlightConfig, Highlighter};
use crate::search::{self, SearchError, SearchResult};

/// Everything the engine needs to tokenize, plan and highlight.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub schema: Schema,
    pub analyzer: AnalyzerConfig,
    pub query: PlannerConfig,
    pub highlight: HighlightConfig,
}

/// In-memory search engine over one published snapshot.
pub struct SearchEngine {
    schema: Schema,
    analyzer: Arc<Analyzer>,
    planner: QueryPlanner,
    highlighter: Highlighter,
    snapshot: RwLock<Option<Arc<InvertedIndex>>>,
    /// Last published generation. Held for the whole rebuild so writers
    /// run one at a time.
    writer: Mutex<u64>,
}

impl SearchEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let analyzer = Arc::new(Analyzer::new(&config.analyzer));
        Self {
            schema: config.schema,
            highlighter: Highlighter::new(Arc::clone(&analyzer), &config.highlight),
            analyzer,
            planner: QueryPlanner::new(config.query),
            snapshot: RwLock::new(None),
            writer: Mutex::new(0),
        }
    }

    /// The currently published snapshot, if any rebuild has succeeded.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<InvertedIndex>> {
        self.snapshot.read().clone()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Replace the published index with one built from `records`.
    ///
    /// Rejected records are reported in the summary and do not stop the
    /// rebuild. An empty batch publishes an empty index.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NothingIndexed` when a non-empty batch yields no
    /// documents at all. The previous snapshot, if any, keeps serving.
    pub fn rebuild_index(&self, records: &[Record]) -> Result<RebuildSummary, IndexError> {
        let mut last_generation = self.writer.lock();
        let generation = *last_generation + 1;

        let output = IndexBuilder::new(&self.analyzer, &self.schema).build(records, generation)?;
        if output.index.is_empty() && !records.is_empty() {
            warn!(
                records = records.len(),
                "rebuild produced no documents, keeping previous snapshot"
            );
            return Err(IndexError::NothingIndexed(records.len()));
        }

        let summary = RebuildSummary {
            generation,
            indexed: output.index.len(),
            rejected: output.rejected,
        };

        *self.snapshot.write() = Some(Arc::new(output.index));
        *last_generation = generation;

        info!(
            generation,
            indexed = summary.indexed,
            rejected = summary.rejected.len(),
            "published index snapshot"
        );

        Ok(summary)
    }

    /// Search `fields` for `pattern` and return at most `top_k` hits.
    ///
    /// Never fails: a missing snapshot or an unusable pattern yields an empty
    /// result with [`SearchResult::error`] set.
    #[must_use]
    pub fn search<S: AsRef<str>>(&self, pattern: &str, fields: &[S], top_k: usize) -> SearchResult {
        let Some(index) = self.snapshot() else {
            return SearchResult::failed(SearchError::IndexUnavailable, None);
        };

        match self.planner.plan(pattern, fields) {
            Ok(query) => search::search(&query, &index, top_k, &self.highlighter),
            Err(error) => SearchResult::failed(error, Some(index.generation())),
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::DEFAULT_TOP_K;

    fn records() -> Vec<Record> {
        vec![
            Record::new()
                .with("id", "1")
                .with("author", "Mark Twain")
                .with("title", "The Adventures of Tom Sawyer"),
            Record::new()
                .with("id", "2")
                .with("author", "Jane Austen")
                .with("title", "Pride and Prejudice"),
        ]
    }

    #[test]
    fn search_before_rebuild_is_not_ready() {
        let engine = SearchEngine::default();
        let result = engine.search("twain", &["author"], DEFAULT_TOP_K);

        assert!(!result.is_ready());
        assert!(result.is_empty());
        assert_eq!(result.error, Some(SearchError::IndexUnavailable));
    }

    #[test]
    fn rebuild_publishes_new_generation() {
        let engine = SearchEngine::default();
        let first = engine.rebuild_index(&records()).unwrap();
        let second = engine.rebuild_index(&records()[..1]).unwrap();

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(engine.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn held_snapshot_survives_rebuild() {
        let engine = SearchEngine::default();
        engine.rebuild_index(&records()).unwrap();
        let old = engine.snapshot().unwrap();

        engine.rebuild_index(&[]).unwrap();

        assert_eq!(old.len(), 2);
        assert_eq!(old.generation(), 1);
        assert!(engine.snapshot().unwrap().is_empty());
    }

    #[test]
    fn failed_rebuild_keeps_previous_snapshot() {
        let engine = SearchEngine::default();
        engine.rebuild_index(&records()).unwrap();

        let broken = vec![Record::new().with("author", "Anonymous")];
        let err = engine.rebuild_index(&broken).unwrap_err();

        assert_eq!(err, IndexError::NothingIndexed(1));
        assert_eq!(engine.snapshot().unwrap().generation(), 1);
        assert_eq!(engine.search("twain", &["author"], 10).total_result_count, 1);
    }

    #[test]
    fn failed_rebuild_does_not_consume_a_generation() {
        let engine = SearchEngine::default();
        let _ = engine.rebuild_index(&[Record::new().with("genre", "x")]);
        let summary = engine.rebuild_index(&records()).unwrap();
        assert_eq!(summary.generation, 1);
    }

    #[test]
    fn invalid_pattern_reports_generation() {
        let engine = SearchEngine::default();
        engine.rebuild_index(&records()).unwrap();

        let result = engine.search("   ", &["author"], DEFAULT_TOP_K);
        assert!(result.is_ready());
        assert!(matches!(
            result.error,
            Some(SearchError::InvalidQueryPattern { .. })
        ));
        assert_eq!(result.generation, Some(1));
    }

    #[test]
    fn empty_field_list_matches_nothing() {
        let engine = SearchEngine::default();
        engine.rebuild_index(&records()).unwrap();

        let fields: [&str; 0] = [];
        let result = engine.search("twain", &fields, DEFAULT_TOP_K);
        assert!(result.is_empty());
        assert!(result.error.is_none());
    }
}

//! Ranked retrieval over an index snapshot.

pub mod highlight;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::index::{DocId, Document, InvertedIndex};
use crate::query::CompositeQuery;
use crate::search::highlight::{HighlightFragment, Highlighter};

/// Number of results returned when the caller does not ask for a limit.
pub const DEFAULT_TOP_K: usize = 20;

/// Query-time problems. These are reported on the [`SearchResult`], never
/// returned as an `Err` from a search.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchError {
    #[error("Index unavailable: no records have been indexed yet")]
    IndexUnavailable,

    #[error("Invalid query pattern: {reason}")]
    InvalidQueryPattern { reason: String },
}

/// A document with its combined score before highlighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f32,
}

/// One ranked result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: f32,
    pub highlights: Vec<HighlightFragment>,
}

/// Ranked results of one query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    pub items: Vec<SearchHit>,
    /// Number of matching documents before truncation to `top_k`.
    pub total_result_count: usize,
    /// Snapshot generation the query ran against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchError>,
}

impl SearchResult {
    /// An empty result carrying the reason it is empty.
    #[must_use]
    pub fn failed(error: SearchError, generation: Option<u64>) -> Self {
        Self {
            generation,
            error: Some(error),
            ..Self::default()
        }
    }

    /// False when no index snapshot was available to answer the query.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !matches!(self.error, Some(SearchError::IndexUnavailable))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sum the contributions of every node per document.
///
/// Nodes are applied in query order, so float summation is reproducible.
#[must_use]
pub fn score(query: &CompositeQuery, index: &InvertedIndex) -> BTreeMap<DocId, f32> {
    let mut scores: BTreeMap<DocId, f32> = BTreeMap::new();
    for node in &query.nodes {
        for (doc_id, contribution) in node.evaluate(index) {
            *scores.entry(doc_id).or_insert(0.0) += contribution;
        }
    }
    scores
}

/// Best `top_k` documents by score, ties broken by ascending id, together
/// with the number of candidates before truncation.
#[must_use]
pub fn rank(query: &CompositeQuery, index: &InvertedIndex, top_k: usize) -> (Vec<ScoredDoc>, usize) {
    let mut ranked: Vec<ScoredDoc> = score(query, index)
        .into_iter()
        .map(|(doc_id, score)| ScoredDoc { doc_id, score })
        .collect();
    let total = ranked.len();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    ranked.truncate(top_k);

    (ranked, total)
}

/// Rank documents and attach per-field highlights.
#[must_use]
pub fn search(
    query: &CompositeQuery,
    index: &InvertedIndex,
    top_k: usize,
    highlighter: &Highlighter,
) -> SearchResult {
    if query.is_empty() {
        return SearchResult {
            generation: Some(index.generation()),
            ..SearchResult::default()
        };
    }

    let (ranked, total) = rank(query, index, top_k);

    let items = ranked
        .into_iter()
        .filter_map(|hit| {
            let document = index.document(hit.doc_id)?;
            Some(SearchHit {
                highlights: highlighter.highlight(document, query),
                document: document.clone(),
                score: hit.score,
            })
        })
        .collect();

    SearchResult {
        items,
        total_result_count: total,
        generation: Some(index.generation()),
        error: None,
    }
}

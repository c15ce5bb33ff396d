//! Query planning and per-node evaluation.
//!
//! A user pattern becomes a [`CompositeQuery`]: an ordered list of
//! [`QueryNode`]s combined with OR semantics. Each node scores documents on
//! its own through [`QueryNode::evaluate`], and the highlighter reuses
//! [`QueryNode::matches`] on re-tokenized text.

pub mod levenshtein;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::normalize;
use crate::index::{DocId, InvertedIndex};
use crate::search::SearchError;

/// Score multiplier applied to exact term matches.
pub const DEFAULT_EXACT_BOOST: f32 = 10.0;

/// Patterns longer than this are rejected.
pub const DEFAULT_MAX_PATTERN_LENGTH: usize = 1000;

/// Scoring weights and fuzzy gating used when planning a query.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub exact_boost: f32,
    pub wildcard_weight: f32,
    pub fuzzy_weight: f32,
    /// Fuzzy nodes are only planned for patterns with at least this many chars.
    pub fuzzy_min_length: usize,
    /// Patterns with at least this many chars allow two edits instead of one.
    pub two_edit_length: usize,
    pub max_pattern_length: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            exact_boost: DEFAULT_EXACT_BOOST,
            wildcard_weight: 1.0,
            fuzzy_weight: 1.0,
            fuzzy_min_length: 5,
            two_edit_length: 8,
            max_pattern_length: DEFAULT_MAX_PATTERN_LENGTH,
        }
    }
}

/// One match strategy restricted to one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryNode {
    /// Some token of the field contains `pattern`.
    Wildcard {
        field: String,
        pattern: String,
        weight: f32,
    },
    /// Some token of the field equals `term`.
    Exact {
        field: String,
        term: String,
        boost: f32,
    },
    /// Some token of the field is within `max_edits` of `term`.
    Fuzzy {
        field: String,
        term: String,
        max_edits: usize,
        weight: f32,
    },
}

impl QueryNode {
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Wildcard { field, .. } | Self::Exact { field, .. } | Self::Fuzzy { field, .. } => {
                field
            }
        }
    }

    /// Score this node gives a single normalized token, if it matches.
    ///
    /// Fuzzy weight shrinks with distance: `weight / (1 + edits)`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn token_weight(&self, token: &str) -> Option<f32> {
        match self {
            Self::Wildcard {
                pattern, weight, ..
            } => token.contains(pattern.as_str()).then_some(*weight),
            Self::Exact { term, boost, .. } => (token == term.as_str()).then_some(*boost),
            Self::Fuzzy {
                term,
                max_edits,
                weight,
                ..
            } => levenshtein::distance_within(term, token, *max_edits)
                .map(|edits| weight / (1.0 + edits as f32)),
        }
    }

    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        self.token_weight(token).is_some()
    }

    /// Score contributions of this node, one per matching document, in id order.
    ///
    /// Exact nodes scale the boost by `sqrt(term_freq)`. Wildcard and fuzzy
    /// nodes scan the field vocabulary and keep the best token per document,
    /// so a field counts once no matter how many of its tokens match.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn evaluate(&self, index: &InvertedIndex) -> Vec<(DocId, f32)> {
        if let Self::Exact { field, term, boost } = self {
            return index
                .postings(field, term)
                .iter()
                .map(|p| (p.doc_id, boost * (p.term_freq as f32).sqrt()))
                .collect();
        }

        let mut best: BTreeMap<DocId, f32> = BTreeMap::new();
        for (token, postings) in index.terms(self.field()) {
            let Some(weight) = self.token_weight(token) else {
                continue;
            };
            for posting in postings {
                let score = best.entry(posting.doc_id).or_insert(0.0);
                if weight > *score {
                    *score = weight;
                }
            }
        }

        best.into_iter().collect()
    }
}

/// OR-combination of query nodes built from one pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeQuery {
    /// Normalized pattern the nodes were planned from.
    pub pattern: String,
    pub nodes: Vec<QueryNode>,
}

impl CompositeQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes restricted to `field`.
    pub fn nodes_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a QueryNode> {
        self.nodes.iter().filter(move |n| n.field() == field)
    }
}

/// Turns a raw pattern and a field list into a [`CompositeQuery`].
#[derive(Debug, Clone, Default)]
pub struct QueryPlanner {
    config: PlannerConfig,
}

impl QueryPlanner {
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Edit distance allowed for a pattern of `len` chars.
    #[must_use]
    pub fn max_edits_for(&self, len: usize) -> usize {
        if len >= self.config.two_edit_length {
            2
        } else {
            1
        }
    }

    /// Boost for exact nodes when `fields` fields are searched.
    ///
    /// A document with no exact hit scores at most one wildcard weight plus
    /// half a fuzzy weight per field, so the configured boost is raised to
    /// that ceiling. An exact hit in any one field then always ranks first.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn exact_boost_for(&self, fields: usize, fuzzy: bool) -> f32 {
        let fuzzy_weight = if fuzzy {
            self.config.fuzzy_weight / 2.0
        } else {
            0.0
        };
        let ceiling = (self.config.wildcard_weight + fuzzy_weight) * fields as f32;
        self.config.exact_boost.max(ceiling)
    }

    /// Plan wildcard and boosted exact nodes for every field, plus fuzzy
    /// nodes when the pattern is long enough.
    ///
    /// Fields are deduplicated keeping first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidQueryPattern` for a blank pattern or one
    /// longer than the configured maximum.
    pub fn plan<S: AsRef<str>>(
        &self,
        pattern: &str,
        fields: &[S],
    ) -> Result<CompositeQuery, SearchError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidQueryPattern {
                reason: "pattern is empty".to_string(),
            });
        }

        let len = trimmed.chars().count();
        if len > self.config.max_pattern_length {
            return Err(SearchError::InvalidQueryPattern {
                reason: format!(
                    "pattern too long: {len} chars (max {})",
                    self.config.max_pattern_length
                ),
            });
        }

        let term = normalize(trimmed);
        let mut unique: Vec<&str> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.contains(&field.as_ref()) {
                unique.push(field.as_ref());
            }
        }

        let fuzzy = len >= self.config.fuzzy_min_length;
        let boost = self.exact_boost_for(unique.len(), fuzzy);

        let mut nodes = Vec::with_capacity(unique.len() * 3);
        nodes.extend(unique.iter().map(|field| QueryNode::Wildcard {
            field: (*field).to_string(),
            pattern: term.clone(),
            weight: self.config.wildcard_weight,
        }));
        nodes.extend(unique.iter().map(|field| QueryNode::Exact {
            field: (*field).to_string(),
            term: term.clone(),
            boost,
        }));
        if fuzzy {
            let max_edits = self.max_edits_for(len);
            nodes.extend(unique.iter().map(|field| QueryNode::Fuzzy {
                field: (*field).to_string(),
                term: term.clone(),
                max_edits,
                weight: self.config.fuzzy_weight,
            }));
        }

        debug!(pattern = %term, nodes = nodes.len(), "planned query");

        Ok(CompositeQuery {
            pattern: term,
            nodes,
        })
    }
}

//! Marks matched tokens inside stored field text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::index::Document;
use crate::query::CompositeQuery;

/// Markers wrapped around each matched token.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub pre_tag: String,
    pub post_tag: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            pre_tag: "<span class=\"highlighted-match\">".to_string(),
            post_tag: "</span>".to_string(),
        }
    }
}

/// The full text of one field with its matched tokens marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightFragment {
    pub field: String,
    pub text: String,
}

/// Re-tokenizes stored fields with the indexing analyzer and marks every
/// token that a query node for that field matches.
#[derive(Debug, Clone)]
pub struct Highlighter {
    analyzer: Arc<Analyzer>,
    pre_tag: String,
    post_tag: String,
}

impl Highlighter {
    #[must_use]
    pub fn new(analyzer: Arc<Analyzer>, config: &HighlightConfig) -> Self {
        Self {
            analyzer,
            pre_tag: config.pre_tag.clone(),
            post_tag: config.post_tag.clone(),
        }
    }

    /// One fragment per stored field with at least one match, in field order.
    ///
    /// The whole field is returned; text outside marked tokens is copied
    /// unchanged.
    #[must_use]
    pub fn highlight(&self, document: &Document, query: &CompositeQuery) -> Vec<HighlightFragment> {
        document
            .fields
            .iter()
            .filter_map(|field| {
                self.highlight_field(&field.name, &field.value, query)
                    .map(|text| HighlightFragment {
                        field: field.name.clone(),
                        text,
                    })
            })
            .collect()
    }

    fn highlight_field(&self, field: &str, value: &str, query: &CompositeQuery) -> Option<String> {
        let nodes: Vec<_> = query.nodes_for(field).collect();
        if nodes.is_empty() {
            return None;
        }

        let mut marked = String::with_capacity(value.len());
        let mut last = 0;
        let mut matched = false;

        for token in self.analyzer.tokenize(value) {
            if !nodes.iter().any(|node| node.matches(&token.text)) {
                continue;
            }
            matched = true;
            marked.push_str(&value[last..token.start]);
            marked.push_str(&self.pre_tag);
            marked.push_str(&value[token.start..token.end]);
            marked.push_str(&self.post_tag);
            last = token.end;
        }

        if !matched {
            return None;
        }
        marked.push_str(&value[last..]);
        Some(marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DocId, StoredField};
    use crate::query::QueryPlanner;

    fn document(fields: &[(&str, &str)]) -> Document {
        Document {
            id: DocId::default(),
            fields: fields
                .iter()
                .map(|(name, value)| StoredField {
                    name: (*name).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        }
    }

    fn highlighter() -> Highlighter {
        Highlighter::new(
            Arc::new(Analyzer::default()),
            &HighlightConfig {
                pre_tag: "[".to_string(),
                post_tag: "]".to_string(),
            },
        )
    }

    #[test]
    fn marks_matches_and_keeps_full_text() {
        let doc = document(&[
            ("title", "The Adventures of Tom Sawyer"),
            ("genre", "Fiction"),
        ]);
        let query = QueryPlanner::default()
            .plan("tom", &["title", "genre"])
            .unwrap();

        let fragments = highlighter().highlight(&doc, &query);
        assert_eq!(
            fragments,
            vec![HighlightFragment {
                field: "title".to_string(),
                text: "The Adventures of [Tom] Sawyer".to_string(),
            }]
        );
    }

    #[test]
    fn wildcard_marks_whole_token() {
        let doc = document(&[("description", "A boy's adventures along the river.")]);
        let query = QueryPlanner::default()
            .plan("venture", &["description"])
            .unwrap();

        let fragments = highlighter().highlight(&doc, &query);
        assert_eq!(fragments[0].text, "A boy's [adventures] along the river.");
    }

    #[test]
    fn fuzzy_marks_near_misses() {
        let doc = document(&[("author", "Jane Austen")]);
        let query = QueryPlanner::default().plan("austin", &["author"]).unwrap();

        let fragments = highlighter().highlight(&doc, &query);
        assert_eq!(fragments[0].text, "Jane [Austen]");
    }

    #[test]
    fn every_matching_token_is_marked_separately() {
        let doc = document(&[("title", "Fiction, fiction and FICTION")]);
        let query = QueryPlanner::default().plan("fiction", &["title"]).unwrap();

        let fragments = highlighter().highlight(&doc, &query);
        assert_eq!(fragments[0].text, "[Fiction], [fiction] and [FICTION]");
    }

    #[test]
    fn fields_outside_the_query_are_skipped() {
        let doc = document(&[("title", "Fiction"), ("genre", "Fiction")]);
        let query = QueryPlanner::default().plan("fiction", &["genre"]).unwrap();

        let fragments = highlighter().highlight(&doc, &query);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].field, "genre");
    }

    #[test]
    fn no_match_means_no_fragment() {
        let doc = document(&[("title", "Emma")]);
        let query = QueryPlanner::default().plan("zebra", &["title"]).unwrap();
        assert!(highlighter().highlight(&doc, &query).is_empty());
    }

    #[test]
    fn default_markup() {
        let doc = document(&[("genre", "Fiction")]);
        let query = QueryPlanner::default().plan("fiction", &["genre"]).unwrap();

        let fragments = Highlighter::new(Arc::new(Analyzer::default()), &HighlightConfig::default())
            .highlight(&doc, &query);
        assert_eq!(
            fragments[0].text,
            "<span class=\"highlighted-match\">Fiction</span>"
        );
    }
}

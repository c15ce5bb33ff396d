//! Inverted index over stored documents.
//!
//! An [`InvertedIndex`] is immutable once built: it is produced by
//! [`builder::IndexBuilder`] and then shared read-only between queries.

pub mod builder;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::Analyzer;

/// Document identifier, unique and stable within one index generation.
pub type DocId = u32;

/// Errors that can occur when building an index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("None of the {0} records could be indexed")]
    NothingIndexed(usize),

    #[error("Too many records for one index: {0}")]
    TooManyRecords(usize),
}

/// A field the index knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Records missing a required field are rejected.
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    #[must_use]
    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
        }
    }

    #[must_use]
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
        }
    }
}

/// Ordered set of indexed fields.
///
/// Stored fields on a [`Document`] follow this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema, keeping the first occurrence of each field name.
    #[must_use]
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let mut unique: Vec<FieldSpec> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.iter().any(|f| f.name == field.name) {
                unique.push(field);
            }
        }
        Self { fields: unique }
    }

    /// The book catalog schema: `id, author, title, genre, description`.
    #[must_use]
    pub fn books() -> Self {
        Self::new(vec![
            FieldSpec::required("id"),
            FieldSpec::optional("author"),
            FieldSpec::required("title"),
            FieldSpec::optional("genre"),
            FieldSpec::optional("description"),
        ])
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::books()
    }
}

/// A field value kept verbatim for display and highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredField {
    pub name: String,
    pub value: String,
}

/// The indexed form of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: DocId,
    pub fields: Vec<StoredField>,
}

impl Document {
    /// Stored text of a field, if the record had it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// One token occurrence count in one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u32,
}

/// Mapping `(field, token) -> postings` plus the stored documents.
///
/// Posting lists are sorted by document id and hold each id at most once.
/// Tokens within a field are kept sorted so vocabulary scans are
/// deterministic.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    generation: u64,
    fields: HashMap<String, BTreeMap<String, Vec<Posting>>>,
    documents: Vec<Document>,
}

impl InvertedIndex {
    #[must_use]
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Publication counter of the snapshot this index belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Postings for an exact normalized token.
    #[must_use]
    pub fn postings(&self, field: &str, token: &str) -> &[Posting] {
        self.fields
            .get(field)
            .and_then(|terms| terms.get(token))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Vocabulary of a field in token order.
    pub fn terms<'a>(&'a self, field: &str) -> impl Iterator<Item = (&'a str, &'a [Posting])> {
        self.fields
            .get(field)
            .into_iter()
            .flat_map(|terms| terms.iter().map(|(t, p)| (t.as_str(), p.as_slice())))
    }

    #[must_use]
    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.documents.get(usize::try_from(id).ok()?)
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Store a document under the next id and index its fields.
    fn add_document(
        &mut self,
        fields: Vec<StoredField>,
        analyzer: &Analyzer,
    ) -> Result<DocId, IndexError> {
        let doc_id = DocId::try_from(self.documents.len())
            .map_err(|_| IndexError::TooManyRecords(self.documents.len()))?;

        for field in &fields {
            let terms = self.fields.entry(field.name.clone()).or_default();
            for token in analyzer.tokenize(&field.value) {
                let postings = terms.entry(token.text).or_default();
                match postings.last_mut() {
                    Some(last) if last.doc_id == doc_id => last.term_freq += 1,
                    _ => postings.push(Posting {
                        doc_id,
                        term_freq: 1,
                    }),
                }
            }
        }

        self.documents.push(Document { id: doc_id, fields });
        Ok(doc_id)
    }
}

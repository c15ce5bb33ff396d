//! Builds an [`InvertedIndex`] from a batch of records.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::analysis::Analyzer;
use crate::catalog::Record;
use crate::index::{IndexError, InvertedIndex, Schema, StoredField};

/// Why a single record was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "field", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("no schema field present")]
    NoFields,
}

/// A record that failed to index. The rest of the batch is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Record {position} rejected: {reason}")]
pub struct RecordRejected {
    /// Position of the record in the input batch.
    pub position: usize,
    pub reason: RejectReason,
}

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub generation: u64,
    pub indexed: usize,
    pub rejected: Vec<RecordRejected>,
}

/// A freshly built index together with the records it skipped.
#[derive(Debug)]
pub struct BuildOutput {
    pub index: InvertedIndex,
    pub rejected: Vec<RecordRejected>,
}

/// Populates an index using one analyzer and schema.
pub struct IndexBuilder<'a> {
    analyzer: &'a Analyzer,
    schema: &'a Schema,
}

impl<'a> IndexBuilder<'a> {
    #[must_use]
    pub fn new(analyzer: &'a Analyzer, schema: &'a Schema) -> Self {
        Self { analyzer, schema }
    }

    /// Index `records` in input order into a new index of the given generation.
    ///
    /// Records that fail validation are collected in [`BuildOutput::rejected`]
    /// and do not consume a document id.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::TooManyRecords` if document ids are exhausted.
    pub fn build(&self, records: &[Record], generation: u64) -> Result<BuildOutput, IndexError> {
        let mut index = InvertedIndex::new(generation);
        let mut rejected = Vec::new();

        for (position, record) in records.iter().enumerate() {
            match self.stored_fields(record) {
                Ok(fields) => {
                    index.add_document(fields, self.analyzer)?;
                }
                Err(reason) => {
                    let rejection = RecordRejected { position, reason };
                    warn!(%rejection, "skipping record");
                    rejected.push(rejection);
                }
            }
        }

        Ok(BuildOutput { index, rejected })
    }

    /// Schema fields of a record in schema order.
    fn stored_fields(&self, record: &Record) -> Result<Vec<StoredField>, RejectReason> {
        let mut fields = Vec::with_capacity(self.schema.fields().len());

        for spec in self.schema.fields() {
            match record.get(&spec.name) {
                Some(value) => fields.push(StoredField {
                    name: spec.name.clone(),
                    value: value.to_string(),
                }),
                None if spec.required => {
                    return Err(RejectReason::MissingField(spec.name.clone()));
                }
                None => {}
            }
        }

        if fields.is_empty() {
            return Err(RejectReason::NoFields);
        }

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FieldSpec;

    fn book(id: &str, author: &str, title: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("author", author)
            .with("title", title)
    }

    #[test]
    fn ids_follow_input_order() {
        let analyzer = Analyzer::default();
        let schema = Schema::books();
        let records = vec![
            book("1", "Mark Twain", "Tom Sawyer"),
            book("2", "Jane Austen", "Emma"),
        ];

        let output = IndexBuilder::new(&analyzer, &schema)
            .build(&records, 1)
            .unwrap();

        assert!(output.rejected.is_empty());
        assert_eq!(output.index.len(), 2);
        assert_eq!(output.index.document(0).unwrap().get("id"), Some("1"));
        assert_eq!(output.index.document(1).unwrap().get("id"), Some("2"));
        assert_eq!(output.index.generation(), 1);
    }

    #[test]
    fn missing_required_field_rejects_only_that_record() {
        let analyzer = Analyzer::default();
        let schema = Schema::books();
        let records = vec![
            book("1", "Mark Twain", "Tom Sawyer"),
            Record::new().with("id", "2").with("author", "Nobody"),
            book("3", "Jane Austen", "Emma"),
        ];

        let output = IndexBuilder::new(&analyzer, &schema)
            .build(&records, 1)
            .unwrap();

        assert_eq!(output.index.len(), 2);
        assert_eq!(
            output.rejected,
            vec![RecordRejected {
                position: 1,
                reason: RejectReason::MissingField("title".to_string()),
            }]
        );
        // ids stay contiguous across the rejected record
        assert_eq!(output.index.document(1).unwrap().get("id"), Some("3"));
    }

    #[test]
    fn record_without_schema_fields_is_rejected() {
        let analyzer = Analyzer::default();
        let schema = Schema::new(vec![FieldSpec::optional("title")]);
        let records = vec![Record::new().with("colour", "blue")];

        let output = IndexBuilder::new(&analyzer, &schema)
            .build(&records, 1)
            .unwrap();

        assert!(output.index.is_empty());
        assert_eq!(output.rejected[0].reason, RejectReason::NoFields);
    }

    #[test]
    fn stored_fields_follow_schema_order() {
        let analyzer = Analyzer::default();
        let schema = Schema::books();
        let record = Record::new()
            .with("title", "Emma")
            .with("genre", "Romance")
            .with("id", "7")
            .with("isbn", "ignored");

        let output = IndexBuilder::new(&analyzer, &schema)
            .build(&[record], 1)
            .unwrap();

        let names: Vec<&str> = output.index.documents()[0]
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "title", "genre"]);
        assert!(output.index.postings("isbn", "ignored").is_empty());
    }

    #[test]
    fn rejection_message_names_the_field() {
        let rejection = RecordRejected {
            position: 4,
            reason: RejectReason::MissingField("id".to_string()),
        };
        assert_eq!(
            rejection.to_string(),
            "Record 4 rejected: missing required field 'id'"
        );
    }
}

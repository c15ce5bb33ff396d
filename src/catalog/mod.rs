//! Source records and catalog file parsing.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the catalog inside a catalog directory.
pub const CATALOG_FILE: &str = "catalog.json";

/// Errors that can occur when loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog not found at {0}")]
    CatalogNotFound(PathBuf),

    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A source record: named text fields, e.g. `id`, `author`, `title`.
///
/// Records are immutable once handed to the index builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// The catalog.json structure listing all records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub version: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

/// A loaded catalog with its root directory.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub root: PathBuf,
    pub file: CatalogFile,
}

impl Catalog {
    /// Load a catalog from a directory containing catalog.json.
    ///
    /// The whole file must parse; a catalog is never loaded partially.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CatalogNotFound` if catalog.json doesn't exist.
    /// Returns `CatalogError::ReadError` if the file cannot be read.
    /// Returns `CatalogError::ParseError` if the JSON is invalid.
    pub fn load(root: &Path) -> Result<Self, CatalogError> {
        let catalog_path = root.join(CATALOG_FILE);

        if !catalog_path.exists() {
            return Err(CatalogError::CatalogNotFound(catalog_path));
        }

        let contents = fs::read_to_string(&catalog_path)?;
        let file: CatalogFile = serde_json::from_str(&contents)?;

        Ok(Self {
            root: root.to_path_buf(),
            file,
        })
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.file.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.file.records
    }
}

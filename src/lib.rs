//! shelfdex - A searchable record catalog.
//!
//! This library builds an in-memory inverted index over multi-field records
//! and answers ranked queries that combine exact, wildcard (substring) and
//! fuzzy (edit distance) matching, with matched tokens highlighted per field.
//!
//! # Modules
//!
//! - [`analysis`] - Tokenizer shared by indexing and highlighting
//! - [`index`] - Inverted index, documents and the index builder
//! - [`query`] - Query nodes and the query planner
//! - [`search`] - Scoring, ranking and highlighting
//! - [`engine`] - Snapshot publication: rebuild and search entry points
//! - [`catalog`] - Record type and catalog.json loading
//! - [`commands`] - High-level operations (search, list, get)
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod index;
pub mod query;
pub mod search;

#[cfg(feature = "mcp")]
pub mod mcp;

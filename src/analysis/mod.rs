//! Text analysis: turns raw field text into normalized tokens.
//!
//! The same [`Analyzer`] instance is used when building the index and when
//! highlighting results, so a token found at index time is found again, at
//! the same offsets, when the stored text is re-tokenized.

use std::collections::HashSet;

use serde::Deserialize;

/// Tokens longer than this are dropped by default.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 255;

/// Tokenization rules shared by indexing and highlighting.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Tokens with more characters than this are skipped.
    #[serde(default = "default_max_token_length")]
    pub max_token_length: usize,
    /// Normalized tokens that are never emitted. Empty by default, so every
    /// token, including English stop words like "the", is indexed.
    #[serde(default)]
    pub stop_words: Vec<String>,
}

fn default_max_token_length() -> usize {
    DEFAULT_MAX_TOKEN_LENGTH
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
            stop_words: Vec::new(),
        }
    }
}

/// A normalized token with its byte span in the original text.
///
/// `start..end` always lies on char boundaries of the analyzed text, so
/// `&text[token.start..token.end]` recovers the exact source substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Lowercasing tokenizer that splits on runs of non-alphanumeric characters.
#[derive(Debug, Clone)]
pub struct Analyzer {
    max_token_length: usize,
    stop_words: HashSet<String>,
}

impl Analyzer {
    #[must_use]
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            max_token_length: config.max_token_length,
            stop_words: config
                .stop_words
                .iter()
                .map(|w| normalize(w))
                .collect(),
        }
    }

    /// Split `text` into normalized tokens, in order of appearance.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        for (pos, c) in text.char_indices() {
            match (c.is_alphanumeric(), start) {
                (true, None) => start = Some(pos),
                (false, Some(s)) => {
                    self.push_token(&mut tokens, text, s, pos);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            self.push_token(&mut tokens, text, s, text.len());
        }

        tokens
    }

    fn push_token(&self, tokens: &mut Vec<Token>, text: &str, start: usize, end: usize) {
        let raw = &text[start..end];
        if raw.chars().count() > self.max_token_length {
            return;
        }

        let normalized = normalize(raw);
        if self.stop_words.contains(&normalized) {
            return;
        }

        tokens.push(Token {
            text: normalized,
            start,
            end,
        });
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

/// Lowercase a term the way the analyzer does.
///
/// Query patterns go through this so that they compare against indexed tokens.
#[must_use]
pub fn normalize(term: &str) -> String {
    term.to_lowercase()
}

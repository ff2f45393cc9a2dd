use serde::{Deserialize, Serialize};

use super::text_normalizer::normalize;

/// A single word as received, paired with its normalized comparison form.
///
/// Distinct raw forms may share a normalized form; equality between words
/// is always decided on `normalized`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub raw: String,
    pub normalized: String,
}

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    /// Whether two tokens compare equal after normalization.
    pub fn matches(&self, other: &Token) -> bool {
        self.normalized == other.normalized
    }
}

/// Splits text on whitespace into tokens, one per raw word.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace().map(Token::new).collect()
}

use super::token::{tokenize, Token};

/// Ordered words produced by the external speech recognizer for one
/// recitation. May be empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    tokens: Vec<Token>,
}

impl Transcript {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Builds a transcript from pre-split recognizer words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: words.into_iter().map(Token::new).collect(),
        }
    }

    /// Builds a transcript from recognizer output text, splitting on whitespace.
    pub fn from_text(text: &str) -> Self {
        Self {
            tokens: tokenize(text),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

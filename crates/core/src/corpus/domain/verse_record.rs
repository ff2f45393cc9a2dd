use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::domain::token::Token;

/// Chapter/verse address. Ordering is the recitation ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerseRef {
    pub chapter: u16,
    pub verse: u16,
}

impl VerseRef {
    pub fn new(chapter: u16, verse: u16) -> Self {
        Self { chapter, verse }
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

/// One canonical verse with its words in recitation order.
#[derive(Clone, Debug, PartialEq)]
pub struct VerseRecord {
    reference: VerseRef,
    tokens: Vec<Token>,
}

impl VerseRecord {
    pub(crate) fn new(reference: VerseRef, tokens: Vec<Token>) -> Self {
        Self { reference, tokens }
    }

    pub fn reference(&self) -> VerseRef {
        self.reference
    }

    pub fn chapter(&self) -> u16 {
        self.reference.chapter
    }

    pub fn verse(&self) -> u16 {
        self.reference.verse
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The verse as written in the corpus, words joined by single spaces.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.raw.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn normalized_text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.normalized.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::domain::token::tokenize;

    #[test]
    fn test_verse_ref_orders_by_chapter_then_verse() {
        assert!(VerseRef::new(1, 7) < VerseRef::new(2, 1));
        assert!(VerseRef::new(2, 1) < VerseRef::new(2, 2));
    }

    #[test]
    fn test_verse_ref_display() {
        assert_eq!(VerseRef::new(112, 4).to_string(), "112:4");
    }

    #[test]
    fn test_text_joins_raw_words() {
        let record = VerseRecord::new(VerseRef::new(1, 4), tokenize("مَٰلِكِ يَوْمِ ٱلدِّينِ"));
        assert_eq!(record.text(), "مَٰلِكِ يَوْمِ ٱلدِّينِ");
        assert_eq!(record.normalized_text(), "مالك يوم الدين");
    }
}

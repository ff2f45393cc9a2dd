use std::collections::BTreeMap;

use super::verse_record::VerseRef;

/// Unvalidated reference text as delivered by a [`CorpusSource`].
///
/// [`CorpusSource`]: super::corpus_source::CorpusSource
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawCorpus {
    verses: BTreeMap<VerseRef, Vec<String>>,
    chapter_names: BTreeMap<u16, String>,
    /// Addresses that were inserted more than once, in insertion order.
    duplicates: Vec<VerseRef>,
}

impl RawCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a verse. A second verse at the same address keeps the first text,
    /// is recorded as a duplicate and returns `false`.
    pub fn insert_verse<I, S>(&mut self, chapter: u16, verse: u16, words: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reference = VerseRef::new(chapter, verse);
        if self.verses.contains_key(&reference) {
            self.duplicates.push(reference);
            return false;
        }
        self.verses
            .insert(reference, words.into_iter().map(Into::into).collect());
        true
    }

    /// Adds a verse from running text, splitting words on whitespace.
    pub fn insert_verse_text(&mut self, chapter: u16, verse: u16, text: &str) -> bool {
        self.insert_verse(chapter, verse, text.split_whitespace())
    }

    pub fn set_chapter_name(&mut self, chapter: u16, name: impl Into<String>) {
        self.chapter_names.insert(chapter, name.into());
    }

    pub fn verses(&self) -> &BTreeMap<VerseRef, Vec<String>> {
        &self.verses
    }

    pub fn chapter_names(&self) -> &BTreeMap<u16, String> {
        &self.chapter_names
    }

    pub fn words(&self, chapter: u16, verse: u16) -> Option<&[String]> {
        self.verses
            .get(&VerseRef::new(chapter, verse))
            .map(|w| w.as_slice())
    }

    pub fn duplicates(&self) -> &[VerseRef] {
        &self.duplicates
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}

use std::collections::BTreeMap;
use std::ops::Range;

use super::corpus_error::{CorpusError, VerseNotFound};
use super::raw_corpus::RawCorpus;
use super::verse_record::{VerseRecord, VerseRef};
use crate::shared::constants::CHAPTER_COUNT;
use crate::text::domain::text_normalizer::normalize;
use crate::text::domain::token::Token;

/// One position in the flattened corpus token stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamEntry {
    /// Index into the index's record list.
    pub record: usize,
    /// Word offset within that record.
    pub offset: usize,
}

/// Summary of one chapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterInfo {
    pub number: u16,
    pub name: Option<String>,
    pub verse_count: u16,
}

/// Immutable, validated view of the whole corpus.
///
/// Records are stored in ordinal order, so `(chapter, verse)` resolves to a
/// record with two array reads. The flattened token stream is produced once
/// here and shared by every search.
#[derive(Debug)]
pub struct VerseIndex {
    records: Vec<VerseRecord>,
    /// First record index of each chapter; `chapter_starts[c - 1]`.
    chapter_starts: Vec<usize>,
    chapter_names: BTreeMap<u16, String>,
    stream: Vec<StreamEntry>,
    /// Stream range of each chapter; `chapter_spans[c - 1]`.
    chapter_spans: Vec<Range<usize>>,
}

impl VerseIndex {
    /// Validates and indexes a raw corpus.
    ///
    /// Chapters must be numbered contiguously from 1 (a prefix of the full
    /// book is accepted), verses contiguously from 1 within each chapter, and
    /// no address may appear twice. Words that normalize to nothing (stand-alone
    /// pause marks) are dropped; a verse left without words is an error.
    pub fn build(corpus: &RawCorpus) -> Result<Self, CorpusError> {
        if corpus.is_empty() {
            return Err(CorpusError::Empty);
        }
        if let Some(&VerseRef { chapter, verse }) = corpus.duplicates().first() {
            return Err(CorpusError::DuplicateVerse { chapter, verse });
        }

        let mut records: Vec<VerseRecord> = Vec::with_capacity(corpus.verses().len());
        let mut chapter_starts: Vec<usize> = Vec::new();
        let mut expected_verse: u16 = 1;

        for (&reference, words) in corpus.verses() {
            let VerseRef { chapter, verse } = reference;
            if chapter == 0 || chapter > CHAPTER_COUNT {
                return Err(CorpusError::ChapterOutOfRange {
                    chapter,
                    max: CHAPTER_COUNT,
                });
            }
            let current_chapter = chapter_starts.len() as u16;
            if chapter != current_chapter {
                // Keys arrive in ordinal order, so anything but the next chapter is a gap.
                if chapter != current_chapter + 1 {
                    return Err(CorpusError::MissingChapter {
                        chapter: current_chapter + 1,
                    });
                }
                chapter_starts.push(records.len());
                expected_verse = 1;
            }
            if verse != expected_verse {
                return Err(CorpusError::NonContiguousVerse {
                    chapter,
                    expected: expected_verse,
                    found: verse,
                });
            }
            // Pause and annotation marks written as separate words can never be recited.
            let tokens: Vec<Token> = words
                .iter()
                .map(|w| Token::new(w.trim()))
                .filter(|t| !t.normalized.is_empty())
                .collect();
            if tokens.is_empty() {
                return Err(CorpusError::EmptyVerse { chapter, verse });
            }
            records.push(VerseRecord::new(reference, tokens));
            expected_verse += 1;
        }

        let (stream, chapter_spans) = flatten(&records, &chapter_starts);

        log::info!(
            "Indexed {} chapters, {} verses, {} words",
            chapter_starts.len(),
            records.len(),
            stream.len()
        );

        Ok(Self {
            records,
            chapter_starts,
            chapter_names: corpus.chapter_names().clone(),
            stream,
            chapter_spans,
        })
    }

    pub fn lookup(&self, chapter: u16, verse: u16) -> Result<&VerseRecord, VerseNotFound> {
        self.record_index(chapter, verse).map(|i| &self.records[i])
    }

    /// Consecutive verses `first..=last` of one chapter.
    pub fn lookup_range(
        &self,
        chapter: u16,
        first: u16,
        last: u16,
    ) -> Result<&[VerseRecord], VerseNotFound> {
        let start = self.record_index(chapter, first)?;
        if last < first {
            return Err(VerseNotFound {
                chapter,
                verse: last,
            });
        }
        let end = self.record_index(chapter, last)?;
        Ok(&self.records[start..=end])
    }

    pub fn records(&self) -> &[VerseRecord] {
        &self.records
    }

    /// Every corpus word in recitation order, with back-references.
    pub fn flattened_stream(&self) -> &[StreamEntry] {
        &self.stream
    }

    /// Normalized word at a stream position.
    pub fn stream_token(&self, position: usize) -> &str {
        let entry = self.stream[position];
        &self.records[entry.record].tokens()[entry.offset].normalized
    }

    /// Stream range covered by a chapter, or `None` if out of range.
    pub fn chapter_span(&self, chapter: u16) -> Option<Range<usize>> {
        if chapter == 0 {
            return None;
        }
        self.chapter_spans.get(chapter as usize - 1).cloned()
    }

    pub fn chapter_count(&self) -> u16 {
        self.chapter_starts.len() as u16
    }

    pub fn verse_count(&self, chapter: u16) -> Option<u16> {
        self.chapter_records(chapter).map(|r| r.len() as u16)
    }

    pub fn chapter_name(&self, chapter: u16) -> Option<&str> {
        self.chapter_names.get(&chapter).map(|s| s.as_str())
    }

    pub fn chapters(&self) -> Vec<ChapterInfo> {
        (1..=self.chapter_count())
            .map(|number| ChapterInfo {
                number,
                name: self.chapter_name(number).map(str::to_string),
                verse_count: self.verse_count(number).unwrap_or(0),
            })
            .collect()
    }

    /// Verses whose normalized text contains the normalized query.
    pub fn search_text(&self, query: &str) -> Vec<VerseRef> {
        let needle = normalize(query);
        if needle.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|r| r.normalized_text().contains(&needle))
            .map(|r| r.reference())
            .collect()
    }

    fn chapter_records(&self, chapter: u16) -> Option<Range<usize>> {
        if chapter == 0 || chapter as usize > self.chapter_starts.len() {
            return None;
        }
        let start = self.chapter_starts[chapter as usize - 1];
        let end = self
            .chapter_starts
            .get(chapter as usize)
            .copied()
            .unwrap_or(self.records.len());
        Some(start..end)
    }

    fn record_index(&self, chapter: u16, verse: u16) -> Result<usize, VerseNotFound> {
        let not_found = VerseNotFound { chapter, verse };
        let range = self.chapter_records(chapter).ok_or(not_found)?;
        if verse == 0 || verse as usize > range.len() {
            return Err(not_found);
        }
        Ok(range.start + verse as usize - 1)
    }
}

fn flatten(
    records: &[VerseRecord],
    chapter_starts: &[usize],
) -> (Vec<StreamEntry>, Vec<Range<usize>>) {
    let total: usize = records.iter().map(|r| r.tokens().len()).sum();
    let mut stream = Vec::with_capacity(total);
    let mut spans = Vec::with_capacity(chapter_starts.len());

    for (i, &start) in chapter_starts.iter().enumerate() {
        let end = chapter_starts.get(i + 1).copied().unwrap_or(records.len());
        let span_start = stream.len();
        for (record, verse) in records.iter().enumerate().take(end).skip(start) {
            for offset in 0..verse.tokens().len() {
                stream.push(StreamEntry { record, offset });
            }
        }
        spans.push(span_start..stream.len());
    }

    (stream, spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fatiha() -> RawCorpus {
        let mut corpus = RawCorpus::new();
        corpus.set_chapter_name(1, "Al-Fatiha");
        corpus.insert_verse_text(1, 1, "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ");
        corpus.insert_verse_text(1, 2, "ٱلْحَمْدُ لِلَّهِ رَبِّ ٱلْعَٰلَمِينَ");
        corpus.insert_verse_text(1, 3, "ٱلرَّحْمَٰنِ ٱلرَّحِيمِ");
        corpus.insert_verse_text(2, 1, "الم");
        corpus.insert_verse_text(2, 2, "ذلك الكتاب لا ريب فيه هدى للمتقين");
        corpus
    }

    fn index() -> VerseIndex {
        VerseIndex::build(&fatiha()).unwrap()
    }

    // ── Build validation ──────────────────────────────────────────────

    #[test]
    fn test_build_rejects_empty_corpus() {
        assert_eq!(
            VerseIndex::build(&RawCorpus::new()).unwrap_err(),
            CorpusError::Empty
        );
    }

    #[test]
    fn test_build_rejects_missing_first_chapter() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(2, 1, "الم");
        assert_eq!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::MissingChapter { chapter: 1 }
        );
    }

    #[test]
    fn test_build_rejects_chapter_gap() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(1, 1, "a");
        corpus.insert_verse_text(3, 1, "b");
        assert_eq!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::MissingChapter { chapter: 2 }
        );
    }

    #[test]
    fn test_build_rejects_chapter_beyond_last() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(115, 1, "a");
        assert_eq!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::ChapterOutOfRange {
                chapter: 115,
                max: CHAPTER_COUNT
            }
        );
    }

    #[test]
    fn test_build_rejects_chapter_zero() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(0, 1, "a");
        assert!(matches!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::ChapterOutOfRange { chapter: 0, .. }
        ));
    }

    #[test]
    fn test_build_rejects_verse_gap() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(1, 1, "a");
        corpus.insert_verse_text(1, 3, "c");
        assert_eq!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::NonContiguousVerse {
                chapter: 1,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_build_rejects_verse_not_starting_at_one() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(1, 2, "a");
        assert_eq!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::NonContiguousVerse {
                chapter: 1,
                expected: 1,
                found: 2
            }
        );
    }

    #[rstest]
    #[case::no_words(Vec::<&str>::new())]
    #[case::blank_words(vec!["  ", ""])]
    #[case::pause_marks_only(vec!["\u{06DB}", "\u{06D6}"])]
    fn test_build_rejects_empty_verse(#[case] words: Vec<&str>) {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(1, 1, "a");
        corpus.insert_verse(1, 2, words);
        assert_eq!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::EmptyVerse {
                chapter: 1,
                verse: 2
            }
        );
    }

    #[test]
    fn test_build_rejects_duplicate_address() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(1, 1, "a b c");
        corpus.insert_verse_text(1, 1, "x");
        corpus.insert_verse_text(1, 2, "d");
        assert_eq!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::DuplicateVerse {
                chapter: 1,
                verse: 1
            }
        );
    }

    #[test]
    fn test_build_drops_standalone_pause_marks() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(1, 1, "الم");
        corpus.insert_verse_text(
            1,
            2,
            "ذَٰلِكَ ٱلْكِتَٰبُ لَا رَيْبَ ۛ فِيهِ ۛ هُدًى لِّلْمُتَّقِينَ",
        );
        let index = VerseIndex::build(&corpus).unwrap();
        let record = index.lookup(1, 2).unwrap();
        assert_eq!(record.tokens().len(), 7);
        assert!(record.tokens().iter().all(|t| !t.normalized.is_empty()));
        assert_eq!(index.flattened_stream().len(), 8);
    }

    // ── Lookup ────────────────────────────────────────────────────────

    #[test]
    fn test_lookup_token_count_matches_corpus() {
        let corpus = fatiha();
        let index = VerseIndex::build(&corpus).unwrap();
        for (reference, words) in corpus.verses() {
            let record = index.lookup(reference.chapter, reference.verse).unwrap();
            assert_eq!(record.reference(), *reference);
            assert_eq!(record.tokens().len(), words.len());
        }
    }

    #[test]
    fn test_lookup_normalizes_tokens() {
        let index = index();
        let record = index.lookup(1, 2).unwrap();
        let normalized: Vec<&str> = record.tokens().iter().map(|t| t.normalized.as_str()).collect();
        assert_eq!(normalized, vec!["الحمد", "لله", "رب", "العلمين"]);
    }

    #[rstest]
    #[case::chapter_zero(0, 1)]
    #[case::verse_zero(1, 0)]
    #[case::verse_past_end(1, 4)]
    #[case::chapter_past_corpus(3, 1)]
    #[case::chapter_past_book(115, 1)]
    fn test_lookup_out_of_range(#[case] chapter: u16, #[case] verse: u16) {
        let err = index().lookup(chapter, verse).unwrap_err();
        assert_eq!(err, VerseNotFound { chapter, verse });
    }

    #[test]
    fn test_lookup_range_returns_consecutive_verses() {
        let index = index();
        let records = index.lookup_range(1, 2, 3).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].reference(), VerseRef::new(1, 2));
        assert_eq!(records[1].reference(), VerseRef::new(1, 3));
    }

    #[test]
    fn test_lookup_range_rejects_reversed_and_overflow() {
        let index = index();
        assert!(index.lookup_range(1, 3, 2).is_err());
        assert!(index.lookup_range(1, 2, 9).is_err());
    }

    // ── Flattened stream ──────────────────────────────────────────────

    #[test]
    fn test_stream_covers_every_word_in_order() {
        let index = index();
        let stream = index.flattened_stream();
        assert_eq!(stream.len(), 4 + 4 + 2 + 1 + 7);
        assert_eq!(stream[0], StreamEntry { record: 0, offset: 0 });
        assert_eq!(stream[4], StreamEntry { record: 1, offset: 0 });
        assert_eq!(index.stream_token(4), "الحمد");
        assert_eq!(index.stream_token(10), "الم");
    }

    #[test]
    fn test_chapter_spans_partition_stream() {
        let index = index();
        assert_eq!(index.chapter_span(1), Some(0..10));
        assert_eq!(index.chapter_span(2), Some(10..18));
        assert_eq!(index.chapter_span(0), None);
        assert_eq!(index.chapter_span(3), None);
    }

    // ── Chapters and search ───────────────────────────────────────────

    #[test]
    fn test_chapters_summary() {
        let chapters = index().chapters();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].name.as_deref(), Some("Al-Fatiha"));
        assert_eq!(chapters[0].verse_count, 3);
        assert_eq!(chapters[1].name, None);
        assert_eq!(chapters[1].verse_count, 2);
    }

    #[test]
    fn test_search_text_finds_all_occurrences() {
        let hits = index().search_text("الرَّحْمَٰنِ الرحيم");
        assert_eq!(hits, vec![VerseRef::new(1, 1), VerseRef::new(1, 3)]);
    }

    #[test]
    fn test_search_text_empty_query() {
        assert!(index().search_text(" ، ").is_empty());
    }
}

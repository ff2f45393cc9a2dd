use std::sync::Arc;

use thiserror::Error;

use crate::corpus::domain::corpus_error::VerseNotFound;
use crate::corpus::domain::verse_index::VerseIndex;
use crate::matching::domain::alignment_engine::align;
use crate::matching::domain::match_report::{MatchReport, VerseSpan};
use crate::matching::domain::mistake_classifier::classify;
use crate::matching::domain::verse_locator::{Location, VerseLocator};
use crate::text::domain::token::Token;
use crate::text::domain::transcript::Transcript;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error(transparent)]
    NotFound(#[from] VerseNotFound),
    #[error("transcript was not matched: its worker stopped")]
    Interrupted,
}

/// Caller-chosen verse, or verse range when `to_verse` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseTarget {
    pub chapter: u16,
    pub verse: u16,
    pub to_verse: Option<u16>,
}

impl VerseTarget {
    pub fn single(chapter: u16, verse: u16) -> Self {
        Self {
            chapter,
            verse,
            to_verse: None,
        }
    }

    pub fn span(&self) -> VerseSpan {
        VerseSpan {
            chapter: self.chapter,
            first_verse: self.verse,
            last_verse: self.to_verse.unwrap_or(self.verse),
        }
    }
}

/// Transcript in, report out: locate → align → classify.
///
/// Holds only read-only state, so one instance can serve any number of
/// threads.
pub struct LocateAndAlignUseCase {
    index: Arc<VerseIndex>,
    locator: VerseLocator,
}

impl LocateAndAlignUseCase {
    pub fn new(index: Arc<VerseIndex>, locator: VerseLocator) -> Self {
        Self { index, locator }
    }

    pub fn index(&self) -> &VerseIndex {
        &self.index
    }

    pub fn execute(
        &self,
        transcript: &Transcript,
        target: Option<VerseTarget>,
    ) -> Result<MatchReport, MatchError> {
        let location = match target {
            Some(target) => self.locator.locate_targeted(&self.index, target.span())?,
            None => self.locator.search(&self.index, transcript.tokens()),
        };

        let (span, score, verses) = match location {
            Location::Found {
                span,
                score,
                verses,
            } => (span, score, verses),
            Location::Unresolved { best_score } => {
                log::debug!("No verse above threshold (best overlap {best_score:.3})");
                return Ok(MatchReport::unresolved(best_score));
            }
        };

        // Multi-verse spans align against the concatenated canonical text.
        let canonical: Vec<Token> = verses
            .iter()
            .flat_map(|v| v.tokens().iter().cloned())
            .collect();
        let alignment = align(&canonical, transcript.tokens());
        let classification = classify(&alignment, &canonical, transcript.tokens());
        Ok(MatchReport::resolved(span, score, alignment, classification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::domain::raw_corpus::RawCorpus;
    use crate::matching::domain::match_report::MatchedVerse;
    use crate::matching::domain::mistake_classifier::WordStatus;
    use crate::matching::domain::verse_locator::LocatorConfig;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn use_case() -> LocateAndAlignUseCase {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(1, 1, "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ");
        corpus.insert_verse_text(1, 2, "الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ");
        corpus.insert_verse_text(1, 3, "الرَّحْمَٰنِ الرَّحِيمِ");
        corpus.insert_verse_text(1, 4, "مَالِكِ يَوْمِ الدِّينِ");
        corpus.insert_verse_text(2, 1, "الم");
        corpus.insert_verse_text(2, 2, "ذَٰلِكَ الْكِتَابُ لَا رَيْبَ فِيهِ");
        let index = VerseIndex::build(&corpus).unwrap();
        LocateAndAlignUseCase::new(Arc::new(index), VerseLocator::default())
    }

    #[test]
    fn test_open_search_perfect_recitation() {
        let uc = use_case();
        let report = uc
            .execute(&Transcript::from_text("الحمد لله رب العالمين"), None)
            .unwrap();
        assert_eq!(report.verse(), MatchedVerse::Resolved(VerseSpan::single(1, 2)));
        assert_relative_eq!(report.accuracy(), 1.0);
        assert_eq!(report.count(WordStatus::Correct), 4);
        assert_eq!(report.summary().to_string(), "Surah 1:Ayah 2 | Accuracy: 100.0%");
    }

    #[test]
    fn test_targeted_reports_missed_word() {
        let uc = use_case();
        let report = uc
            .execute(
                &Transcript::from_text("الحمد لله العالمين"),
                Some(VerseTarget::single(1, 2)),
            )
            .unwrap();
        assert_relative_eq!(report.score(), 1.0);
        assert_relative_eq!(report.accuracy(), 0.75);
        assert_eq!(report.count(WordStatus::Missed), 1);
        let missed = report
            .word_statuses()
            .iter()
            .find(|w| w.status == WordStatus::Missed)
            .unwrap();
        assert_eq!(missed.token.normalized, "رب");
    }

    #[test]
    fn test_pause_marks_are_not_reported_missed() {
        let mut corpus = RawCorpus::new();
        corpus.insert_verse_text(1, 1, "الم");
        corpus.insert_verse_text(
            1,
            2,
            "ذَٰلِكَ ٱلْكِتَٰبُ لَا رَيْبَ ۛ فِيهِ ۛ هُدًى لِّلْمُتَّقِينَ",
        );
        let index = VerseIndex::build(&corpus).unwrap();
        let uc = LocateAndAlignUseCase::new(Arc::new(index), VerseLocator::default());

        let report = uc
            .execute(
                &Transcript::from_text("ذلك الكتب لا ريب فيه هدى للمتقين"),
                Some(VerseTarget::single(1, 2)),
            )
            .unwrap();
        assert_relative_eq!(report.accuracy(), 1.0);
        assert_eq!(report.count(WordStatus::Correct), 7);
        assert_eq!(report.count(WordStatus::Missed), 0);
    }

    #[test]
    fn test_targeted_empty_transcript_all_missed() {
        let uc = use_case();
        let report = uc
            .execute(&Transcript::default(), Some(VerseTarget::single(1, 4)))
            .unwrap();
        assert_eq!(report.count(WordStatus::Missed), 3);
        assert_relative_eq!(report.accuracy(), 0.0);
    }

    #[test]
    fn test_targeted_range_concatenates_verses() {
        let uc = use_case();
        let target = VerseTarget {
            chapter: 1,
            verse: 3,
            to_verse: Some(4),
        };
        let report = uc
            .execute(
                &Transcript::from_text("الرحمن الرحيم مالك يوم الدين"),
                Some(target),
            )
            .unwrap();
        assert_eq!(report.verse().span().unwrap().to_string(), "1:3-4");
        assert_eq!(report.word_statuses().len(), 5);
        assert_relative_eq!(report.accuracy(), 1.0);
    }

    #[rstest]
    #[case::chapter_past_end(3, 1)]
    #[case::verse_past_end(1, 8)]
    #[case::verse_zero(1, 0)]
    fn test_targeted_out_of_range(#[case] chapter: u16, #[case] verse: u16) {
        let uc = use_case();
        let err = uc
            .execute(
                &Transcript::from_text("الم"),
                Some(VerseTarget::single(chapter, verse)),
            )
            .unwrap_err();
        assert_eq!(err, MatchError::NotFound(VerseNotFound { chapter, verse }));
    }

    #[test]
    fn test_unresolved_is_a_report_not_an_error() {
        let uc = use_case();
        let report = uc
            .execute(&Transcript::from_text("hello world again"), None)
            .unwrap();
        assert_eq!(report.verse(), MatchedVerse::Unresolved);
        assert!(report.word_statuses().is_empty());
        assert_relative_eq!(report.accuracy(), 0.0);
    }

    #[test]
    fn test_custom_locator_threshold() {
        let index = use_case().index;
        let strict = VerseLocator::new(LocatorConfig {
            min_overlap: 1.0,
            ..LocatorConfig::default()
        })
        .unwrap();
        let uc = LocateAndAlignUseCase::new(index, strict);
        let report = uc
            .execute(&Transcript::from_text("الحمد لله العالمين"), None)
            .unwrap();
        assert!(!report.verse().is_resolved());
    }

    #[test]
    fn test_use_case_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LocateAndAlignUseCase>();
    }
}

use std::fmt;

use serde::Serialize;

use super::alignment_engine::AlignmentResult;
use super::mistake_classifier::{Classification, WordReport, WordStatus};

/// Consecutive verses of one chapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct VerseSpan {
    pub chapter: u16,
    pub first_verse: u16,
    pub last_verse: u16,
}

impl VerseSpan {
    pub fn single(chapter: u16, verse: u16) -> Self {
        Self {
            chapter,
            first_verse: verse,
            last_verse: verse,
        }
    }

    pub fn is_single(&self) -> bool {
        self.first_verse == self.last_verse
    }
}

impl fmt::Display for VerseSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}:{}", self.chapter, self.first_verse)
        } else {
            write!(f, "{}:{}-{}", self.chapter, self.first_verse, self.last_verse)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MatchedVerse {
    Resolved(VerseSpan),
    /// No candidate cleared the confidence threshold.
    Unresolved,
}

impl MatchedVerse {
    pub fn span(&self) -> Option<VerseSpan> {
        match self {
            MatchedVerse::Resolved(span) => Some(*span),
            MatchedVerse::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, MatchedVerse::Resolved(_))
    }
}

/// Export row for one reported word.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordRecord {
    pub word: String,
    pub status: WordStatus,
    pub position: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReportSummary {
    pub verse: MatchedVerse,
    pub accuracy: f64,
    pub accuracy_pct: f64,
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verse {
            MatchedVerse::Resolved(span) => {
                let ayah = if span.is_single() {
                    span.first_verse.to_string()
                } else {
                    format!("{}-{}", span.first_verse, span.last_verse)
                };
                write!(
                    f,
                    "Surah {}:Ayah {} | Accuracy: {:.1}%",
                    span.chapter, ayah, self.accuracy_pct
                )
            }
            MatchedVerse::Unresolved => write!(f, "No verse match found."),
        }
    }
}

/// Result of one locate-and-align request. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchReport {
    verse: MatchedVerse,
    score: f64,
    alignment: AlignmentResult,
    word_statuses: Vec<WordReport>,
    accuracy: f64,
}

impl MatchReport {
    pub fn resolved(
        span: VerseSpan,
        score: f64,
        alignment: AlignmentResult,
        classification: Classification,
    ) -> Self {
        Self {
            verse: MatchedVerse::Resolved(span),
            score,
            alignment,
            word_statuses: classification.word_statuses,
            accuracy: classification.accuracy,
        }
    }

    /// `best_score` is the highest overlap seen, kept for diagnostics.
    pub fn unresolved(best_score: f64) -> Self {
        Self {
            verse: MatchedVerse::Unresolved,
            score: best_score,
            alignment: AlignmentResult::default(),
            word_statuses: Vec::new(),
            accuracy: 0.0,
        }
    }

    pub fn verse(&self) -> MatchedVerse {
        self.verse
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn alignment(&self) -> &AlignmentResult {
        &self.alignment
    }

    pub fn word_statuses(&self) -> &[WordReport] {
        &self.word_statuses
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Accuracy as a percentage rounded to one decimal.
    pub fn accuracy_pct(&self) -> f64 {
        (self.accuracy * 1000.0).round() / 10.0
    }

    pub fn count(&self, status: WordStatus) -> usize {
        self.word_statuses
            .iter()
            .filter(|w| w.status == status)
            .count()
    }

    pub fn records(&self) -> Vec<WordRecord> {
        self.word_statuses
            .iter()
            .enumerate()
            .map(|(position, w)| WordRecord {
                word: w.token.raw.clone(),
                status: w.status,
                position,
            })
            .collect()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            verse: self.verse,
            accuracy: self.accuracy,
            accuracy_pct: self.accuracy_pct(),
        }
    }
}

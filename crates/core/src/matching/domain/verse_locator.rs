use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::alignment_engine::edit_distance;
use super::match_report::VerseSpan;
use crate::corpus::domain::corpus_error::VerseNotFound;
use crate::corpus::domain::verse_index::VerseIndex;
use crate::corpus::domain::verse_record::VerseRecord;
use crate::shared::constants::{DEFAULT_MIN_OVERLAP, DEFAULT_TOP_K, DEFAULT_WINDOW_TOLERANCE};
use crate::text::domain::token::Token;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidLocatorConfig {
    #[error("min_overlap must be between 0.0 and 1.0, got {0}")]
    MinOverlap(f64),
    #[error("top_k must be at least 1")]
    TopK,
}

/// Tunables for open search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Best candidates below this overlap ratio are reported as unresolved.
    pub min_overlap: f64,
    /// Window lengths tried are `transcript_len ± window_tolerance`.
    pub window_tolerance: usize,
    /// How many top-overlap candidates get an edit distance.
    pub top_k: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            min_overlap: DEFAULT_MIN_OVERLAP,
            window_tolerance: DEFAULT_WINDOW_TOLERANCE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl LocatorConfig {
    pub fn validate(&self) -> Result<(), InvalidLocatorConfig> {
        if !(0.0..=1.0).contains(&self.min_overlap) {
            return Err(InvalidLocatorConfig::MinOverlap(self.min_overlap));
        }
        if self.top_k == 0 {
            return Err(InvalidLocatorConfig::TopK);
        }
        Ok(())
    }
}

/// Outcome of locating a transcript in the corpus.
#[derive(Debug, Clone, PartialEq)]
pub enum Location<'a> {
    Found {
        span: VerseSpan,
        score: f64,
        verses: &'a [VerseRecord],
    },
    Unresolved {
        best_score: f64,
    },
}

/// A scored window over the flattened stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    start: usize,
    len: usize,
    overlap: usize,
    /// `max(window_len, transcript_len)`; the ratio is `overlap / denom`.
    denom: usize,
}

impl Candidate {
    fn ratio(&self) -> f64 {
        self.overlap as f64 / self.denom as f64
    }

    /// Higher ratio first, compared exactly by cross-multiplication.
    fn cmp_ratio(&self, other: &Candidate) -> Ordering {
        (other.overlap * self.denom).cmp(&(self.overlap * other.denom))
    }

    /// Ratio, then stream position (which follows the chapter/verse ordinal).
    fn cmp_rank(&self, other: &Candidate) -> Ordering {
        self.cmp_ratio(other)
            .then(self.start.cmp(&other.start))
            .then(self.len.cmp(&other.len))
    }
}

/// Bounded best-first list of candidates.
struct TopCandidates {
    capacity: usize,
    items: Vec<Candidate>,
}

impl TopCandidates {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity + 1),
        }
    }

    fn offer(&mut self, candidate: Candidate) {
        if self.items.len() == self.capacity {
            match self.items.last() {
                Some(worst) if candidate.cmp_rank(worst) == Ordering::Less => {}
                _ => return,
            }
        }
        let at = self
            .items
            .partition_point(|c| c.cmp_rank(&candidate) == Ordering::Less);
        self.items.insert(at, candidate);
        self.items.truncate(self.capacity);
    }
}

/// Multiset intersection between a sliding window and the transcript.
struct WindowOverlap<'t, 's> {
    wanted: &'t HashMap<&'t str, usize>,
    window: HashMap<&'s str, usize>,
    overlap: usize,
}

impl<'t, 's> WindowOverlap<'t, 's> {
    fn new(wanted: &'t HashMap<&'t str, usize>) -> Self {
        Self {
            wanted,
            window: HashMap::new(),
            overlap: 0,
        }
    }

    fn push(&mut self, word: &'s str) {
        if let Some(&want) = self.wanted.get(word) {
            let count = self.window.entry(word).or_insert(0);
            if *count < want {
                self.overlap += 1;
            }
            *count += 1;
        }
    }

    fn pop(&mut self, word: &'s str) {
        if let Some(&want) = self.wanted.get(word) {
            if let Some(count) = self.window.get_mut(word) {
                *count -= 1;
                if *count < want {
                    self.overlap -= 1;
                }
            }
        }
    }
}

/// Finds the verse(s) a transcript was recited from.
#[derive(Debug, Clone, Default)]
pub struct VerseLocator {
    config: LocatorConfig,
}

impl VerseLocator {
    pub fn new(config: LocatorConfig) -> Result<Self, InvalidLocatorConfig> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Direct lookup of a caller-chosen verse range. No search, score 1.0.
    pub fn locate_targeted<'a>(
        &self,
        index: &'a VerseIndex,
        span: VerseSpan,
    ) -> Result<Location<'a>, VerseNotFound> {
        let verses = index.lookup_range(span.chapter, span.first_verse, span.last_verse)?;
        Ok(Location::Found {
            span,
            score: 1.0,
            verses,
        })
    }

    /// Sliding-window search over the whole corpus.
    ///
    /// Windows of `len ± tolerance` words are scored by multiset overlap with
    /// the transcript, never crossing a chapter boundary. The `top_k` best
    /// by overlap are re-ranked by edit distance; remaining ties go to the
    /// lowest chapter/verse.
    pub fn search<'a>(&self, index: &'a VerseIndex, transcript: &[Token]) -> Location<'a> {
        let n = transcript.len();
        if n == 0 {
            return Location::Unresolved { best_score: 0.0 };
        }

        let mut wanted: HashMap<&str, usize> = HashMap::new();
        for token in transcript {
            *wanted.entry(token.normalized.as_str()).or_insert(0) += 1;
        }

        let shortest = n.saturating_sub(self.config.window_tolerance).max(1);
        let longest = n + self.config.window_tolerance;
        let mut top = TopCandidates::new(self.config.top_k);
        let mut scored = 0usize;

        for chapter in 1..=index.chapter_count() {
            let Some(span) = index.chapter_span(chapter) else {
                continue;
            };
            let mut previous_len = 0;
            for target_len in shortest..=longest {
                // Short chapters clamp every length to the whole chapter; slide once.
                let len = target_len.min(span.len());
                if len == 0 || len == previous_len {
                    continue;
                }
                previous_len = len;
                scored += slide(index, span.clone(), len, n, &wanted, &mut top);
            }
        }

        let transcript_words: Vec<&str> = transcript.iter().map(|t| t.normalized.as_str()).collect();
        let best = top
            .items
            .iter()
            .map(|c| {
                let window: Vec<&str> = (c.start..c.start + c.len)
                    .map(|p| index.stream_token(p))
                    .collect();
                (*c, edit_distance(&window, &transcript_words))
            })
            .min_by(|(a, da), (b, db)| a.cmp_ratio(b).then(da.cmp(db)).then(a.cmp_rank(b)));

        let Some((best, distance)) = best else {
            log::debug!("Open search: {scored} windows scored, no overlap");
            return Location::Unresolved { best_score: 0.0 };
        };

        let score = best.ratio();
        log::debug!(
            "Open search: {scored} windows scored, best overlap {score:.3} at stream {}..{} (distance {distance})",
            best.start,
            best.start + best.len
        );
        if score < self.config.min_overlap {
            return Location::Unresolved { best_score: score };
        }

        let stream = index.flattened_stream();
        let first = stream[best.start].record;
        let last = stream[best.start + best.len - 1].record;
        let verses = &index.records()[first..=last];
        let span = VerseSpan {
            chapter: verses[0].chapter(),
            first_verse: verses[0].verse(),
            last_verse: verses[verses.len() - 1].verse(),
        };
        Location::Found {
            span,
            score,
            verses,
        }
    }
}

/// Scores every window of `len` words inside `span`. Returns windows scored.
fn slide(
    index: &VerseIndex,
    span: Range<usize>,
    len: usize,
    transcript_len: usize,
    wanted: &HashMap<&str, usize>,
    top: &mut TopCandidates,
) -> usize {
    let mut counter = WindowOverlap::new(wanted);
    let mut scored = 0;
    let denom = len.max(transcript_len);
    for pos in span.clone() {
        counter.push(index.stream_token(pos));
        if pos >= span.start + len {
            counter.pop(index.stream_token(pos - len));
        }
        if pos + 1 >= span.start + len {
            scored += 1;
            if counter.overlap > 0 {
                top.offer(Candidate {
                    start: pos + 1 - len,
                    len,
                    overlap: counter.overlap,
                    denom,
                });
            }
        }
    }
    scored
}

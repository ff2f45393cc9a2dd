use serde::{Deserialize, Serialize};

use super::alignment_engine::{AlignmentResult, EditOp};
use crate::text::domain::token::Token;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    /// Canonical word recited as written.
    Correct,
    /// Canonical word not recited.
    Missed,
    /// Canonical word recited as a different word.
    Incorrect,
    /// Recited word with no canonical counterpart.
    Extra,
}

impl WordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordStatus::Correct => "correct",
            WordStatus::Missed => "missed",
            WordStatus::Incorrect => "incorrect",
            WordStatus::Extra => "extra",
        }
    }
}

impl std::fmt::Display for WordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one reported word. `token` is the canonical word for
/// correct/missed/incorrect and the recited word for extra.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordReport {
    pub token: Token,
    pub status: WordStatus,
    pub canonical_index: Option<usize>,
    pub recognized_index: Option<usize>,
    /// What was recited in place of an incorrect word.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recited: Option<Token>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Classification {
    pub word_statuses: Vec<WordReport>,
    pub accuracy: f64,
}

/// Maps an edit script onto per-word statuses in script order.
///
/// `accuracy` is matches over canonical words, 1.0 when there are no
/// canonical words. Extra words are reported but never lower it.
pub fn classify(alignment: &AlignmentResult, canonical: &[Token], recognized: &[Token]) -> Classification {
    let word_statuses = alignment
        .ops()
        .iter()
        .map(|op| match *op {
            EditOp::Match {
                canonical: c,
                recognized: r,
            } => WordReport {
                token: canonical[c].clone(),
                status: WordStatus::Correct,
                canonical_index: Some(c),
                recognized_index: Some(r),
                recited: None,
            },
            EditOp::Substitute {
                canonical: c,
                recognized: r,
            } => WordReport {
                token: canonical[c].clone(),
                status: WordStatus::Incorrect,
                canonical_index: Some(c),
                recognized_index: Some(r),
                recited: Some(recognized[r].clone()),
            },
            EditOp::Delete { canonical: c } => WordReport {
                token: canonical[c].clone(),
                status: WordStatus::Missed,
                canonical_index: Some(c),
                recognized_index: None,
                recited: None,
            },
            EditOp::Insert { recognized: r } => WordReport {
                token: recognized[r].clone(),
                status: WordStatus::Extra,
                canonical_index: None,
                recognized_index: Some(r),
                recited: None,
            },
        })
        .collect();

    let accuracy = if canonical.is_empty() {
        1.0
    } else {
        alignment.match_count() as f64 / canonical.len() as f64
    };

    Classification {
        word_statuses,
        accuracy,
    }
}

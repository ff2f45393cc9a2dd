use ndarray::Array2;
use serde::Serialize;

use crate::text::domain::token::Token;

/// One step of the edit script turning the canonical words into the
/// recognized words. Indices point into the two input sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EditOp {
    Match { canonical: usize, recognized: usize },
    Substitute { canonical: usize, recognized: usize },
    /// Canonical word with no recognized counterpart.
    Delete { canonical: usize },
    /// Recognized word with no canonical counterpart.
    Insert { recognized: usize },
}

impl EditOp {
    pub fn canonical_index(&self) -> Option<usize> {
        match *self {
            EditOp::Match { canonical, .. }
            | EditOp::Substitute { canonical, .. }
            | EditOp::Delete { canonical } => Some(canonical),
            EditOp::Insert { .. } => None,
        }
    }

    pub fn recognized_index(&self) -> Option<usize> {
        match *self {
            EditOp::Match { recognized, .. }
            | EditOp::Substitute { recognized, .. }
            | EditOp::Insert { recognized } => Some(recognized),
            EditOp::Delete { .. } => None,
        }
    }
}

/// Ordered edit script covering both sequences end to end, plus its cost.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentResult {
    ops: Vec<EditOp>,
    cost: usize,
}

impl AlignmentResult {
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn cost(&self) -> usize {
        self.cost
    }

    pub fn match_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Match { .. }))
            .count()
    }
}

/// Word-level Levenshtein alignment with unit costs.
///
/// Ties between minimum-cost paths are broken during traceback: a diagonal
/// step (match, else substitute) wins over delete, and delete wins over
/// insert. A near miss is therefore reported as one substituted word rather
/// than a missed word plus an extra word.
pub fn align(canonical: &[Token], recognized: &[Token]) -> AlignmentResult {
    let n = canonical.len();
    let m = recognized.len();
    let same = |i: usize, j: usize| canonical[i].matches(&recognized[j]);

    let mut dp = Array2::<usize>::zeros((n + 1, m + 1));
    for i in 0..=n {
        dp[[i, 0]] = i;
    }
    for j in 0..=m {
        dp[[0, j]] = j;
    }
    for i in 1..=n {
        for j in 1..=m {
            let diagonal = dp[[i - 1, j - 1]] + usize::from(!same(i - 1, j - 1));
            let delete = dp[[i - 1, j]] + 1;
            let insert = dp[[i, j - 1]] + 1;
            dp[[i, j]] = diagonal.min(delete).min(insert);
        }
    }

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 {
            let is_match = same(i - 1, j - 1);
            if dp[[i - 1, j - 1]] + usize::from(!is_match) == dp[[i, j]] {
                ops.push(if is_match {
                    EditOp::Match {
                        canonical: i - 1,
                        recognized: j - 1,
                    }
                } else {
                    EditOp::Substitute {
                        canonical: i - 1,
                        recognized: j - 1,
                    }
                });
                i -= 1;
                j -= 1;
                continue;
            }
        }
        if i > 0 && dp[[i - 1, j]] + 1 == dp[[i, j]] {
            ops.push(EditOp::Delete { canonical: i - 1 });
            i -= 1;
        } else {
            ops.push(EditOp::Insert { recognized: j - 1 });
            j -= 1;
        }
    }
    ops.reverse();

    AlignmentResult {
        ops,
        cost: dp[[n, m]],
    }
}

/// Word-level edit distance without the traceback, in two rows.
pub fn edit_distance<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, wa) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, wb) in b.iter().enumerate() {
            let sub = prev[j] + usize::from(wa.as_ref() != wb.as_ref());
            curr[j + 1] = sub.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

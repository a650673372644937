//! Outputs of a matching pass.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A (left, right) record pair considered for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidatePair {
    pub left: usize,
    pub right: usize,
}

/// A candidate pair with its similarity score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub left: usize,
    pub right: usize,
    pub score: f64,
}

impl ScoredPair {
    pub fn pair(&self) -> CandidatePair {
        CandidatePair {
            left: self.left,
            right: self.right,
        }
    }
}

/// A resolved assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Match {
    /// An accepted pair above the threshold.
    Matched(ScoredPair),
    /// A left record with no accepted pair.
    UnmatchedLeft { left: usize },
    /// A right record with no accepted pair.
    UnmatchedRight { right: usize },
}

impl Match {
    pub fn left(&self) -> Option<usize> {
        match self {
            Self::Matched(pair) => Some(pair.left),
            Self::UnmatchedLeft { left } => Some(*left),
            Self::UnmatchedRight { .. } => None,
        }
    }

    pub fn right(&self) -> Option<usize> {
        match self {
            Self::Matched(pair) => Some(pair.right),
            Self::UnmatchedRight { right } => Some(*right),
            Self::UnmatchedLeft { .. } => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Matched(pair) => Some(pair.score),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Counts describing one matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub left_records: usize,
    pub right_records: usize,
    /// Left records whose candidates were generated and scored. Equal to
    /// `left_records` unless the pass was truncated.
    pub left_scanned: usize,
    pub candidates_scored: usize,
    pub matched: usize,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
}

/// Joined output rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl JoinedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Everything a join returns to its caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matches: Vec<Match>,
    pub summary: MatchSummary,
    pub output: JoinedTable,
    /// Set when the time budget ran out before every left record was scanned.
    pub truncated: bool,
}

impl MatchResult {
    pub fn matched(&self) -> impl Iterator<Item = &ScoredPair> {
        self.matches.iter().filter_map(|m| match m {
            Match::Matched(pair) => Some(pair),
            _ => None,
        })
    }
}

//! Assignment of scored candidate pairs.
//!
//! Pairs below the threshold are dropped and the rest are visited by score
//! descending, ties broken by (left, right) ascending. A pair is accepted
//! unless it reuses a record the cardinality makes exclusive. For
//! one-to-one this is a greedy approximation of optimal bipartite matching;
//! the result is deterministic for a given input.

use fuzzjoin_model::{Match, ScoredPair};

use crate::config::{Cardinality, Direction, JoinConfig};
use crate::error::{JoinError, Result};

/// Outcome of [`Matcher::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    /// Accepted pairs ordered by (left, right).
    pub accepted: Vec<ScoredPair>,
    pub unmatched_left: Vec<usize>,
    pub unmatched_right: Vec<usize>,
}

impl Assignment {
    /// Orders the assignment for output.
    ///
    /// Each left index below `left_scanned` contributes its accepted pairs or
    /// a single unmatched entry. Unmatched right records follow when
    /// `include_unmatched_right` is set.
    pub fn into_matches(self, left_scanned: usize, include_unmatched_right: bool) -> Vec<Match> {
        let mut matches = Vec::with_capacity(self.accepted.len() + self.unmatched_left.len());
        let mut accepted = self.accepted.into_iter().peekable();
        for left in 0..left_scanned {
            let before = matches.len();
            while let Some(pair) = accepted.next_if(|p| p.left == left) {
                matches.push(Match::Matched(pair));
            }
            if matches.len() == before {
                matches.push(Match::UnmatchedLeft { left });
            }
        }
        if include_unmatched_right {
            matches.extend(
                self.unmatched_right
                    .into_iter()
                    .map(|right| Match::UnmatchedRight { right }),
            );
        }
        matches
    }
}

/// Threshold and cardinality policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    threshold: f64,
    cardinality: Cardinality,
    direction: Direction,
}

impl Matcher {
    pub fn new(threshold: f64, cardinality: Cardinality, direction: Direction) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(JoinError::invalid_config(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            threshold,
            cardinality,
            direction,
        })
    }

    pub fn from_config(config: &JoinConfig) -> Result<Self> {
        Self::new(config.threshold, config.cardinality, config.direction)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether a left and a right record may each take part in at most one
    /// accepted pair.
    fn exclusivity(&self) -> (bool, bool) {
        match (self.cardinality, self.direction) {
            (Cardinality::OneToOne, _) => (true, true),
            (Cardinality::OneToMany, Direction::LeftToRight) => (false, true),
            (Cardinality::OneToMany, Direction::RightToLeft) => (true, false),
            (Cardinality::ManyToMany, _) => (false, false),
        }
    }

    /// Resolves scored pairs over `left_len` left and `right_len` right
    /// records. Pairs outside those ranges are ignored.
    pub fn resolve(&self, pairs: Vec<ScoredPair>, left_len: usize, right_len: usize) -> Assignment {
        let mut eligible: Vec<ScoredPair> = pairs
            .into_iter()
            .filter(|p| p.score >= self.threshold && p.left < left_len && p.right < right_len)
            .collect();
        eligible.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.left.cmp(&b.left))
                .then(a.right.cmp(&b.right))
        });

        let (left_exclusive, right_exclusive) = self.exclusivity();
        let mut left_used = vec![false; left_len];
        let mut right_used = vec![false; right_len];
        let mut accepted = Vec::new();

        for pair in eligible {
            if (left_exclusive && left_used[pair.left]) || (right_exclusive && right_used[pair.right])
            {
                continue;
            }
            left_used[pair.left] = true;
            right_used[pair.right] = true;
            accepted.push(pair);
        }
        accepted.sort_by_key(ScoredPair::pair);

        tracing::debug!(
            accepted = accepted.len(),
            cardinality = %self.cardinality,
            "resolved candidate pairs"
        );

        Assignment {
            accepted,
            unmatched_left: unused(&left_used),
            unmatched_right: unused(&right_used),
        }
    }
}

fn unused(used: &[bool]) -> Vec<usize> {
    used.iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(index, _)| index)
        .collect()
}

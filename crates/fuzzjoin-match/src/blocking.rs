//! Candidate generation.
//!
//! A [`Blocker`] maps each non-empty key to the block keys it is filed
//! under; two records become a candidate pair when they share a block key.
//! Keys too short to block on ([`BlockKeys::All`]) are compared against
//! every non-empty key on the other side. Empty keys never produce
//! candidates.

use std::collections::BTreeMap;
use std::fmt;
use std::vec;

use fuzzjoin_model::CandidatePair;

use crate::config::{Blocking, JoinConfig};

/// Block membership of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKeys {
    Keys(Vec<String>),
    /// Compare against every record on the other side.
    All,
}

/// Assigns block keys to prepared, non-empty match keys.
pub trait Blocker: fmt::Debug + Send + Sync {
    fn describe(&self) -> String;

    fn block_keys(&self, key: &str) -> BlockKeys;
}

/// The built-in blocking strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockingStrategy {
    pub kind: Blocking,
    pub block_length: usize,
}

impl BlockingStrategy {
    pub fn new(kind: Blocking, block_length: usize) -> Self {
        Self { kind, block_length }
    }

    pub fn from_config(config: &JoinConfig) -> Self {
        Self::new(config.blocking, config.block_length)
    }

    fn prefix(&self, text: &str) -> String {
        text.chars().take(self.block_length).collect()
    }
}

impl Blocker for BlockingStrategy {
    fn describe(&self) -> String {
        match self.kind {
            Blocking::Exhaustive => self.kind.to_string(),
            _ => format!("{}({})", self.kind, self.block_length),
        }
    }

    fn block_keys(&self, key: &str) -> BlockKeys {
        match self.kind {
            Blocking::Exhaustive => BlockKeys::All,
            _ if key.chars().count() < self.block_length => BlockKeys::All,
            Blocking::Prefix => BlockKeys::Keys(vec![self.prefix(key)]),
            Blocking::Token => {
                let mut keys: Vec<String> =
                    key.split_whitespace().map(|token| self.prefix(token)).collect();
                keys.sort_unstable();
                keys.dedup();
                BlockKeys::Keys(keys)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Membership {
    Empty,
    All,
    Keys(Vec<String>),
}

/// Candidate pairs of two prepared key columns.
///
/// Built once per join; owns its index and never touches the datasets.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    left: Vec<Membership>,
    right_len: usize,
    /// Right records with a non-empty key.
    right_keyed: Vec<usize>,
    /// Right records blocked as [`BlockKeys::All`].
    right_wildcards: Vec<usize>,
    index: BTreeMap<String, Vec<usize>>,
}

impl CandidateGenerator {
    /// Indexes the right keys and records the blocks of the left keys.
    ///
    /// Keys must already be prepared; an empty string is an empty key.
    pub fn new(left_keys: &[String], right_keys: &[String], blocker: &dyn Blocker) -> Self {
        let membership = |key: &String| {
            if key.is_empty() {
                Membership::Empty
            } else {
                match blocker.block_keys(key) {
                    BlockKeys::All => Membership::All,
                    BlockKeys::Keys(keys) => Membership::Keys(keys),
                }
            }
        };

        let mut right_keyed = Vec::new();
        let mut right_wildcards = Vec::new();
        let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (row, key) in right_keys.iter().enumerate() {
            match membership(key) {
                Membership::Empty => continue,
                Membership::All => right_wildcards.push(row),
                Membership::Keys(keys) => {
                    for block in keys {
                        index.entry(block).or_default().push(row);
                    }
                }
            }
            right_keyed.push(row);
        }

        Self {
            left: left_keys.iter().map(membership).collect(),
            right_len: right_keys.len(),
            right_keyed,
            right_wildcards,
            index,
        }
    }

    pub fn left_len(&self) -> usize {
        self.left.len()
    }

    pub fn right_len(&self) -> usize {
        self.right_len
    }

    /// Number of distinct block keys on the right side.
    pub fn block_count(&self) -> usize {
        self.index.len()
    }

    /// Right candidates of one left record, ascending and without duplicates.
    pub fn for_left(&self, left: usize) -> Vec<usize> {
        match self.left.get(left) {
            None | Some(Membership::Empty) => Vec::new(),
            Some(Membership::All) => self.right_keyed.clone(),
            Some(Membership::Keys(keys)) => {
                let mut rights: Vec<usize> = keys
                    .iter()
                    .filter_map(|block| self.index.get(block))
                    .flatten()
                    .chain(&self.right_wildcards)
                    .copied()
                    .collect();
                rights.sort_unstable();
                rights.dedup();
                rights
            }
        }
    }

    /// All candidate pairs ordered by (left, right). Each call starts over.
    pub fn pairs(&self) -> Candidates<'_> {
        Candidates {
            generator: self,
            next_left: 0,
            current_left: 0,
            rights: Vec::new().into_iter(),
        }
    }
}

/// Lazy iterator over the pairs of a [`CandidateGenerator`].
#[derive(Debug)]
pub struct Candidates<'a> {
    generator: &'a CandidateGenerator,
    next_left: usize,
    current_left: usize,
    rights: vec::IntoIter<usize>,
}

impl Iterator for Candidates<'_> {
    type Item = CandidatePair;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(right) = self.rights.next() {
                return Some(CandidatePair {
                    left: self.current_left,
                    right,
                });
            }
            if self.next_left >= self.generator.left_len() {
                return None;
            }
            self.current_left = self.next_left;
            self.rights = self.generator.for_left(self.current_left).into_iter();
            self.next_left += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|k| (*k).to_string()).collect()
    }

    fn pairs(generator: &CandidateGenerator) -> Vec<(usize, usize)> {
        generator.pairs().map(|p| (p.left, p.right)).collect()
    }

    #[test]
    fn token_blocks_share_a_token_prefix() {
        let strategy = BlockingStrategy::new(Blocking::Token, 3);
        assert_eq!(
            strategy.block_keys("jon smith"),
            BlockKeys::Keys(vec!["jon".to_string(), "smi".to_string()])
        );
        assert_eq!(strategy.block_keys("al"), BlockKeys::All);
        assert_eq!(strategy.describe(), "token(3)");

        let generator = CandidateGenerator::new(
            &keys(&["jon smith", "mary jones"]),
            &keys(&["john smith", "jane doe", "maria jonas"]),
            &strategy,
        );
        // "maria jonas" shares the "jon" block with both left keys.
        assert_eq!(pairs(&generator), vec![(0, 0), (0, 2), (1, 2)]);
    }

    #[test]
    fn prefix_blocks_on_key_start() {
        let strategy = BlockingStrategy::new(Blocking::Prefix, 2);
        let generator = CandidateGenerator::new(
            &keys(&["abc", "xyz"]),
            &keys(&["abd", "xab", "ab"]),
            &strategy,
        );
        assert_eq!(pairs(&generator), vec![(0, 0), (0, 2)]);
        assert_eq!(generator.block_count(), 2);
    }

    #[test]
    fn short_keys_fall_back_to_all_pairs() {
        let strategy = BlockingStrategy::new(Blocking::Token, 4);
        let generator = CandidateGenerator::new(
            &keys(&["ab", "smith"]),
            &keys(&["smithe", "", "zzz"]),
            &strategy,
        );
        // "ab" sees every keyed right; "zzz" is seen by every left.
        assert_eq!(pairs(&generator), vec![(0, 0), (0, 2), (1, 0), (1, 2)]);
    }

    #[test]
    fn empty_keys_have_no_candidates() {
        let strategy = BlockingStrategy::new(Blocking::Exhaustive, 3);
        let generator =
            CandidateGenerator::new(&keys(&["", "abc"]), &keys(&["abc", ""]), &strategy);
        assert!(generator.for_left(0).is_empty());
        assert_eq!(pairs(&generator), vec![(1, 0)]);
        assert!(generator.for_left(99).is_empty());
    }

    #[test]
    fn pairs_are_restartable() {
        let strategy = BlockingStrategy::new(Blocking::Exhaustive, 3);
        let generator =
            CandidateGenerator::new(&keys(&["a", "b"]), &keys(&["c", "d"]), &strategy);
        let first = pairs(&generator);
        assert_eq!(first, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(pairs(&generator), first);
        assert_eq!(generator.right_len(), 2);
    }
}

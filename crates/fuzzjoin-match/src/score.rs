//! Similarity scoring of match keys.
//!
//! [`SimilarityMetric`] is the pluggable capability: anything that maps two
//! non-empty keys to a similarity. [`KeyScorer`] wraps a metric with key
//! normalization and enforces the guarantees every metric must honour
//! (range, symmetry, identity, empty keys).

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use fuzzjoin_model::Side;
use rapidfuzz::distance::{indel, levenshtein};

use crate::config::{EmptyKeyPolicy, JoinConfig, Metric};
use crate::error::{JoinError, Result};
use crate::normalize::{is_empty_key, normalize_key};

/// A similarity function over two keys.
///
/// Implementations receive non-empty keys and should return a value in
/// `[0, 1]` with 1.0 for identical keys. [`KeyScorer`] clamps whatever they
/// return and orders the arguments canonically, so implementations need not
/// be symmetric themselves.
pub trait SimilarityMetric: fmt::Debug + Send + Sync {
    /// Name shown in logs and summaries.
    fn name(&self) -> &str;

    fn similarity(&self, a: &str, b: &str) -> f64;
}

impl SimilarityMetric for Metric {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        match self {
            Self::EditDistance => edit_similarity(a, b),
            Self::TokenSet => token_set_similarity(a, b),
            Self::Phonetic => phonetic_similarity(a, b),
        }
    }
}

/// Normalized Levenshtein similarity: `1 - distance / max(len_a, len_b)`.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    levenshtein::normalized_similarity(a.chars(), b.chars())
}

/// Token-set ratio.
///
/// Both keys are split into deduplicated, sorted token sets. The score is the
/// best Indel similarity among the shared tokens compared with each side's
/// full token list, and the two full lists compared with each other. A key
/// whose tokens are a subset of the other's scores 1.0.
pub fn token_set_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared = join_tokens(tokens_a.intersection(&tokens_b));
    let only_a = join_tokens(tokens_a.difference(&tokens_b));
    let only_b = join_tokens(tokens_b.difference(&tokens_a));

    if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 1.0;
    }

    let combined_a = join_parts(&shared, &only_a);
    let combined_b = join_parts(&shared, &only_b);

    [
        indel_similarity(&shared, &combined_a),
        indel_similarity(&shared, &combined_b),
        indel_similarity(&combined_a, &combined_b),
    ]
    .into_iter()
    .fold(0.0, f64::max)
}

/// Soundex codes of every token, compared by edit similarity.
pub fn phonetic_similarity(a: &str, b: &str) -> f64 {
    edit_similarity(&phonetic_key(a), &phonetic_key(b))
}

/// Space-separated Soundex codes of the tokens of `key`.
pub fn phonetic_key(key: &str) -> String {
    key.split_whitespace()
        .map(soundex)
        .collect::<Vec<_>>()
        .join(" ")
}

/// American Soundex code of one token: its first letter followed by three
/// digits.
///
/// Tokens that do not start with an ASCII letter have no code and are kept
/// as their uppercase text.
///
/// ```
/// use fuzzjoin_match::soundex;
///
/// assert_eq!(soundex("Robert"), "R163");
/// assert_eq!(soundex("Rupert"), "R163");
/// assert_eq!(soundex("Ashcraft"), "A261");
/// ```
pub fn soundex(token: &str) -> String {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if !first.is_ascii_alphabetic() {
        return token.to_uppercase();
    }

    let mut code = String::with_capacity(4);
    code.push(first.to_ascii_uppercase());
    let mut previous = soundex_digit(first);

    for ch in chars {
        if code.len() == 4 {
            break;
        }
        let ch = ch.to_ascii_lowercase();
        match soundex_digit(ch) {
            Some(digit) => {
                if previous != Some(digit) {
                    code.push(digit);
                }
                previous = Some(digit);
            }
            // H and W do not separate letters with the same code.
            None if ch == 'h' || ch == 'w' => {}
            None => previous = None,
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}

fn soundex_digit(ch: char) -> Option<char> {
    match ch.to_ascii_lowercase() {
        'b' | 'f' | 'p' | 'v' => Some('1'),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
        'd' | 't' => Some('3'),
        'l' => Some('4'),
        'm' | 'n' => Some('5'),
        'r' => Some('6'),
        _ => None,
    }
}

fn indel_similarity(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars())
}

fn join_tokens<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn join_parts(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

/// Scores raw key text with a metric.
#[derive(Debug, Clone)]
pub struct KeyScorer {
    metric: Arc<dyn SimilarityMetric>,
    normalize: bool,
}

impl KeyScorer {
    pub fn new(metric: Arc<dyn SimilarityMetric>, normalize: bool) -> Self {
        Self { metric, normalize }
    }

    /// Scorer for the metric and normalization named in a config.
    pub fn from_config(config: &JoinConfig) -> Self {
        Self::new(Arc::new(config.metric), config.normalize)
    }

    pub fn metric(&self) -> &dyn SimilarityMetric {
        self.metric.as_ref()
    }

    /// The comparable form of a raw key. Empty keys come back as `""`.
    pub fn prepare(&self, raw: &str) -> String {
        let key = if self.normalize {
            normalize_key(raw)
        } else {
            raw.to_string()
        };
        if is_empty_key(&key) { String::new() } else { key }
    }

    /// Scores two keys already passed through [`KeyScorer::prepare`].
    pub fn score_prepared(&self, a: &str, b: &str) -> f64 {
        if is_empty_key(a) || is_empty_key(b) {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let score = self.metric.similarity(first, second);
        if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        }
    }

    /// Scores two raw keys. An empty key scores 0.0.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.score_prepared(&self.prepare(a), &self.prepare(b))
    }

    /// Scores two raw keys, rejecting empty keys under [`EmptyKeyPolicy::Error`].
    pub fn try_score(&self, a: &str, b: &str, policy: EmptyKeyPolicy) -> Result<f64> {
        let a = self.prepare(a);
        let b = self.prepare(b);
        if policy == EmptyKeyPolicy::Error {
            for (side, key) in [(Side::Left, &a), (Side::Right, &b)] {
                if key.is_empty() {
                    return Err(JoinError::InvalidKey {
                        side,
                        row: None,
                        reason: "key is empty".to_string(),
                    });
                }
            }
        }
        Ok(self.score_prepared(&a, &b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(metric: Metric) -> KeyScorer {
        KeyScorer::new(Arc::new(metric), true)
    }

    #[derive(Debug)]
    struct Broken;

    impl SimilarityMetric for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn similarity(&self, a: &str, _b: &str) -> f64 {
            if a.starts_with('a') { f64::NAN } else { 7.5 }
        }
    }

    #[test]
    fn edit_distance_on_near_duplicates() {
        let s = scorer(Metric::EditDistance);
        let score = s.score("Jon Smith", "John Smith");
        assert!((score - 0.9).abs() < 1e-9, "got {score}");
        assert_eq!(s.score("JOHN  SMITH", "john smith"), 1.0);
    }

    #[test]
    fn token_set_ignores_order_and_extra_tokens() {
        let s = scorer(Metric::TokenSet);
        assert_eq!(s.score("Smith, Jon", "Jon Smith"), 1.0);
        assert_eq!(s.score("Jon Smith", "Jon Smith Jr"), 1.0);
        let partial = s.score("Jon Smith", "John Smith");
        assert!(partial > 0.9 && partial < 1.0, "got {partial}");
        assert!(s.score("alpha", "omega") < 0.5);
    }

    #[test]
    fn soundex_codes() {
        assert_eq!(soundex("Tymczak"), "T522");
        assert_eq!(soundex("Pfister"), "P236");
        assert_eq!(soundex("Jon"), "J500");
        assert_eq!(soundex("John"), "J500");
        assert_eq!(soundex("Smith"), "S530");
        assert_eq!(soundex("42nd"), "42ND");
        assert_eq!(soundex(""), "");
    }

    #[test]
    fn phonetic_matches_sound_alikes() {
        let s = scorer(Metric::Phonetic);
        assert_eq!(s.score("Jon Smith", "John Smyth"), 1.0);
        assert!(s.score("Jon Smith", "Mary Brown") < 0.6);
    }

    #[test]
    fn empty_keys_score_zero() {
        let s = scorer(Metric::EditDistance);
        assert_eq!(s.score("", ""), 0.0);
        assert_eq!(s.score("...", "Jon"), 0.0);
        assert_eq!(s.score("Jon", "   "), 0.0);
    }

    #[test]
    fn strict_policy_rejects_empty_keys() {
        let s = scorer(Metric::EditDistance);
        let err = s.try_score("Jon", "--", EmptyKeyPolicy::Error).unwrap_err();
        assert!(matches!(
            err,
            JoinError::InvalidKey {
                side: Side::Right,
                row: None,
                ..
            }
        ));
        assert_eq!(s.try_score("Jon", "--", EmptyKeyPolicy::NeverMatch).unwrap(), 0.0);
    }

    #[test]
    fn custom_metric_output_is_sanitized() {
        let s = KeyScorer::new(Arc::new(Broken), true);
        assert_eq!(s.metric().name(), "broken");
        assert_eq!(s.score("abc", "xyz"), 0.0);
        assert_eq!(s.score("xyz", "abc"), 0.0);
        assert_eq!(s.score("xyz", "xya"), 1.0);
        assert_eq!(s.score("same", "same"), 1.0);
    }

    #[test]
    fn raw_keys_when_normalization_is_off() {
        let s = KeyScorer::new(Arc::new(Metric::EditDistance), false);
        assert!(s.score("JON", "jon") < 1.0);
        assert_eq!(s.prepare("  "), "");
        assert_eq!(s.prepare(" Jon "), " Jon ");
    }
}

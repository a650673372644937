//! The join pipeline: keys, candidates, scores, assignment, rows.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fuzzjoin_model::{Dataset, KeySelector, MatchResult, MatchSummary, ResolvedKey, ScoredPair, Side};
use tracing::{debug, info, info_span, warn};

use crate::assemble::{OutputLayout, assemble};
use crate::blocking::{Blocker, BlockingStrategy, CandidateGenerator};
use crate::config::{EmptyKeyPolicy, JoinConfig};
use crate::error::{JoinError, Result};
use crate::matcher::Matcher;
use crate::score::{KeyScorer, SimilarityMetric};

/// A configured fuzzy join.
///
/// Immutable once built and safe to share across threads; every
/// [`FuzzyJoin::join`] call is independent of the others.
#[derive(Debug, Clone)]
pub struct FuzzyJoin {
    config: JoinConfig,
    metric: Arc<dyn SimilarityMetric>,
    blocker: Arc<dyn Blocker>,
}

impl FuzzyJoin {
    /// Validates `config` and builds the engine with its metric and blocking.
    pub fn new(config: JoinConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            metric: Arc::new(config.metric),
            blocker: Arc::new(BlockingStrategy::from_config(&config)),
            config,
        })
    }

    /// Replaces the configured metric.
    #[must_use]
    pub fn with_metric(mut self, metric: Arc<dyn SimilarityMetric>) -> Self {
        self.metric = metric;
        self
    }

    /// Replaces the configured blocking strategy.
    #[must_use]
    pub fn with_blocker(mut self, blocker: Arc<dyn Blocker>) -> Self {
        self.blocker = blocker;
        self
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    pub fn scorer(&self) -> KeyScorer {
        KeyScorer::new(Arc::clone(&self.metric), self.config.normalize)
    }

    /// Joins `left` to `right` on approximately equal keys.
    ///
    /// Left records are scored in batches of `batch_size`. When a timeout is
    /// configured and runs out with batches remaining, the records scanned so
    /// far are resolved and returned inside [`JoinError::Timeout`].
    pub fn join(
        &self,
        left: &Dataset,
        right: &Dataset,
        left_key: &KeySelector,
        right_key: &KeySelector,
    ) -> Result<MatchResult> {
        let span = info_span!(
            "fuzzy_join",
            left = left.name(),
            right = right.name(),
            metric = self.metric.name()
        );
        let _guard = span.enter();
        let started = Instant::now();

        let left_resolved = resolve_key(left, left_key, Side::Left)?;
        let right_resolved = resolve_key(right, right_key, Side::Right)?;
        let layout = OutputLayout::plan(left.columns(), right.columns(), &self.config)?;
        let matcher = Matcher::from_config(&self.config)?;

        let scorer = self.scorer();
        let left_keys = self.prepare_keys(left, &left_resolved, Side::Left, &scorer)?;
        let right_keys = self.prepare_keys(right, &right_resolved, Side::Right, &scorer)?;
        let candidates = CandidateGenerator::new(&left_keys, &right_keys, self.blocker.as_ref());
        debug!(
            blocking = %self.blocker.describe(),
            blocks = candidates.block_count(),
            "indexed right keys"
        );

        let budget = self.config.budget();
        let mut scored = Vec::new();
        let mut candidates_scored = 0;
        let mut scanned = 0;
        let mut timed_out: Option<(Duration, Duration)> = None;

        while scanned < left.len() {
            let end = (scanned + self.config.batch_size).min(left.len());
            for l in scanned..end {
                for r in candidates.for_left(l) {
                    candidates_scored += 1;
                    let score = scorer.score_prepared(&left_keys[l], &right_keys[r]);
                    if score >= matcher.threshold() {
                        scored.push(ScoredPair {
                            left: l,
                            right: r,
                            score,
                        });
                    }
                }
            }
            scanned = end;
            debug!(scanned, candidates_scored, "scored batch");

            let elapsed = started.elapsed();
            if let Some(budget) = budget
                && scanned < left.len()
                && elapsed > budget
            {
                warn!(
                    scanned,
                    total = left.len(),
                    ?budget,
                    ?elapsed,
                    "time budget exhausted, returning partial result"
                );
                timed_out = Some((budget, elapsed));
                break;
            }
        }

        let assignment = matcher.resolve(scored, scanned, right.len());
        let summary = MatchSummary {
            left_records: left.len(),
            right_records: right.len(),
            left_scanned: scanned,
            candidates_scored,
            matched: assignment.accepted.len(),
            unmatched_left: assignment.unmatched_left.len(),
            unmatched_right: assignment.unmatched_right.len(),
        };
        let matches = assignment.into_matches(scanned, self.config.keep_unmatched_right);
        let output = assemble(&matches, left, right, &layout, &self.config);

        info!(
            matched = summary.matched,
            unmatched_left = summary.unmatched_left,
            unmatched_right = summary.unmatched_right,
            candidates = summary.candidates_scored,
            rows = output.len(),
            "join complete"
        );

        let result = MatchResult {
            matches,
            summary,
            output,
            truncated: timed_out.is_some(),
        };
        match timed_out {
            Some((budget, elapsed)) => Err(JoinError::Timeout {
                partial: Box::new(result),
                budget,
                elapsed,
            }),
            None => Ok(result),
        }
    }

    fn prepare_keys(
        &self,
        dataset: &Dataset,
        key: &ResolvedKey,
        side: Side,
        scorer: &KeyScorer,
    ) -> Result<Vec<String>> {
        (0..dataset.len())
            .map(|row| {
                let prepared = key
                    .extract(dataset, row)
                    .map(|raw| scorer.prepare(&raw))
                    .unwrap_or_default();
                if prepared.is_empty() && self.config.empty_keys == EmptyKeyPolicy::Error {
                    return Err(JoinError::InvalidKey {
                        side,
                        row: Some(row),
                        reason: "key is empty or missing".to_string(),
                    });
                }
                Ok(prepared)
            })
            .collect()
    }
}

fn resolve_key(dataset: &Dataset, key: &KeySelector, side: Side) -> Result<ResolvedKey> {
    key.resolve(dataset)
        .map_err(|field| JoinError::SchemaMismatch {
            side,
            dataset: dataset.name().to_string(),
            field,
            available: dataset.columns().to_vec(),
        })
}

/// Builds an engine from `config` and runs one join.
pub fn fuzzy_join(
    left: &Dataset,
    right: &Dataset,
    left_key: &KeySelector,
    right_key: &KeySelector,
    config: &JoinConfig,
) -> Result<MatchResult> {
    FuzzyJoin::new(config.clone())?.join(left, right, left_key, right_key)
}

#[cfg(test)]
mod tests {
    use fuzzjoin_model::Value;

    use super::*;
    use crate::blocking::BlockKeys;
    use crate::config::{Blocking, Cardinality};

    fn names(dataset: &str, rows: &[&str]) -> Dataset {
        Dataset::from_rows(
            dataset,
            ["name"],
            rows.iter().map(|r| vec![Value::from(*r)]),
        )
        .unwrap()
    }

    fn name_key() -> KeySelector {
        KeySelector::field("name")
    }

    #[derive(Debug)]
    struct FirstLetter;

    impl Blocker for FirstLetter {
        fn describe(&self) -> String {
            "first-letter".to_string()
        }

        fn block_keys(&self, key: &str) -> BlockKeys {
            BlockKeys::Keys(key.chars().take(1).map(String::from).collect())
        }
    }

    #[derive(Debug)]
    struct LengthRatio;

    impl SimilarityMetric for LengthRatio {
        fn name(&self) -> &str {
            "length-ratio"
        }

        fn similarity(&self, a: &str, b: &str) -> f64 {
            let (a, b) = (a.len() as f64, b.len() as f64);
            a.min(b) / a.max(b)
        }
    }

    #[test]
    fn invalid_config_fails_fast() {
        let err = FuzzyJoin::new(JoinConfig::default().with_threshold(1.5)).unwrap_err();
        assert!(matches!(err, JoinError::InvalidConfiguration { .. }));
    }

    #[test]
    fn missing_key_field_is_schema_mismatch() {
        let left = names("left", &["a"]);
        let right = names("right", &["a"]);
        let err = fuzzy_join(
            &left,
            &right,
            &KeySelector::field("full_name"),
            &name_key(),
            &JoinConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            JoinError::SchemaMismatch {
                side: Side::Left,
                ..
            }
        ));
    }

    #[test]
    fn score_field_collision_fails_before_scoring() {
        let left = names("left", &["a"]);
        let right = names("right", &["a"]);
        let config = JoinConfig::default().with_score_field("name_left");
        let err = fuzzy_join(&left, &right, &name_key(), &name_key(), &config).unwrap_err();
        assert!(matches!(err, JoinError::InvalidConfiguration { .. }));
    }

    #[test]
    fn strict_keys_report_the_row() {
        let left = names("left", &["Jon", "  "]);
        let right = names("right", &["Jon"]);
        let config = JoinConfig::default().with_empty_keys(EmptyKeyPolicy::Error);
        let err = fuzzy_join(&left, &right, &name_key(), &name_key(), &config).unwrap_err();
        assert_eq!(err.to_string(), "invalid left key at row 1: key is empty or missing");
    }

    #[test]
    fn custom_blocker_restricts_candidates() {
        let left = names("left", &["apple", "banana"]);
        let right = names("right", &["bapple", "banana"]);
        let engine = FuzzyJoin::new(JoinConfig::default().with_threshold(0.0))
            .unwrap()
            .with_blocker(Arc::new(FirstLetter));
        let result = engine.join(&left, &right, &name_key(), &name_key()).unwrap();
        // "apple" never meets "bapple"; "banana" meets both b-keys.
        assert_eq!(result.summary.candidates_scored, 2);
        assert_eq!(result.summary.matched, 1);
        assert_eq!(result.matched().next().map(|p| (p.left, p.right)), Some((1, 1)));
    }

    #[test]
    fn custom_metric_is_used() {
        let left = names("left", &["abcd"]);
        let right = names("right", &["wxyz", "wx"]);
        let engine = FuzzyJoin::new(
            JoinConfig::default()
                .with_blocking(Blocking::Exhaustive)
                .with_cardinality(Cardinality::ManyToMany)
                .with_threshold(0.5),
        )
        .unwrap()
        .with_metric(Arc::new(LengthRatio));
        let result = engine.join(&left, &right, &name_key(), &name_key()).unwrap();
        let scores: Vec<f64> = result.matched().map(|p| p.score).collect();
        assert_eq!(scores, vec![1.0, 0.5]);
        assert_eq!(engine.scorer().metric().name(), "length-ratio");
    }
}

//! Join configuration.
//!
//! [`JoinConfig`] is plain data: serde-derived, loadable from TOML, and
//! validated once when an engine is built. Enumerations use kebab-case names
//! both in TOML and in [`FromStr`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JoinError, Result};

/// Similarity algorithm applied to a pair of keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Normalized Levenshtein similarity.
    #[default]
    EditDistance,
    /// Token-set ratio over whitespace-separated tokens.
    TokenSet,
    /// Soundex codes per token, compared by edit distance.
    Phonetic,
}

impl Metric {
    pub const ALL: [Self; 3] = [Self::EditDistance, Self::TokenSet, Self::Phonetic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EditDistance => "edit-distance",
            Self::TokenSet => "token-set",
            Self::Phonetic => "phonetic",
        }
    }
}

/// How many accepted pairs a record may take part in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    #[default]
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    pub const ALL: [Self; 3] = [Self::OneToOne, Self::OneToMany, Self::ManyToMany];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToMany => "many-to-many",
        }
    }
}

/// Which side is the "one" under [`Cardinality::OneToMany`].
///
/// `LeftToRight` lets a left record take several rights while each right is
/// used once; `RightToLeft` mirrors it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl Direction {
    pub const ALL: [Self; 2] = [Self::LeftToRight, Self::RightToLeft];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftToRight => "left-to-right",
            Self::RightToLeft => "right-to-left",
        }
    }
}

/// Candidate pruning strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Blocking {
    /// Every left record against every right record.
    Exhaustive,
    /// Records sharing the first `block_length` characters of the key.
    Prefix,
    /// Records sharing the `block_length`-character prefix of any token.
    #[default]
    Token,
}

impl Blocking {
    pub const ALL: [Self; 3] = [Self::Exhaustive, Self::Prefix, Self::Token];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhaustive => "exhaustive",
            Self::Prefix => "prefix",
            Self::Token => "token",
        }
    }
}

/// Treatment of empty or missing match keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyKeyPolicy {
    /// Empty keys score 0.0 and their records are reported unmatched.
    #[default]
    NeverMatch,
    /// Empty keys fail the join with [`JoinError::InvalidKey`].
    Error,
}

impl EmptyKeyPolicy {
    pub const ALL: [Self; 2] = [Self::NeverMatch, Self::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeverMatch => "never-match",
            Self::Error => "error",
        }
    }
}

macro_rules! named_enum {
    ($($ty:ident => $kind:literal),+ $(,)?) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = JoinError;

            /// Case-insensitive; underscores are accepted in place of dashes.
            fn from_str(s: &str) -> Result<Self> {
                let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == normalized)
                    .ok_or_else(|| {
                        let known: Vec<&str> = Self::ALL.iter().map(Self::as_str).collect();
                        JoinError::invalid_config(format!(
                            "unknown {} '{s}' (expected one of: {})",
                            $kind,
                            known.join(", ")
                        ))
                    })
            }
        }
    )+};
}

named_enum! {
    Metric => "metric",
    Cardinality => "cardinality",
    Direction => "direction",
    Blocking => "blocking strategy",
    EmptyKeyPolicy => "empty key policy",
}

/// Options of one join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JoinConfig {
    pub metric: Metric,
    /// Lowercase keys, replace punctuation with spaces and collapse whitespace.
    pub normalize: bool,
    /// Minimum accepted score, within `[0, 1]`.
    pub threshold: f64,
    pub cardinality: Cardinality,
    pub direction: Direction,
    pub blocking: Blocking,
    /// Prefix length used by prefix and token blocking.
    pub block_length: usize,
    pub keep_unmatched_left: bool,
    pub keep_unmatched_right: bool,
    pub score_field_name: String,
    pub left_suffix: String,
    pub right_suffix: String,
    /// Wall-clock budget checked between batches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<f64>,
    pub empty_keys: EmptyKeyPolicy,
    /// Left records scored between two timeout checks.
    pub batch_size: usize,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            metric: Metric::EditDistance,
            normalize: true,
            threshold: 0.8,
            cardinality: Cardinality::OneToOne,
            direction: Direction::LeftToRight,
            blocking: Blocking::Token,
            block_length: 3,
            keep_unmatched_left: false,
            keep_unmatched_right: false,
            score_field_name: "match_score".to_string(),
            left_suffix: "_left".to_string(),
            right_suffix: "_right".to_string(),
            timeout_seconds: None,
            empty_keys: EmptyKeyPolicy::NeverMatch,
            batch_size: 256,
        }
    }
}

impl JoinConfig {
    /// Parses a TOML document. Absent fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| JoinError::invalid_config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| JoinError::invalid_config(e.to_string()))
    }

    /// Checks every field that the type system does not.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(JoinError::invalid_config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.block_length == 0 {
            return Err(JoinError::invalid_config("block_length must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(JoinError::invalid_config("batch_size must be at least 1"));
        }
        if let Some(seconds) = self.timeout_seconds
            && (seconds <= 0.0 || Duration::try_from_secs_f64(seconds).is_err())
        {
            return Err(JoinError::invalid_config(format!(
                "timeout_seconds must be a positive number of seconds, got {seconds}"
            )));
        }
        if self.score_field_name.trim().is_empty() {
            return Err(JoinError::invalid_config("score_field_name must not be empty"));
        }
        if self.left_suffix == self.right_suffix {
            return Err(JoinError::invalid_config(format!(
                "left_suffix and right_suffix must differ, both are '{}'",
                self.left_suffix
            )));
        }
        Ok(())
    }

    /// The time budget, if one is configured and valid.
    pub fn budget(&self) -> Option<Duration> {
        self.timeout_seconds
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }

    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    #[must_use]
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_blocking(mut self, blocking: Blocking) -> Self {
        self.blocking = blocking;
        self
    }

    #[must_use]
    pub fn with_block_length(mut self, block_length: usize) -> Self {
        self.block_length = block_length;
        self
    }

    #[must_use]
    pub fn with_unmatched(mut self, keep_left: bool, keep_right: bool) -> Self {
        self.keep_unmatched_left = keep_left;
        self.keep_unmatched_right = keep_right;
        self
    }

    #[must_use]
    pub fn with_score_field(mut self, name: impl Into<String>) -> Self {
        self.score_field_name = name.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_empty_keys(mut self, policy: EmptyKeyPolicy) -> Self {
        self.empty_keys = policy;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

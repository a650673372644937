//! Error types for the join engine.

use std::time::Duration;

use fuzzjoin_model::{MatchResult, ModelError, Side};
use thiserror::Error;

/// Errors raised by a join.
///
/// Every variant except [`JoinError::Timeout`] aborts the call without output.
/// A timeout carries the partial result computed before the budget ran out.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum JoinError {
    /// Bad threshold, unknown enumeration name, or conflicting output layout.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Empty or missing key while empty keys are configured as errors.
    #[error("invalid {side} key{}: {reason}", .row.map(|r| format!(" at row {r}")).unwrap_or_default())]
    InvalidKey {
        /// Dataset holding the key.
        side: Side,
        /// Row of the offending record, when known.
        row: Option<usize>,
        /// Why the key was rejected.
        reason: String,
    },

    /// The time budget ran out before every left record was scanned.
    #[error(
        "matching timed out after {elapsed:?} (budget {budget:?}): {} of {} left records scanned",
        .partial.summary.left_scanned,
        .partial.summary.left_records
    )]
    Timeout {
        /// Result resolved from the records scanned so far, flagged `truncated`.
        partial: Box<MatchResult>,
        /// Configured budget.
        budget: Duration,
        /// Time spent before stopping.
        elapsed: Duration,
    },

    /// A match-key field is absent from a dataset's schema.
    #[error("{side} dataset '{dataset}' has no field '{field}' (available: {})", .available.join(", "))]
    SchemaMismatch {
        side: Side,
        dataset: String,
        field: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type alias for join operations.
pub type Result<T> = std::result::Result<T, JoinError>;

impl JoinError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Partial result of a timed-out join.
    pub fn partial(&self) -> Option<&MatchResult> {
        match self {
            Self::Timeout { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Consumes the error, returning the partial result of a timed-out join.
    pub fn into_partial(self) -> Option<MatchResult> {
        match self {
            Self::Timeout { partial, .. } => Some(*partial),
            _ => None,
        }
    }
}

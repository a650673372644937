//! Data model for fuzzy joins.
//!
//! - [`Dataset`] / [`Record`] / [`Value`]: the tabular inputs, read-only once built
//! - [`KeySelector`]: which field(s) form the match key on each side
//! - [`MatchResult`]: matches, summary counts and joined rows returned to the caller

#![deny(unsafe_code)]

pub mod dataset;
pub mod error;
pub mod key;
pub mod result;
pub mod value;

pub use dataset::{Dataset, Record, concat};
pub use error::{ModelError, Result};
pub use key::{KeySelector, ResolvedKey, Side};
pub use result::{
    CandidatePair, JoinedTable, Match, MatchResult, MatchSummary, ScoredPair,
};
pub use value::{Value, format_numeric};

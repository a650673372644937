//! Approximate-match join engine.
//!
//! Records of two [`Dataset`](fuzzjoin_model::Dataset)s are matched on keys
//! that need not be exactly equal. The pipeline runs in four stages:
//!
//! 1. **Scoring** ([`score`]): a [`SimilarityMetric`] maps two normalized keys
//!    to a similarity in `[0, 1]`.
//! 2. **Blocking** ([`blocking`]): a [`Blocker`] prunes the pairs worth scoring.
//! 3. **Matching** ([`matcher`]): threshold and cardinality select the accepted
//!    pairs.
//! 4. **Assembly** ([`assemble`]): accepted pairs become joined rows.
//!
//! [`FuzzyJoin`] wires the stages together from a [`JoinConfig`].

#![deny(unsafe_code)]

pub mod assemble;
pub mod blocking;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod score;

pub use assemble::{OutputLayout, assemble};
pub use blocking::{BlockKeys, Blocker, BlockingStrategy, CandidateGenerator, Candidates};
pub use config::{Blocking, Cardinality, Direction, EmptyKeyPolicy, JoinConfig, Metric};
pub use engine::{FuzzyJoin, fuzzy_join};
pub use error::{JoinError, Result};
pub use matcher::{Assignment, Matcher};
pub use normalize::{is_empty_key, normalize_key};
pub use score::{
    KeyScorer, SimilarityMetric, edit_similarity, phonetic_key, phonetic_similarity, soundex,
    token_set_similarity,
};

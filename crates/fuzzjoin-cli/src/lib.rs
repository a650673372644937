//! CLI library components for fuzzjoin.

#![deny(unsafe_code)]

pub mod logging;
pub mod pipeline;
pub mod settings;

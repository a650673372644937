//! Tabular I/O for fuzzy joins.
//!
//! CSV files are loaded through Polars and copied into
//! [`Dataset`](fuzzjoin_model::Dataset)s; joined rows are written back as CSV,
//! and full match results as JSON.

#![deny(unsafe_code)]

pub mod csv;
pub mod error;
pub mod json;
pub mod value;

pub use crate::csv::{
    dataset_from_frame, read_csv_dataset, read_csv_datasets, read_csv_frame, write_csv_file,
    write_csv_table,
};
pub use error::{IngestError, Result};
pub use json::{write_json, write_json_file};
pub use value::any_to_value;

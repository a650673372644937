//! CSV input and output.

mod reader;
mod writer;

pub use reader::{dataset_from_frame, read_csv_dataset, read_csv_datasets, read_csv_frame};
pub use writer::{write_csv_file, write_csv_table};

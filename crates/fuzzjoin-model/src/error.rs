use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("dataset '{dataset}': column name at position {position} is empty")]
    EmptyColumnName { dataset: String, position: usize },
    #[error("dataset '{dataset}': duplicate column '{column}'")]
    DuplicateColumn { dataset: String, column: String },
    #[error("dataset '{dataset}': row has {found} values, expected {expected}")]
    WidthMismatch {
        dataset: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;

//! CSV loading into datasets.

use std::path::{Path, PathBuf};

use fuzzjoin_model::{Dataset, concat};
use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::value::any_to_value;

fn check_readable(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if metadata.len() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Reads a CSV file with a single header row into a Polars DataFrame.
///
/// Every column is read as text, so cells such as `01234` keep their exact
/// spelling. Empty cells are null.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    check_readable(path)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(df)
}

/// Copies a DataFrame into a [`Dataset`]. Null cells become missing values.
pub fn dataset_from_frame(name: &str, df: &DataFrame) -> Result<Dataset> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| c.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut dataset = Dataset::new(name, columns)?;

    for row_idx in 0..df.height() {
        let mut row = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            row.push(any_to_value(col.get(row_idx)?));
        }
        dataset.push_row(row)?;
    }
    Ok(dataset)
}

/// Reads a CSV file into a dataset named after the file stem.
pub fn read_csv_dataset(path: &Path) -> Result<Dataset> {
    let df = read_csv_frame(path)?;
    let name = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
    let dataset = dataset_from_frame(&name, &df)?;
    tracing::info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Reads several CSV files and concatenates them.
///
/// Columns are the union of all files in first-seen order; cells a file
/// lacks are missing. A single path is read as-is.
pub fn read_csv_datasets(name: &str, paths: &[PathBuf]) -> Result<Dataset> {
    let datasets = paths
        .iter()
        .map(|path| read_csv_dataset(path))
        .collect::<Result<Vec<_>>>()?;
    match datasets.as_slice() {
        [single] => Ok(single.clone()),
        _ => Ok(concat(name, &datasets)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzjoin_model::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_dataset() {
        let file = create_temp_csv("id,name,score\n1,Jon Smith,2.5\n2,,3.0\n");
        let dataset = read_csv_dataset(file.path()).unwrap();

        assert_eq!(dataset.columns(), ["id", "name", "score"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(0, "id"), Some(&Value::from("1")));
        assert_eq!(dataset.get(0, "name"), Some(&Value::from("Jon Smith")));
        assert_eq!(dataset.get(1, "name"), Some(&Value::Missing));
        assert_eq!(dataset.get(1, "score"), Some(&Value::from("3.0")));
    }

    #[test]
    fn test_numeric_looking_cells_stay_text() {
        let file = create_temp_csv("zip\n01234\n00042\n");
        let dataset = read_csv_dataset(file.path()).unwrap();

        assert_eq!(dataset.get(0, "zip"), Some(&Value::from("01234")));
        assert_eq!(dataset.get(1, "zip"), Some(&Value::from("00042")));
    }

    #[test]
    fn test_late_text_in_numeric_column_loads() {
        let mut content = String::from("code\n");
        for i in 0..150 {
            content.push_str(&format!("{i}\n"));
        }
        content.push_str("A-17\n");
        let file = create_temp_csv(&content);

        let dataset = read_csv_dataset(file.path()).unwrap();

        assert_eq!(dataset.len(), 151);
        assert_eq!(dataset.get(149, "code"), Some(&Value::from("149")));
        assert_eq!(dataset.get(150, "code"), Some(&Value::from("A-17")));
    }

    #[test]
    fn test_missing_file() {
        let result = read_csv_dataset(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv("");
        let result = read_csv_dataset(file.path());
        assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
    }

    #[test]
    fn test_read_multiple_files_unions_columns() {
        let a = create_temp_csv("name,city\nJon,Bern\n");
        let b = create_temp_csv("name,segment\nMary,retail\n");
        let merged = read_csv_datasets(
            "customers",
            &[a.path().to_path_buf(), b.path().to_path_buf()],
        )
        .unwrap();

        assert_eq!(merged.name(), "customers");
        assert_eq!(merged.columns(), ["name", "city", "segment"]);
        assert_eq!(merged.get(1, "city"), Some(&Value::Missing));
        assert_eq!(merged.get(1, "segment"), Some(&Value::from("retail")));
    }
}

//! CSV output of joined rows.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fuzzjoin_model::{JoinedTable, Value};

use crate::error::{IngestError, Result};

/// Writes a joined table as CSV with a header row.
///
/// Missing values are written as `na_rep`; numbers are written without
/// trailing zeros.
pub fn write_csv_table<W: Write>(writer: W, table: &JoinedTable, na_rep: &str) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&table.columns)?;
    for row in &table.rows {
        csv.write_record(row.iter().map(|value| match value {
            Value::Missing => na_rep.to_string(),
            other => other.to_string(),
        }))?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes a joined table to a CSV file, replacing any existing file.
pub fn write_csv_file(path: &Path, table: &JoinedTable, na_rep: &str) -> Result<()> {
    let file = File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_csv_table(BufWriter::new(file), table, na_rep)?;
    tracing::info!(path = %path.display(), rows = table.len(), "Wrote CSV output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> JoinedTable {
        JoinedTable {
            columns: vec!["name".into(), "note".into(), "match_score".into()],
            rows: vec![
                vec!["Smith, Jon".into(), Value::Missing, 0.9.into()],
                vec!["Kim".into(), true.into(), Value::Missing],
            ],
        }
    }

    #[test]
    fn test_write_csv_table() {
        let mut out = Vec::new();
        write_csv_table(&mut out, &table(), "").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name,note,match_score\n\"Smith, Jon\",,0.9\nKim,true,\n"
        );
    }

    #[test]
    fn test_na_rep() {
        let mut out = Vec::new();
        write_csv_table(&mut out, &table(), "NA").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"Smith, Jon\",NA,0.9\n"));
        assert!(text.ends_with("Kim,true,NA\n"));
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joined.csv");
        write_csv_file(&path, &table(), "").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("name,note,match_score\n"));
    }
}

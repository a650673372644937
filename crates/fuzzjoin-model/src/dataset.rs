use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::value::Value;

/// One row of a [`Dataset`], with values aligned to the dataset's columns.
///
/// A record's identity is its position in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// An ordered sequence of records sharing one set of column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Creates an empty dataset. Column names must be non-empty and unique.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        for (position, column) in columns.iter().enumerate() {
            if column.trim().is_empty() {
                return Err(ModelError::EmptyColumnName {
                    dataset: name,
                    position,
                });
            }
            if !seen.insert(column.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    dataset: name,
                    column: column.clone(),
                });
            }
        }
        Ok(Self {
            name,
            columns,
            records: Vec::new(),
        })
    }

    /// Builds a dataset from rows of values in column order.
    pub fn from_rows<I, S, R>(name: impl Into<String>, columns: I, rows: R) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        let mut dataset = Self::new(name, columns)?;
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Appends a row. Its width must equal the number of columns.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(ModelError::WidthMismatch {
                dataset: self.name.clone(),
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        self.records.push(Record { values });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == field)
    }

    pub fn get(&self, row: usize, field: &str) -> Option<&Value> {
        let column = self.column_index(field)?;
        self.records.get(row)?.get(column)
    }
}

/// Concatenates datasets whose schemas may differ.
///
/// The result carries the union of all columns in first-seen order. Records
/// keep their source order, and a column a source dataset lacks is filled
/// with [`Value::Missing`].
pub fn concat(name: impl Into<String>, datasets: &[Dataset]) -> Result<Dataset> {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
    for dataset in datasets {
        for column in dataset.columns() {
            if !positions.contains_key(column.as_str()) {
                positions.insert(column.as_str(), columns.len());
                columns.push(column.clone());
            }
        }
    }

    let mut out = Dataset::new(name, columns.iter().cloned())?;
    for dataset in datasets {
        let targets: Vec<usize> = dataset
            .columns()
            .iter()
            .map(|c| positions[c.as_str()])
            .collect();
        for record in dataset.records() {
            let mut values = vec![Value::Missing; columns.len()];
            for (value, &target) in record.values().iter().zip(&targets) {
                values[target] = value.clone();
            }
            out.push_row(values)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Dataset {
        Dataset::from_rows(
            "people",
            ["id", "name"],
            vec![
                vec![1.into(), "Jon Smith".into()],
                vec![2.into(), "Jane Doe".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_and_empty_columns() {
        let err = Dataset::new("d", ["id", "id"]).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateColumn { .. }));
        let err = Dataset::new("d", ["id", " "]).unwrap_err();
        assert_eq!(
            err,
            ModelError::EmptyColumnName {
                dataset: "d".to_string(),
                position: 1
            }
        );
    }

    #[test]
    fn rejects_rows_of_wrong_width() {
        let mut dataset = people();
        let err = dataset.push_row(vec![3.into()]).unwrap_err();
        assert_eq!(err.to_string(), "dataset 'people': row has 1 values, expected 2");
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn get_by_field_name() {
        let dataset = people();
        assert_eq!(dataset.get(1, "name"), Some(&Value::from("Jane Doe")));
        assert_eq!(dataset.get(1, "age"), None);
        assert_eq!(dataset.get(5, "name"), None);
    }

    #[test]
    fn concat_unions_schemas_with_missing_marker() {
        let extra = Dataset::from_rows(
            "extra",
            ["name", "city"],
            vec![vec!["Mary".into(), "Bern".into()]],
        )
        .unwrap();
        let merged = concat("all", &[people(), extra]).unwrap();

        assert_eq!(merged.columns(), ["id", "name", "city"]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(0, "city"), Some(&Value::Missing));
        assert_eq!(merged.get(2, "id"), Some(&Value::Missing));
        assert_eq!(merged.get(2, "name"), Some(&Value::from("Mary")));
    }
}

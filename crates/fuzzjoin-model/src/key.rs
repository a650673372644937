use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Which input of a join a record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Selects the match key of a record: one field, or several fields joined
/// by a separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySelector {
    Field(String),
    Composite { fields: Vec<String>, separator: String },
}

impl KeySelector {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Composite key joined with a single space.
    pub fn composite<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Composite {
            fields: fields.into_iter().map(Into::into).collect(),
            separator: " ".to_string(),
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Field(name) => vec![name.as_str()],
            Self::Composite { fields, .. } => fields.iter().map(String::as_str).collect(),
        }
    }

    /// Resolves field names to column positions.
    ///
    /// Returns the first field the dataset does not have as the error.
    pub fn resolve(&self, dataset: &Dataset) -> Result<ResolvedKey, String> {
        let mut columns = Vec::new();
        for field in self.fields() {
            let index = dataset
                .column_index(field)
                .ok_or_else(|| field.to_string())?;
            columns.push(index);
        }
        let separator = match self {
            Self::Field(_) => String::new(),
            Self::Composite { separator, .. } => separator.clone(),
        };
        Ok(ResolvedKey { columns, separator })
    }
}

impl fmt::Display for KeySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields().join("+"))
    }
}

/// A [`KeySelector`] bound to the column positions of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    columns: Vec<usize>,
    separator: String,
}

impl ResolvedKey {
    /// Key text of a record, or `None` when every key part is missing.
    pub fn extract(&self, dataset: &Dataset, row: usize) -> Option<String> {
        let record = dataset.records().get(row)?;
        let parts: Vec<String> = self
            .columns
            .iter()
            .filter_map(|&column| record.get(column)?.as_key_text())
            .map(Cow::into_owned)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(&self.separator))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn dataset() -> Dataset {
        Dataset::from_rows(
            "people",
            ["first", "last", "zip"],
            vec![
                vec!["Jon".into(), "Smith".into(), 3000.into()],
                vec![Value::Missing, "Doe".into(), Value::Missing],
                vec![Value::Missing, Value::Missing, Value::Missing],
            ],
        )
        .unwrap()
    }

    #[test]
    fn single_field_key() {
        let data = dataset();
        let key = KeySelector::field("zip").resolve(&data).unwrap();
        assert_eq!(key.extract(&data, 0).as_deref(), Some("3000"));
        assert_eq!(key.extract(&data, 1), None);
    }

    #[test]
    fn composite_key_skips_missing_parts() {
        let data = dataset();
        let key = KeySelector::composite(["first", "last"])
            .resolve(&data)
            .unwrap();
        assert_eq!(key.extract(&data, 0).as_deref(), Some("Jon Smith"));
        assert_eq!(key.extract(&data, 1).as_deref(), Some("Doe"));
        assert_eq!(key.extract(&data, 2), None);
    }

    #[test]
    fn unknown_field_is_reported() {
        let data = dataset();
        let err = KeySelector::composite(["first", "middle"])
            .resolve(&data)
            .unwrap_err();
        assert_eq!(err, "middle");
    }
}

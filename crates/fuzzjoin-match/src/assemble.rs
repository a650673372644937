//! Joined row assembly.

use std::collections::BTreeSet;

use fuzzjoin_model::{Dataset, JoinedTable, Match, Value};

use crate::config::JoinConfig;
use crate::error::{JoinError, Result};

/// Output columns of a join: left columns, right columns, score field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    columns: Vec<String>,
    left_width: usize,
    right_width: usize,
}

impl OutputLayout {
    /// Plans the output columns.
    ///
    /// Names present in both schemas get `left_suffix` / `right_suffix`.
    /// Fails if any output name still collides, the score field included.
    pub fn plan(left: &[String], right: &[String], config: &JoinConfig) -> Result<Self> {
        let left_names: BTreeSet<&str> = left.iter().map(String::as_str).collect();
        let right_names: BTreeSet<&str> = right.iter().map(String::as_str).collect();

        let mut columns = Vec::with_capacity(left.len() + right.len() + 1);
        for name in left {
            if right_names.contains(name.as_str()) {
                columns.push(format!("{name}{}", config.left_suffix));
            } else {
                columns.push(name.clone());
            }
        }
        for name in right {
            if left_names.contains(name.as_str()) {
                columns.push(format!("{name}{}", config.right_suffix));
            } else {
                columns.push(name.clone());
            }
        }
        columns.push(config.score_field_name.clone());

        let mut seen = BTreeSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(JoinError::invalid_config(format!(
                    "output column '{name}' would appear twice; \
                     choose another score field name or conflict suffixes"
                )));
            }
        }

        Ok(Self {
            columns,
            left_width: left.len(),
            right_width: right.len(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn score_field(&self) -> &str {
        self.columns.last().map_or("", String::as_str)
    }
}

/// Builds the joined rows for `matches`, in their order.
///
/// Unmatched entries produce rows only when the config keeps that side;
/// the absent side and the score are [`Value::Missing`]. Neither dataset is
/// modified.
pub fn assemble(
    matches: &[Match],
    left: &Dataset,
    right: &Dataset,
    layout: &OutputLayout,
    config: &JoinConfig,
) -> JoinedTable {
    let left_records = left.records();
    let right_records = right.records();
    let missing = |width: usize| std::iter::repeat_n(Value::Missing, width);

    let mut rows = Vec::with_capacity(matches.len());
    for entry in matches {
        let row: Vec<Value> = match *entry {
            Match::Matched(pair) => {
                let (Some(l), Some(r)) = (left_records.get(pair.left), right_records.get(pair.right))
                else {
                    continue;
                };
                l.values()
                    .iter()
                    .chain(r.values())
                    .cloned()
                    .chain([Value::Float(pair.score)])
                    .collect()
            }
            Match::UnmatchedLeft { left } if config.keep_unmatched_left => {
                let Some(l) = left_records.get(left) else {
                    continue;
                };
                l.values()
                    .iter()
                    .cloned()
                    .chain(missing(layout.right_width + 1))
                    .collect()
            }
            Match::UnmatchedRight { right } if config.keep_unmatched_right => {
                let Some(r) = right_records.get(right) else {
                    continue;
                };
                missing(layout.left_width)
                    .chain(r.values().iter().cloned())
                    .chain(missing(1))
                    .collect()
            }
            Match::UnmatchedLeft { .. } | Match::UnmatchedRight { .. } => continue,
        };
        rows.push(row);
    }

    JoinedTable {
        columns: layout.columns.clone(),
        rows,
    }
}

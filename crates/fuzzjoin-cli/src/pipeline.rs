//! File-level join: load CSV inputs, run the engine, write outputs.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use fuzzjoin_ingest::{
    read_csv_dataset, read_csv_datasets, write_csv_file, write_csv_table, write_json_file,
};
use fuzzjoin_match::{FuzzyJoin, JoinConfig, JoinError};
use fuzzjoin_model::{KeySelector, MatchResult};
use tracing::{info_span, warn};

/// Everything needed to join two sets of CSV files.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub left: PathBuf,
    /// One or more right files, concatenated before matching.
    pub right: Vec<PathBuf>,
    pub left_key: KeySelector,
    pub right_key: KeySelector,
    pub config: JoinConfig,
    /// CSV destination; joined rows go to stdout when neither output is set.
    pub csv_output: Option<PathBuf>,
    pub json_output: Option<PathBuf>,
    /// Text written for missing cells in CSV output.
    pub na_rep: String,
}

/// Result of [`run_join`].
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub left_name: String,
    pub right_name: String,
    pub result: MatchResult,
    pub elapsed: Duration,
    pub outputs: Vec<PathBuf>,
}

/// Parses a comma-separated field list into a key selector.
///
/// A single field selects that field; several fields form a composite key
/// joined with a space.
pub fn parse_key(spec: &str) -> Result<KeySelector> {
    let fields: Vec<&str> = spec
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    match fields.as_slice() {
        [] => bail!("key must name at least one field"),
        [single] => Ok(KeySelector::field(*single)),
        many => Ok(KeySelector::composite(many.iter().copied())),
    }
}

/// Runs a join described by `request`.
///
/// A timed-out join is not an error here: its partial result is written like
/// any other and flagged `truncated`.
pub fn run_join(request: &JoinRequest) -> Result<JoinOutcome> {
    if request.right.is_empty() {
        bail!("at least one right input is required");
    }
    let engine = FuzzyJoin::new(request.config.clone()).context("invalid join configuration")?;
    let start = Instant::now();

    let left = read_csv_dataset(&request.left)
        .with_context(|| format!("load left input: {}", request.left.display()))?;
    let right = read_csv_datasets("right", &request.right).context("load right input")?;

    let result = info_span!("join", left = left.name(), right = right.name()).in_scope(|| {
        match engine.join(&left, &right, &request.left_key, &request.right_key) {
            Ok(result) => Ok(result),
            Err(JoinError::Timeout {
                partial,
                budget,
                elapsed,
            }) => {
                warn!(?budget, ?elapsed, "join truncated by timeout");
                Ok(*partial)
            }
            Err(error) => Err(error),
        }
    })?;

    let mut outputs = Vec::new();
    if let Some(path) = &request.csv_output {
        write_csv_file(path, &result.output, &request.na_rep)
            .with_context(|| format!("write CSV output: {}", path.display()))?;
        outputs.push(path.clone());
    }
    if let Some(path) = &request.json_output {
        write_json_file(path, &result)
            .with_context(|| format!("write JSON output: {}", path.display()))?;
        outputs.push(path.clone());
    }
    if outputs.is_empty() {
        write_csv_table(io::stdout().lock(), &result.output, &request.na_rep)
            .context("write CSV to stdout")?;
    }

    Ok(JoinOutcome {
        left_name: left.name().to_string(),
        right_name: right.name().to_string(),
        result,
        elapsed: start.elapsed(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_builds_selectors() {
        assert_eq!(parse_key("name").unwrap(), KeySelector::field("name"));
        assert_eq!(
            parse_key("first, last").unwrap(),
            KeySelector::composite(["first", "last"])
        );
        assert!(parse_key(" , ").is_err());
    }
}

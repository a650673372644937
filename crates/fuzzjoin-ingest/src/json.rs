//! JSON output of match results.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fuzzjoin_model::MatchResult;

use crate::error::{IngestError, Result};

/// Writes a match result as pretty-printed JSON. Missing cells are `null`.
pub fn write_json<W: Write>(mut writer: W, result: &MatchResult) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, result)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_json_file(path: &Path, result: &MatchResult) -> Result<()> {
    let file = File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_json(BufWriter::new(file), result)?;
    tracing::info!(path = %path.display(), matches = result.matches.len(), "Wrote JSON output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzjoin_model::{JoinedTable, Match, ScoredPair, Value};

    #[test]
    fn test_write_json() {
        let result = MatchResult {
            matches: vec![Match::Matched(ScoredPair {
                left: 0,
                right: 1,
                score: 0.5,
            })],
            output: JoinedTable {
                columns: vec!["name".into(), "match_score".into()],
                rows: vec![vec![Value::Missing, 0.5.into()]],
            },
            ..MatchResult::default()
        };

        let mut out = Vec::new();
        write_json(&mut out, &result).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["matches"][0]["kind"], "matched");
        assert_eq!(parsed["matches"][0]["right"], 1);
        assert_eq!(parsed["output"]["rows"][0][0], serde_json::Value::Null);
        assert_eq!(parsed["truncated"], false);

        let back: MatchResult = serde_json::from_slice(&out).unwrap();
        assert_eq!(back, result);
    }
}

//! Integration tests for file-level joins.

use std::fs;
use std::path::{Path, PathBuf};

use fuzzjoin_cli::pipeline::{JoinRequest, parse_key, run_join};
use fuzzjoin_match::{Blocking, JoinConfig};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn request(left: PathBuf, right: Vec<PathBuf>, dir: &Path) -> JoinRequest {
    JoinRequest {
        left,
        right,
        left_key: parse_key("name").unwrap(),
        right_key: parse_key("name").unwrap(),
        config: JoinConfig::default(),
        csv_output: Some(dir.join("joined.csv")),
        json_output: None,
        na_rep: "NA".to_string(),
    }
}

#[test]
fn test_join_writes_csv_and_json() {
    let dir = TempDir::new().unwrap();
    let left = write_file(
        dir.path(),
        "people.csv",
        "id,name\n1,Jon Smith\n2,Mary Jones\n3,Zed Zulu\n",
    );
    let right = write_file(
        dir.path(),
        "towns.csv",
        "name,city\nJohn Smith,Bern\nMaria Jones,Basel\nAnn Lee,Chur\n",
    );
    let mut request = request(left, vec![right], dir.path());
    request.config = JoinConfig::default().with_unmatched(true, false);
    request.json_output = Some(dir.path().join("result.json"));

    let outcome = run_join(&request).unwrap();

    assert_eq!(outcome.left_name, "people");
    assert!(!outcome.result.truncated);
    assert_eq!(outcome.result.summary.matched, 2);
    assert_eq!(outcome.outputs.len(), 2);

    let csv = fs::read_to_string(dir.path().join("joined.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,name_left,name_right,city,match_score");
    assert!(lines[1].starts_with("1,Jon Smith,John Smith,Bern,"));
    assert!(lines[2].starts_with("2,Mary Jones,Maria Jones,Basel,"));
    assert_eq!(lines[3], "3,Zed Zulu,NA,NA,NA");
    assert_eq!(lines.len(), 4);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("result.json")).unwrap())
            .unwrap();
    assert_eq!(json["summary"]["matched"], 2);
    assert_eq!(json["summary"]["unmatched_left"], 1);
    assert_eq!(json["truncated"], false);
    assert_eq!(json["output"]["rows"][2][2], serde_json::Value::Null);
}

#[test]
fn test_join_concatenates_right_inputs() {
    let dir = TempDir::new().unwrap();
    let left = write_file(dir.path(), "left.csv", "name\nJon Smith\nMary Jones\n");
    let first = write_file(dir.path(), "a.csv", "name,city\nJohn Smith,Bern\n");
    let second = write_file(dir.path(), "b.csv", "name,zip\nMaria Jones,4000\n");

    let outcome = run_join(&request(left, vec![first, second], dir.path())).unwrap();

    assert_eq!(outcome.result.summary.right_records, 2);
    assert_eq!(outcome.result.summary.matched, 2);
    assert_eq!(
        outcome.result.output.columns,
        ["name_left", "name_right", "city", "zip", "match_score"]
    );
    assert_eq!(
        outcome.result.output.get(1, "city"),
        Some(&fuzzjoin_model::Value::Missing)
    );
}

#[test]
fn test_timeout_writes_partial_result() {
    let dir = TempDir::new().unwrap();
    let mut left = String::from("name\n");
    for i in 0..300 {
        left.push_str(&format!("record {i:04}\n"));
    }
    let left = write_file(dir.path(), "left.csv", &left);
    let right = write_file(dir.path(), "right.csv", "name\nrecord 0000\nrecord 0001\n");

    let mut request = request(left, vec![right], dir.path());
    request.config = JoinConfig::default()
        .with_blocking(Blocking::Exhaustive)
        .with_batch_size(64)
        .with_timeout(1e-9);

    let outcome = run_join(&request).unwrap();

    assert!(outcome.result.truncated);
    assert_eq!(outcome.result.summary.left_scanned, 64);
    assert_eq!(outcome.result.summary.left_records, 300);
    assert!(dir.path().join("joined.csv").exists());
}

#[test]
fn test_unknown_key_field_is_an_error() {
    let dir = TempDir::new().unwrap();
    let left = write_file(dir.path(), "left.csv", "name\nJon\n");
    let right = write_file(dir.path(), "right.csv", "title\nJon\n");

    let err = run_join(&request(left, vec![right], dir.path())).unwrap_err();

    assert!(format!("{err:#}").contains("name"));
    assert!(!dir.path().join("joined.csv").exists());
}

#[test]
fn test_missing_input_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let right = write_file(dir.path(), "right.csv", "name\nJon\n");

    let err = run_join(&request(dir.path().join("absent.csv"), vec![right], dir.path()))
        .unwrap_err();

    assert!(format!("{err:#}").contains("load left input"));
}

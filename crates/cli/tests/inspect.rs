use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn pairs() -> Command {
    let mut cmd = Command::cargo_bin("pairs").expect("binary");
    cmd.env_remove("PAIRS_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_dataset(root: &Path) {
    fs::write(
        root.join("dataset.jsonl"),
        [
            r#"{"id":"alpaca::0","source":"alpaca","input":"Write a sorting function","output":"def sort(xs): return sorted(xs)","intent":"code","cluster":0}"#,
            r#"{"id":"alpaca::1","source":"alpaca","input":"Explain recursion","output":"A function calling itself","intent":"qa","cluster":1}"#,
            r#"{"id":"dolly::2","source":"dolly","input":"Write a function to sort","output":"Use the sort method","intent":"code","cluster":0}"#,
            "",
            r#"{"id":"dolly::3","source":"dolly","input":"Who wrote Hamlet?","output":"Shakespeare","intent":"qa","cluster":1}"#,
        ]
        .join("\n"),
    )
    .unwrap();
}

#[test]
fn evaluate_reports_metrics_as_json() {
    let temp = tempdir().unwrap();
    write_dataset(temp.path());

    let output = pairs()
        .current_dir(temp.path())
        .args(["evaluate", "dataset.jsonl", "--json"])
        .args(["--out-md", "reports/eval.md", "--out-json", "reports/eval.json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["total_pairs"], 4);
    assert_eq!(body["sources"]["alpaca"], 2);
    assert_eq!(body["intents"]["code"], 2);
    assert_eq!(body["clusters"]["0"], 2);
    assert_eq!(body["input_length"]["min"], 2);
    assert_eq!(body["quality_metrics"]["balance_score"], 1.0);
    assert_eq!(body["verdict"], "fair");

    let md = fs::read_to_string(temp.path().join("reports/eval.md")).unwrap();
    assert!(md.contains("# Dataset quality report"));
    let saved: Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("reports/eval.json")).unwrap())
            .unwrap();
    assert_eq!(saved["total_pairs"], 4);
}

#[test]
fn evaluate_prints_markdown_by_default() {
    let temp = tempdir().unwrap();
    write_dataset(temp.path());

    pairs()
        .current_dir(temp.path())
        .args(["evaluate", "dataset.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Quality"))
        .stdout(predicate::str::contains("**Overall:**"));
}

#[test]
fn analyze_reports_clusters_and_sources() {
    let temp = tempdir().unwrap();
    write_dataset(temp.path());

    let output = pairs()
        .current_dir(temp.path())
        .args(["analyze", "dataset.jsonl", "--json", "--dim", "256"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let clusters = body["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0]["size"], 2);
    assert_eq!(clusters[0]["top_intent"], "code");
    assert_eq!(clusters[0]["example"], "Write a sorting function");
    assert_eq!(body["overlap"]["alpaca"]["dolly"], 2);
    assert_eq!(body["total_overlaps"], 2);
    assert_eq!(body["similarity"]["alpaca"]["alpaca"], 1.0);
    assert_eq!(body["reclustered"], false);
}

#[test]
fn analyze_reclusters_unlabeled_dataset() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("plain.jsonl"),
        [
            r#"{"source":"alpaca","input":"rust borrow checker","output":"ownership rules"}"#,
            r#"{"source":"alpaca","input":"medieval french poetry","output":"troubadour verse"}"#,
            r#"{"source":"dolly","input":"rust borrow checker","output":"ownership rules"}"#,
            r#"{"source":"dolly","input":"medieval french poetry","output":"troubadour verse"}"#,
        ]
        .join("\n"),
    )
    .unwrap();

    let output = pairs()
        .current_dir(temp.path())
        .args(["analyze", "plain.jsonl", "--json", "--dim", "256"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["reclustered"], true);
    let clusters = body["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 2);
    for cluster in clusters {
        assert!(cluster["cluster"].as_i64().unwrap() >= 0);
        assert_eq!(cluster["size"], 2);
        assert_eq!(cluster["sources"].as_object().unwrap().len(), 2);
    }
    assert_eq!(body["overlap"]["alpaca"]["dolly"], 2);
}

#[test]
fn analyze_recluster_flag_overrides_labels() {
    let temp = tempdir().unwrap();
    write_dataset(temp.path());

    let output = pairs()
        .current_dir(temp.path())
        .args(["analyze", "dataset.jsonl", "--json", "--recluster", "--k", "1"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["reclustered"], true);
    let clusters = body["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0]["size"], 4);
    assert_eq!(body["total_overlaps"], 1);
}

#[test]
fn missing_dataset_fails() {
    let temp = tempdir().unwrap();
    pairs()
        .current_dir(temp.path())
        .args(["evaluate", "absent.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.jsonl"));
}

//! End-to-end tests for the `ontolink` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ontolink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ontolink"))
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("LOG_FILE")
        .output()
        .expect("failed to run ontolink")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

fn write_eval_fixtures(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let pred = dir.join("pred");
    let gold = dir.join("gold.json");
    fs::create_dir(&pred).unwrap();
    fs::write(
        pred.join("a.json"),
        r#"{"doc": "a.txt", "matches": [
            {"start": 0, "end": 6, "uri": "U1", "surface": "Barolo"},
            {"start": 10, "end": 15, "uri": "U2", "surface": "Soave"}
        ]}"#,
    )
    .unwrap();
    fs::write(
        &gold,
        r#"[{"doc": "a.txt", "start": 0, "end": 6, "uri": "U1"},
            {"doc": "b.txt", "start": 0, "end": 4, "uri": "U3"}]"#,
    )
    .unwrap();
    (pred, gold)
}

#[test]
fn test_evaluate_prints_summary() {
    let dir = TempDir::new().unwrap();
    let (pred, gold) = write_eval_fixtures(dir.path());

    let out = ontolink(&["evaluate", arg(&pred), arg(&gold)]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "TP=1 FP=1 FN=1\nPrecision: 50.00%  Recall: 50.00%  F1: 50.00%\n"
    );
}

#[test]
fn test_evaluate_per_doc_and_json() {
    let dir = TempDir::new().unwrap();
    let (pred, gold) = write_eval_fixtures(dir.path());

    let out = ontolink(&["evaluate", arg(&pred), arg(&gold), "--per-doc"]);
    let text = stdout(&out);
    assert!(text.contains("a.txt: TP=1 FP=1 FN=0"));
    assert!(text.contains("b.txt: TP=0 FP=0 FN=1"));

    let out = ontolink(&["evaluate", arg(&pred), arg(&gold), "--format", "json"]);
    let metrics: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(metrics["tp"], 1);
    assert_eq!(metrics["fn"], 1);
    assert_eq!(metrics["precision"], 0.5);
}

#[test]
fn test_evaluate_missing_path_fails() {
    let dir = TempDir::new().unwrap();
    let (pred, _) = write_eval_fixtures(dir.path());

    let out = ontolink(&["evaluate", arg(&pred), arg(&dir.path().join("nope"))]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error:"));
}

#[test]
fn test_help_exits_zero() {
    let out = ontolink(&["--help"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("match-semantic"));
}

#[test]
fn test_match_exact_writes_doc_blocks() {
    let dir = TempDir::new().unwrap();
    let forms = dir.path().join("forms.csv");
    let corpus = dir.path().join("corpus");
    let output = dir.path().join("output");
    fs::write(&forms, "uri,form\nhttp://ex.org/wine/Barolo,Barolo\n").unwrap();
    fs::create_dir(&corpus).unwrap();
    fs::write(corpus.join("review.txt"), "Un café et un Barolo.").unwrap();
    fs::write(corpus.join("ignored.md"), "Barolo").unwrap();

    let out = ontolink(&[
        "match-exact",
        arg(&corpus),
        "--output",
        arg(&output),
        "--forms",
        arg(&forms),
    ]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "review.txt: 1 matches\n");

    let written: Value =
        serde_json::from_str(&fs::read_to_string(output.join("review.json")).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "doc": "review.txt",
            "matches": [{
                "doc": "review.txt",
                "start": 14,
                "end": 20,
                "uri": "http://ex.org/wine/Barolo",
                "form": "Barolo"
            }]
        })
    );
    assert!(!output.join("ignored.json").exists());
}

#[test]
fn test_export_rdf_to_stdout() {
    let dir = TempDir::new().unwrap();
    let preds = dir.path().join("preds.json");
    fs::write(
        &preds,
        r#"[{"doc": "a.txt", "start": 0, "end": 6, "uri": "http://ex.org/wine/Barolo"}]"#,
    )
    .unwrap();

    let out = ontolink(&["export-rdf", arg(&preds)]);
    assert!(out.status.success());
    let ttl = stdout(&out);
    assert!(ttl.starts_with("@prefix oa:"));
    assert!(ttl.contains("<ann_0> a oa:Annotation ;"));
    assert!(ttl.contains("oa:hasBody <http://ex.org/wine/Barolo> ;"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_build_index_then_match_semantic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({"input": ["Barolo", "Paris"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"embedding": [1.0, 0.0], "index": 0},
                {"embedding": [0.0, 1.0], "index": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({"input": ["I drank Barolo in Paris."]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [1.0, 0.0], "index": 0}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    let base_url = server.uri();

    let outputs = tokio::task::spawn_blocking(move || {
        let forms = root.join("forms.csv");
        let index = root.join("res/ont_index.bin");
        let labels = root.join("res/labels.json");
        let doc = root.join("trip.txt");
        let output = root.join("out");
        fs::write(
            &forms,
            "uri,form\nhttp://ex.org/wine/Barolo,Barolo\nhttp://ex.org/place/Paris,Paris\n",
        )
        .unwrap();
        fs::write(&doc, "I drank Barolo in Paris.").unwrap();

        let build = ontolink(&[
            "build-index",
            "--forms",
            arg(&forms),
            "--index",
            arg(&index),
            "--labels",
            arg(&labels),
            "--base-url",
            &base_url,
        ]);
        let matched = ontolink(&[
            "match-semantic",
            arg(&doc),
            "--output",
            arg(&output),
            "--index",
            arg(&index),
            "--labels",
            arg(&labels),
            "--base-url",
            &base_url,
            "--no-chat",
        ]);
        let written = fs::read_to_string(output.join("trip_llm.json")).unwrap_or_default();
        (build, matched, written)
    })
    .await
    .unwrap();

    let (build, matched, written) = outputs;
    assert!(build.status.success(), "{}", String::from_utf8_lossy(&build.stderr));
    assert!(stdout(&build).contains("Indexed 2 surface forms (dimension 2)"));
    assert!(matched.status.success(), "{}", String::from_utf8_lossy(&matched.stderr));

    let annotations: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(
        annotations,
        json!([{
            "doc": "trip.txt",
            "start": 8,
            "end": 14,
            "uri": "http://ex.org/wine/Barolo",
            "form": "Barolo",
            "score": 1.0
        }])
    );
}

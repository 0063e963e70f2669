//! Loading annotation files and directories from disk.

use std::fs;

use ontolink_eval::{evaluate, load_annotations, AnnotationSet, Error, NormalizedRecord};
use tempfile::TempDir;

fn rec(doc: &str, start: usize, end: usize, uri: &str) -> NormalizedRecord {
    NormalizedRecord::new(doc, start, end, uri)
}

fn set(records: &[NormalizedRecord]) -> AnnotationSet {
    records.iter().cloned().collect()
}

#[test]
fn test_directory_union_of_json_files() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("a.json"),
        r#"{"doc": "a.txt", "matches": [{"start": 0, "end": 6, "uri": "U1", "surface": "Barolo"}]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b_llm.json"),
        r#"[{"doc": "b.txt", "start": 3, "end": 9, "uri": "U2", "form": "Soave", "score": 0.81}]"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not json").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(
        dir.path().join("nested/c.json"),
        r#"[{"doc": "c.txt", "start": 0, "end": 1, "uri": "U3"}]"#,
    )
    .unwrap();

    let loaded = load_annotations(dir.path()).unwrap();
    assert_eq!(loaded, set(&[rec("a.txt", 0, 6, "U1"), rec("b.txt", 3, 9, "U2")]));
}

#[test]
fn test_same_record_in_two_files_counts_once() {
    let dir = TempDir::new().unwrap();
    let body = r#"[{"doc": "a.txt", "start": 0, "end": 6, "uri": "U1"}]"#;
    fs::write(dir.path().join("one.json"), body).unwrap();
    fs::write(dir.path().join("two.json"), body).unwrap();

    assert_eq!(load_annotations(dir.path()).unwrap().len(), 1);
}

#[test]
fn test_single_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("gold.json");
    fs::write(&file, r#"{"doc": "a.txt", "start": 0, "end": 6, "uri": "U1"}"#).unwrap();

    assert_eq!(load_annotations(&file).unwrap(), set(&[rec("a.txt", 0, 6, "U1")]));
}

#[test]
fn test_json_extension_fallback() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("gold.json"),
        r#"[{"doc": "a.txt", "start": 0, "end": 6, "uri": "U1"}]"#,
    )
    .unwrap();

    let loaded = load_annotations(dir.path().join("gold")).unwrap();
    assert_eq!(loaded.len(), 1);

    // an existing extension is replaced, not extended
    let loaded = load_annotations(dir.path().join("gold.txt")).unwrap();
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_missing_path_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = load_annotations(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_empty_directory_is_empty_set() {
    let dir = TempDir::new().unwrap();
    assert!(load_annotations(dir.path()).unwrap().is_empty());
}

#[test]
fn test_invalid_json_names_the_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), "{not json").unwrap();

    let err = load_annotations(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_top_level_scalar_is_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("scalar.json");
    fs::write(&file, "42").unwrap();
    assert!(load_annotations(&file).is_err());
}

#[test]
fn test_prediction_and_gold_shapes_compare() {
    let dir = TempDir::new().unwrap();
    let pred = dir.path().join("pred.json");
    let gold = dir.path().join("gold.json");
    fs::write(
        &pred,
        r#"[{"doc": "a.txt", "matches": [
            {"start": 0, "end": 6, "uri": "U1"},
            {"start": "10", "end": 15.0, "uri": "U2"}
        ]}]"#,
    )
    .unwrap();
    fs::write(
        &gold,
        r#"[{"doc": "a.txt", "start": 0, "end": 6, "uri": "U1"},
            {"doc": "a.txt", "start": 20, "end": 25, "uri": "U3"}]"#,
    )
    .unwrap();

    let m = evaluate(
        &load_annotations(&pred).unwrap(),
        &load_annotations(&gold).unwrap(),
    );
    assert_eq!((m.true_positives, m.false_positives, m.false_negatives), (1, 1, 1));
    assert!((m.f1 - 0.5).abs() < 1e-9);
}

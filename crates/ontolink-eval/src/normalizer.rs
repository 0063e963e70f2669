//! Annotation file loading and normalization.
//!
//! Prediction and gold files come in four JSON shapes:
//!
//! | Shape | Example |
//! |-------|---------|
//! | annotation list | `[{"doc": "a", "start": 0, "end": 6, "uri": "..."}]` |
//! | doc-block list | `[{"doc": "a", "matches": [{"start": 0, ...}]}]` |
//! | doc block | `{"doc": "a", "matches": [...]}` |
//! | single annotation | `{"doc": "a", "start": 0, "end": 6, "uri": "..."}` |
//!
//! All of them reduce to a set of `(doc, start, end, uri)` records. Malformed
//! records are skipped with a warning; malformed files are errors.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use ontolink_core::{defaults, AnnotationSet, Error, NormalizedRecord, Result};

/// A parsed annotation file, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAnnotations {
    /// Array of annotation objects.
    AnnotationList(Vec<Value>),
    /// Array of `{"doc", "matches"}` blocks.
    DocBlockList(Vec<Value>),
    /// One `{"doc", "matches"}` block.
    DocBlock {
        doc: Option<Value>,
        matches: Vec<Value>,
    },
    /// One annotation object.
    Single(Map<String, Value>),
}

impl RawAnnotations {
    /// Classify a JSON document. Top-level scalars are rejected.
    pub fn classify(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let is_block_list = items
                    .first()
                    .and_then(Value::as_object)
                    .is_some_and(|first| first.contains_key("matches"));
                if is_block_list {
                    Ok(Self::DocBlockList(items))
                } else {
                    Ok(Self::AnnotationList(items))
                }
            }
            Value::Object(mut map) => match map.remove("matches") {
                Some(Value::Array(matches)) => Ok(Self::DocBlock {
                    doc: map.remove("doc"),
                    matches,
                }),
                Some(other) => {
                    map.insert("matches".to_string(), other);
                    Ok(Self::Single(map))
                }
                None => Ok(Self::Single(map)),
            },
            other => Err(Error::Serialization(format!(
                "Expected a JSON array or object, found {}",
                json_type(&other)
            ))),
        }
    }

    /// Reduce to normalized records, skipping malformed entries.
    pub fn records(&self) -> Vec<NormalizedRecord> {
        let mut out = Vec::new();
        match self {
            Self::AnnotationList(items) => {
                for item in items {
                    push_item(item, None, &mut out);
                }
            }
            Self::DocBlockList(blocks) => {
                for block in blocks {
                    let Some(block) = block.as_object() else {
                        warn!(found = json_type(block), "Skipping non-object doc block");
                        continue;
                    };
                    match block.get("matches") {
                        Some(Value::Array(matches)) => {
                            for item in matches {
                                push_item(item, block.get("doc"), &mut out);
                            }
                        }
                        None | Some(Value::Null) => {
                            debug!("Doc block without matches");
                        }
                        Some(other) => {
                            warn!(
                                found = json_type(other),
                                "Skipping doc block whose matches is not an array"
                            );
                        }
                    }
                }
            }
            Self::DocBlock { doc, matches } => {
                for item in matches {
                    push_item(item, doc.as_ref(), &mut out);
                }
            }
            Self::Single(map) => {
                if let Some(record) = to_record(map, None) {
                    out.push(record);
                }
            }
        }
        out
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn push_item(item: &Value, inherited_doc: Option<&Value>, out: &mut Vec<NormalizedRecord>) {
    match item.as_object() {
        Some(map) => {
            if let Some(record) = to_record(map, inherited_doc) {
                out.push(record);
            }
        }
        None => warn!(found = json_type(item), "Skipping non-object annotation"),
    }
}

/// Coerce an offset: integers, floats (truncated), and numeric strings.
/// Negative and non-numeric values are rejected.
pub fn coerce_offset(value: &Value) -> Option<usize> {
    let number = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return usize::try_from(u).ok();
            }
            n.as_f64()?
        }
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => i as f64,
                Err(_) => s.parse::<f64>().ok()?,
            }
        }
        _ => return None,
    };

    if !number.is_finite() || number < 0.0 {
        return None;
    }
    Some(number.trunc() as usize)
}

/// Resolve `doc`: the record's own value, else the inherited one, else `""`.
/// A non-string value is an error.
fn resolve_doc(own: Option<&Value>, inherited: Option<&Value>) -> std::result::Result<String, &'static str> {
    let value = match own {
        Some(Value::Null) | None => inherited,
        some => some,
    };
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(json_type(other)),
    }
}

fn to_record(map: &Map<String, Value>, inherited_doc: Option<&Value>) -> Option<NormalizedRecord> {
    let doc = match resolve_doc(map.get("doc"), inherited_doc) {
        Ok(doc) => doc,
        Err(found) => {
            warn!(found, "Skipping annotation with non-string doc");
            return None;
        }
    };

    let Some(uri) = map.get("uri").and_then(Value::as_str) else {
        warn!(doc = %doc, "Skipping annotation without a string uri");
        return None;
    };

    let offset = |key: &str| {
        let coerced = map.get(key).and_then(coerce_offset);
        if coerced.is_none() {
            warn!(doc = %doc, uri, field = key, value = ?map.get(key), "Skipping annotation with invalid offset");
        }
        coerced
    };
    let start = offset("start")?;
    let end = offset("end")?;

    Some(NormalizedRecord::new(doc, start, end, uri))
}

/// Normalize one parsed JSON document.
pub fn normalize(value: Value) -> Result<AnnotationSet> {
    Ok(RawAnnotations::classify(value)?.records().into_iter().collect())
}

/// Normalize one annotation file.
pub fn load_file(path: &Path) -> Result<AnnotationSet> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))?;
    let set = RawAnnotations::classify(value)
        .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))?
        .records()
        .into_iter()
        .collect::<AnnotationSet>();
    debug!(path = %path.display(), result_count = set.len(), "Loaded annotation file");
    Ok(set)
}

/// Files to read for `path`: the file itself, or every `*.json` directly
/// inside a directory. A missing path falls back to the same path with a
/// `.json` extension.
pub fn resolve_annotation_files(path: &Path) -> Result<Vec<PathBuf>> {
    let path = if path.exists() {
        path.to_path_buf()
    } else {
        let alt = path.with_extension(defaults::ANNOTATION_EXTENSION);
        if !alt.exists() {
            return Err(Error::NotFound(format!(
                "Annotation path {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), fallback = %alt.display(), "Using .json fallback");
        alt
    };

    if !path.is_dir() {
        return Ok(vec![path]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&path)? {
        let entry_path = entry?.path();
        let is_json = entry_path
            .extension()
            .is_some_and(|ext| ext == defaults::ANNOTATION_EXTENSION);
        if is_json && entry_path.is_file() {
            files.push(entry_path);
        }
    }
    files.sort();

    if files.is_empty() {
        warn!(path = %path.display(), "No annotation files in directory");
    }
    Ok(files)
}

/// Load and union every annotation file under `path`.
pub fn load_annotations(path: impl AsRef<Path>) -> Result<AnnotationSet> {
    let path = path.as_ref();
    let mut set = AnnotationSet::new();
    let files = resolve_annotation_files(path)?;
    for file in &files {
        set.union_with(load_file(file)?);
    }
    info!(
        path = %path.display(),
        files = files.len(),
        result_count = set.len(),
        "Loaded annotations"
    );
    Ok(set)
}

//! Data model shared by the matchers, the normalizer, and the evaluator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Dense embedding vector.
pub type Vector = Vec<f32>;

// =============================================================================
// SURFACE FORMS
// =============================================================================

/// One textual realization of an ontology concept.
///
/// A text may map to several URIs (ambiguous forms) and a URI may have many
/// texts (labels, alt-labels, identifiers split into words).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceForm {
    pub text: String,
    pub uri: String,
}

impl SurfaceForm {
    pub fn new(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            uri: uri.into(),
        }
    }
}

// =============================================================================
// ANNOTATIONS
// =============================================================================

/// A predicted or gold link from a document span to a concept URI.
///
/// `start`/`end` are 0-based character offsets into the document's raw text,
/// `end` exclusive. `form` and `score` are provenance only and never take part
/// in comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub doc: String,
    pub start: usize,
    pub end: usize,
    pub uri: String,
    /// Matched text. Older exact-match files call this `surface`.
    #[serde(default, alias = "surface", skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// Cosine similarity of the surface form that produced this annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Annotation {
    /// Identity tuple used for set comparison.
    pub fn to_record(&self) -> NormalizedRecord {
        NormalizedRecord {
            doc: self.doc.clone(),
            start: self.start,
            end: self.end,
            uri: self.uri.clone(),
        }
    }
}

/// Annotations for a single document, written as `{"doc": ..., "matches": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnnotations {
    pub doc: String,
    pub matches: Vec<Annotation>,
}

/// The `(doc, start, end, uri)` tuple that defines annotation identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub doc: String,
    pub start: usize,
    pub end: usize,
    pub uri: String,
}

impl NormalizedRecord {
    pub fn new(doc: impl Into<String>, start: usize, end: usize, uri: impl Into<String>) -> Self {
        Self {
            doc: doc.into(),
            start,
            end,
            uri: uri.into(),
        }
    }
}

impl From<&Annotation> for NormalizedRecord {
    fn from(a: &Annotation) -> Self {
        a.to_record()
    }
}

/// A duplicate-free, unordered collection of normalized records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    records: HashSet<NormalizedRecord>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns `false` if it was already present.
    pub fn insert(&mut self, record: NormalizedRecord) -> bool {
        self.records.insert(record)
    }

    pub fn contains(&self, record: &NormalizedRecord) -> bool {
        self.records.contains(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.iter()
    }

    /// Merge another set into this one.
    pub fn union_with(&mut self, other: AnnotationSet) {
        self.records.extend(other.records);
    }

    /// Number of records present in both sets.
    pub fn intersection_count(&self, other: &AnnotationSet) -> usize {
        self.records.intersection(&other.records).count()
    }

    /// Number of records in `self` that are absent from `other`.
    pub fn difference_count(&self, other: &AnnotationSet) -> usize {
        self.records.difference(&other.records).count()
    }

    /// Records in `(doc, start, end, uri)` order.
    pub fn sorted(&self) -> Vec<&NormalizedRecord> {
        let mut records: Vec<&NormalizedRecord> = self.records.iter().collect();
        records.sort();
        records
    }

    /// Distinct document identifiers.
    pub fn docs(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.doc.as_str()).collect()
    }

    /// Subset belonging to one document.
    pub fn for_doc(&self, doc: &str) -> AnnotationSet {
        self.records
            .iter()
            .filter(|r| r.doc == doc)
            .cloned()
            .collect()
    }
}

impl FromIterator<NormalizedRecord> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = NormalizedRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<NormalizedRecord> for AnnotationSet {
    fn extend<I: IntoIterator<Item = NormalizedRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for AnnotationSet {
    type Item = NormalizedRecord;
    type IntoIter = std::collections::hash_set::IntoIter<NormalizedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

// =============================================================================
// METRICS
// =============================================================================

/// Set-based precision / recall / F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    #[serde(rename = "tp")]
    pub true_positives: usize,
    #[serde(rename = "fp")]
    pub false_positives: usize,
    #[serde(rename = "fn")]
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl MetricsResult {
    /// Derive the ratios from raw counts. Every ratio with a zero denominator is 0.
    pub fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        let precision = if tp + fp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        };
        let recall = if tp + fn_ == 0 {
            0.0
        } else {
            tp as f64 / (tp + fn_) as f64
        };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            precision,
            recall,
            f1,
        }
    }
}

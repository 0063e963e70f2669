//! Set-based precision / recall / F1.

use std::collections::BTreeMap;

use tracing::debug;

use ontolink_core::{AnnotationSet, MetricsResult};

/// Score `predicted` against `gold`.
///
/// `tp = |P ∩ G|`, `fp = |P − G|`, `fn = |G − P|`.
pub fn evaluate(predicted: &AnnotationSet, gold: &AnnotationSet) -> MetricsResult {
    let tp = predicted.intersection_count(gold);
    let fp = predicted.difference_count(gold);
    let fn_ = gold.difference_count(predicted);
    let metrics = MetricsResult::from_counts(tp, fp, fn_);
    debug!(tp, fp, false_negatives = fn_, f1 = metrics.f1, "Evaluated annotation sets");
    metrics
}

/// Per-document metrics over every document that appears in either set.
pub fn evaluate_by_doc(
    predicted: &AnnotationSet,
    gold: &AnnotationSet,
) -> BTreeMap<String, MetricsResult> {
    let mut docs = predicted.docs();
    docs.extend(gold.docs());

    docs.into_iter()
        .map(|doc| {
            let metrics = evaluate(&predicted.for_doc(doc), &gold.for_doc(doc));
            (doc.to_string(), metrics)
        })
        .collect()
}

/// The two summary lines printed by the `evaluate` command.
pub fn format_summary(metrics: &MetricsResult) -> String {
    format!(
        "TP={} FP={} FN={}\nPrecision: {:.2}%  Recall: {:.2}%  F1: {:.2}%",
        metrics.true_positives,
        metrics.false_positives,
        metrics.false_negatives,
        metrics.precision * 100.0,
        metrics.recall * 100.0,
        metrics.f1 * 100.0
    )
}

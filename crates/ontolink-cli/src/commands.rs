//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::{error, info, warn};

use ontolink_core::{defaults, DisambiguationOracle, DocumentAnnotations, EmbeddingBackend};
use ontolink_eval::{evaluate, evaluate_by_doc, format_summary, load_annotations};
use ontolink_inference::{OpenAIBackend, OpenAIConfig, YesNoOracle};
use ontolink_search::{
    ExactMatcher, OntologyIndex, PunctuationSegmenter, SemanticMatcher, SemanticMatcherConfig,
    SurfaceFormIndex, SurfaceFormTable,
};

use crate::config::{output_path, OutputFormat, ResourcePaths};

/// Plain-text documents to annotate: the file itself, or every `*.txt`
/// directly inside a directory, sorted by name.
pub fn list_documents(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        bail!("Input path {} does not exist", input.display());
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut docs = Vec::new();
    for entry in std::fs::read_dir(input)
        .with_context(|| format!("Failed to read directory {}", input.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            docs.push(path);
        }
    }
    docs.sort();
    if docs.is_empty() {
        warn!(path = %input.display(), "No .txt documents found");
    }
    Ok(docs)
}

fn doc_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub async fn build_index(paths: ResourcePaths, inference: OpenAIConfig) -> Result<()> {
    let table = SurfaceFormTable::from_path(&paths.forms_csv)
        .with_context(|| format!("Failed to load {}", paths.forms_csv.display()))?;
    let backend = OpenAIBackend::new(inference)?;

    let index = OntologyIndex::build(&table, &backend)
        .await
        .context("Failed to embed surface forms")?;
    index.save(&paths.index, &paths.labels)?;

    println!(
        "Indexed {} surface forms (dimension {})",
        index.len(),
        index.index().dimension()
    );
    println!("Saved index  -> {}", paths.index.display());
    println!("Saved labels -> {}", paths.labels.display());
    Ok(())
}

pub fn match_exact(input: &Path, output: &Path, forms_csv: &Path) -> Result<()> {
    let index = SurfaceFormIndex::load(forms_csv)
        .with_context(|| format!("Failed to load {}", forms_csv.display()))?;
    let matcher = ExactMatcher::new(&index)?;
    info!(forms = index.len(), "Loaded surface forms");

    for doc_path in list_documents(input)? {
        let text = std::fs::read_to_string(&doc_path)
            .with_context(|| format!("Failed to read {}", doc_path.display()))?;
        let doc = doc_name(&doc_path);
        let matches = matcher.find(&doc, &text);

        let out_file = output_path(output, &doc_path, "");
        println!("{}: {} matches", doc, matches.len());
        write_json(&out_file, &DocumentAnnotations { doc, matches })?;
    }
    Ok(())
}

pub async fn match_semantic(
    input: &Path,
    output: &Path,
    paths: ResourcePaths,
    inference: OpenAIConfig,
    config: SemanticMatcherConfig,
) -> Result<()> {
    let index = OntologyIndex::load(&paths.index, &paths.labels).context(
        "Failed to load the vector index (run `ontolink build-index` first)",
    )?;

    let embedder: Arc<dyn EmbeddingBackend> = Arc::new(OpenAIBackend::new(inference.clone())?);
    let oracle: Option<Arc<dyn DisambiguationOracle>> = if config.disambiguate {
        Some(Arc::new(YesNoOracle::new(OpenAIBackend::new(inference)?)))
    } else {
        None
    };
    let matcher = SemanticMatcher::new(
        Arc::new(index),
        embedder,
        Arc::new(PunctuationSegmenter::new()),
        oracle,
        config,
    )?;

    let mut failed = 0usize;
    for doc_path in list_documents(input)? {
        let text = std::fs::read_to_string(&doc_path)
            .with_context(|| format!("Failed to read {}", doc_path.display()))?;
        let doc = doc_name(&doc_path);

        match matcher.match_document(&doc, &text).await {
            Ok(annotations) => {
                let out_file = output_path(output, &doc_path, defaults::SEMANTIC_OUTPUT_SUFFIX);
                write_json(&out_file, &annotations)?;
                println!(
                    "Wrote {} annotations to {}",
                    annotations.len(),
                    out_file.display()
                );
            }
            Err(e) => {
                error!(doc = %doc, error = %e, "Document failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} document(s) failed", failed);
    }
    Ok(())
}

pub fn evaluate_paths(
    predicted: &Path,
    gold: &Path,
    per_doc: bool,
    format: OutputFormat,
) -> Result<()> {
    let pred = load_annotations(predicted)
        .with_context(|| format!("Failed to load predictions from {}", predicted.display()))?;
    let gold = load_annotations(gold)
        .with_context(|| format!("Failed to load gold annotations from {}", gold.display()))?;

    let overall = evaluate(&pred, &gold);
    let breakdown = per_doc.then(|| evaluate_by_doc(&pred, &gold));

    match format {
        OutputFormat::Text => {
            println!("{}", format_summary(&overall));
            for (doc, m) in breakdown.iter().flatten() {
                println!(
                    "{}: TP={} FP={} FN={}  P={:.2}%  R={:.2}%  F1={:.2}%",
                    doc,
                    m.true_positives,
                    m.false_positives,
                    m.false_negatives,
                    m.precision * 100.0,
                    m.recall * 100.0,
                    m.f1 * 100.0
                );
            }
        }
        OutputFormat::Json => {
            let body = match breakdown {
                Some(per_doc) => serde_json::to_string_pretty(&json!({
                    "overall": overall,
                    "per_doc": per_doc,
                }))?,
                None => serde_json::to_string_pretty(&overall)?,
            };
            println!("{}", body);
        }
    }
    Ok(())
}

pub async fn export_rdf(
    predictions: &Path,
    output: Option<&Path>,
    upload: Option<&str>,
) -> Result<()> {
    let records = load_annotations(predictions)
        .with_context(|| format!("Failed to load {}", predictions.display()))?;
    let turtle = ontolink_eval::to_turtle(&records, chrono::Utc::now());

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &turtle)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote Turtle");
        }
        None if upload.is_none() => print!("{}", turtle),
        None => {}
    }

    if let Some(repo_url) = upload {
        let status = ontolink_eval::upload_turtle(repo_url, turtle)
            .await
            .with_context(|| format!("Upload to {} failed", repo_url))?;
        println!("Triple store response: {}", status);
    }
    Ok(())
}

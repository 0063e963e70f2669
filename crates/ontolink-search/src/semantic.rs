//! Embedding-based matching with optional yes/no disambiguation.
//!
//! Per document: segment into sentences, embed all sentences in one batch,
//! retrieve the nearest surface forms per sentence, drop candidates under the
//! similarity threshold, optionally confirm each with the oracle, then locate
//! the form inside its sentence.

use std::sync::Arc;
use std::time::Instant;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use ontolink_core::{
    defaults, Annotation, CharOffsets, DisambiguationOracle, EmbeddingBackend, Error, Result,
    SentenceSegmenter, SentenceSpan,
};

use crate::vector_index::{Candidate, OntologyIndex};

/// What to do with a candidate when the oracle call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleFailurePolicy {
    /// Keep the candidate.
    #[default]
    Accept,
    /// Drop the candidate.
    Reject,
}

/// How a sentence's position in the document is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceAnchoring {
    /// Use the span reported by the segmenter.
    #[default]
    Tracked,
    /// Search the document for the sentence text and use its first
    /// occurrence. Repeated sentences all map to the first copy; sentences
    /// not found verbatim are skipped.
    FirstOccurrence,
}

/// Configuration for [`SemanticMatcher`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMatcherConfig {
    /// Candidates retrieved per sentence.
    pub top_k: usize,
    /// Minimum cosine similarity; candidates at exactly this score are kept.
    pub threshold: f32,
    /// Ask the oracle to confirm each candidate.
    pub disambiguate: bool,
    pub oracle_failure: OracleFailurePolicy,
    pub anchoring: SentenceAnchoring,
}

impl Default for SemanticMatcherConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::TOP_K,
            threshold: defaults::SIMILARITY_THRESHOLD,
            disambiguate: true,
            oracle_failure: OracleFailurePolicy::default(),
            anchoring: SentenceAnchoring::default(),
        }
    }
}

/// Concept name shown to the oracle: the last `/`-separated URI segment.
pub fn concept_name(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Question put to the oracle for one candidate.
pub fn disambiguation_prompt(form: &str, sentence: &str, uri: &str) -> String {
    format!(
        "Does the phrase \"{}\" in the sentence \"{}\" refer to the wine concept \"{}\"? Answer Yes or No.",
        form,
        sentence,
        concept_name(uri)
    )
}

/// Byte ranges of every case-insensitive occurrence of `needle` in `haystack`.
fn find_occurrences(haystack: &str, needle: &str) -> Result<Vec<(usize, usize)>> {
    if needle.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::InvalidInput(format!("Form {:?}: {}", needle, e)))?;
    Ok(pattern
        .find_iter(haystack)
        .map(|m| (m.start(), m.end()))
        .collect())
}

/// Semantic matcher over a prebuilt [`OntologyIndex`].
pub struct SemanticMatcher {
    index: Arc<OntologyIndex>,
    embedder: Arc<dyn EmbeddingBackend>,
    segmenter: Arc<dyn SentenceSegmenter>,
    oracle: Option<Arc<dyn DisambiguationOracle>>,
    config: SemanticMatcherConfig,
}

impl SemanticMatcher {
    /// Create a matcher. An oracle is required when `config.disambiguate` is set.
    pub fn new(
        index: Arc<OntologyIndex>,
        embedder: Arc<dyn EmbeddingBackend>,
        segmenter: Arc<dyn SentenceSegmenter>,
        oracle: Option<Arc<dyn DisambiguationOracle>>,
        config: SemanticMatcherConfig,
    ) -> Result<Self> {
        if config.disambiguate && oracle.is_none() {
            return Err(Error::Config(
                "Disambiguation is enabled but no oracle was provided".to_string(),
            ));
        }
        debug!(
            top_k = config.top_k,
            threshold = config.threshold,
            disambiguate = config.disambiguate,
            oracle_failure = ?config.oracle_failure,
            anchoring = ?config.anchoring,
            "Semantic matcher configured"
        );
        Ok(Self {
            index,
            embedder,
            segmenter,
            oracle,
            config,
        })
    }

    pub fn config(&self) -> &SemanticMatcherConfig {
        &self.config
    }

    /// Annotate one document.
    ///
    /// An embedding failure fails the whole document; oracle failures follow
    /// [`SemanticMatcherConfig::oracle_failure`].
    pub async fn match_document(&self, doc: &str, text: &str) -> Result<Vec<Annotation>> {
        let start = Instant::now();
        let sentences = self.segmenter.segment(text);
        if sentences.is_empty() {
            debug!(doc, "No sentences, skipping document");
            return Ok(Vec::new());
        }

        let inputs: Vec<String> = sentences.iter().map(|s| s.text.clone()).collect();
        let vectors = self.embedder.embed_texts(&inputs).await?;
        if vectors.len() != sentences.len() {
            return Err(Error::Embedding(format!(
                "Expected {} sentence embeddings, got {}",
                sentences.len(),
                vectors.len()
            )));
        }

        let hits = self.index.search(&vectors, self.config.top_k)?;
        let offsets = CharOffsets::new(text);
        let mut annotations = Vec::new();

        for (sentence, candidates) in sentences.iter().zip(hits) {
            let Some(anchor) = self.anchor(text, sentence) else {
                debug!(doc, sentence = %sentence.text, "Sentence not found in document, skipping");
                continue;
            };

            for candidate in candidates {
                if candidate.score.is_nan() || candidate.score < self.config.threshold {
                    trace!(doc, form = %candidate.form, score = candidate.score, "Below threshold");
                    continue;
                }
                if !self.confirm(doc, &sentence.text, &candidate).await {
                    continue;
                }

                for (bs, be) in find_occurrences(&sentence.text, candidate.form.trim())? {
                    let (start, end) = offsets.span(anchor + bs, anchor + be);
                    annotations.push(Annotation {
                        doc: doc.to_string(),
                        start,
                        end,
                        uri: candidate.uri.clone(),
                        form: Some(sentence.text[bs..be].to_string()),
                        score: Some(candidate.score),
                    });
                }
            }
        }

        info!(
            doc,
            sentences = sentences.len(),
            result_count = annotations.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Semantic matching complete"
        );
        Ok(annotations)
    }

    /// Byte offset of the sentence in the document.
    fn anchor(&self, text: &str, sentence: &SentenceSpan) -> Option<usize> {
        match self.config.anchoring {
            SentenceAnchoring::Tracked => Some(sentence.start),
            SentenceAnchoring::FirstOccurrence => text.find(&sentence.text),
        }
    }

    /// Whether the candidate survives disambiguation.
    async fn confirm(&self, doc: &str, sentence: &str, candidate: &Candidate) -> bool {
        let oracle = match (&self.oracle, self.config.disambiguate) {
            (Some(oracle), true) => oracle,
            _ => return true,
        };

        let question = disambiguation_prompt(candidate.form.trim(), sentence, &candidate.uri);
        match oracle.confirm(&question).await {
            Ok(verdict) => {
                trace!(doc, form = %candidate.form, uri = %candidate.uri, verdict, "Oracle verdict");
                verdict
            }
            Err(e) => {
                let accept = self.config.oracle_failure == OracleFailurePolicy::Accept;
                warn!(
                    doc,
                    form = %candidate.form,
                    uri = %candidate.uri,
                    error = %e,
                    accept,
                    "Oracle failed, applying fallback policy"
                );
                accept
            }
        }
    }
}

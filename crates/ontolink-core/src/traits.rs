//! Capability traits for the external collaborators of the pipeline.
//!
//! The matchers and the index builder only see these interfaces, so they can
//! be exercised with deterministic in-process implementations and wired to
//! real HTTP services in the binary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Vector;

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns exactly one vector per input text, in input order. A response
    /// with a different count is an error, never a truncated result.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text generation (chat completion).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Yes/no judgment on a natural-language question.
#[async_trait]
pub trait DisambiguationOracle: Send + Sync {
    /// Answer the question. Malformed answers are errors.
    async fn confirm(&self, question: &str) -> Result<bool>;
}

// =============================================================================
// SEGMENTATION
// =============================================================================

/// A sentence and its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSpan {
    pub text: String,
    /// Byte offset of the first byte of `text` in the source.
    pub start: usize,
    /// Byte offset one past the last byte of `text` in the source.
    pub end: usize,
}

impl SentenceSpan {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Splits a document into ordered, non-empty sentences.
pub trait SentenceSegmenter: Send + Sync {
    /// Segment `text`. Empty or whitespace-only input yields no sentences.
    ///
    /// For every returned span `&text[span.start..span.end] == span.text`.
    fn segment(&self, text: &str) -> Vec<SentenceSpan>;
}

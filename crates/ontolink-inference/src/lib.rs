//! # ontolink-inference
//!
//! Embedding and chat completion backends for ontolink.
//!
//! This crate provides:
//! - An OpenAI-compatible HTTP backend (LM Studio, Ollama in OpenAI mode,
//!   vLLM, OpenAI) implementing [`EmbeddingBackend`] and [`GenerationBackend`]
//! - [`YesNoOracle`], a [`DisambiguationOracle`] over any generation backend
//! - Deterministic mock backends (feature `mock`) for tests without network
//!
//! # Example
//!
//! ```rust,no_run
//! use ontolink_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use ontolink_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::new(OpenAIConfig::from_env()).unwrap();
//!     let texts = vec!["Barolo".to_string()];
//!     let vectors = backend.embed_texts(&texts).await.unwrap();
//! }
//! ```

pub mod openai;
pub mod oracle;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use ontolink_core::*;

pub use openai::{OpenAIBackend, OpenAIConfig};
pub use oracle::{parse_yes_no, YesNoOracle};

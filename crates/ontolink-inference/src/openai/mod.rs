//! OpenAI-compatible inference backend.
//!
//! Works with any endpoint exposing `/embeddings` and `/chat/completions`:
//!
//! - LM Studio (default, `http://localhost:1234/v1`)
//! - Ollama (in OpenAI compatibility mode)
//! - vLLM, LocalAI
//! - OpenAI cloud API

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use error::{to_ontolink_error, Endpoint, OpenAIErrorCode};
pub use types::*;

//! Centralized default constants for ontolink.
//!
//! Every crate and the CLI reference these constants instead of defining
//! their own values. Configuration structs use them in their `Default` impls.

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible API root (LM Studio).
pub const API_BASE_URL: &str = "http://localhost:1234/v1";

/// Default embedding model name.
pub const EMBED_MODEL: &str = "local-embeddings";

/// Default embedding vector dimension (nomic-embed-text served by LM Studio).
pub const EMBED_DIMENSION: usize = 768;

/// Default chat model name used for disambiguation.
pub const CHAT_MODEL: &str = "local-chat";

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 120;

/// Timeout for chat requests (seconds).
pub const CHAT_TIMEOUT_SECS: u64 = 60;

/// Sampling temperature for yes/no questions.
pub const CHAT_TEMPERATURE: f32 = 0.0;

/// Token cap for yes/no answers.
pub const CHAT_MAX_TOKENS: u32 = 1;

/// Timeout for the health check request (seconds).
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// SEMANTIC MATCHING
// =============================================================================

/// Nearest surface forms considered per sentence.
pub const TOP_K: usize = 5;

/// Minimum cosine similarity for a candidate to survive (inclusive).
pub const SIMILARITY_THRESHOLD: f32 = 0.65;

// =============================================================================
// RESOURCES
// =============================================================================

/// Surface-form CSV (columns `uri`, `form`).
pub const FORMS_CSV: &str = "resources/surface_forms.csv";

/// Persisted vector index blob.
pub const INDEX_PATH: &str = "resources/ont_index.bin";

/// Labels side file (`{"forms": [...], "uris": [...]}`).
pub const LABELS_PATH: &str = "resources/labels.json";

/// Extension of annotation files read from a directory.
pub const ANNOTATION_EXTENSION: &str = "json";

/// Timeout for uploading Turtle to a triple store (seconds).
pub const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Suffix appended to semantic matcher output file stems.
pub const SEMANTIC_OUTPUT_SUFFIX: &str = "_llm";

// =============================================================================
// LOGGING
// =============================================================================

/// Default `RUST_LOG` directive for the CLI.
pub const LOG_FILTER: &str = "ontolink=info,ontolink_inference=info,ontolink_search=info,ontolink_eval=info";

/// Operations slower than this are logged with `slow = true`.
pub const SLOW_OPERATION_MS: u64 = 30_000;

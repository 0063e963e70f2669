//! # ontolink-core
//!
//! Core types, traits, and abstractions for ontolink.
//!
//! This crate provides the foundational data structures (surface forms,
//! annotations, normalized records, metrics) and the capability traits
//! (embedding, generation, disambiguation, sentence segmentation) that the
//! other ontolink crates depend on.
//!
//! ## Log Level Contract
//!
//! All crates log through `tracing` with structured fields (`doc`, `uri`,
//! `form`, `path`, `duration_ms`, `result_count`, `model`).
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded run, requires operator attention |
//! | WARN  | Recoverable issue, record skipped or fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration (candidates, occurrences) |

pub mod defaults;
pub mod error;
pub mod models;
pub mod offset;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use offset::CharOffsets;
pub use traits::*;

//! # ontolink-search
//!
//! Surface-form lookup, vector retrieval, and the two matchers for ontolink.
//!
//! This crate provides:
//! - [`SurfaceFormTable`] / [`SurfaceFormIndex`]: CSV loading and normalized lookup
//! - [`VectorIndex`] / [`OntologyIndex`]: exact cosine search with persistence
//! - [`ExactMatcher`]: whole-word, case-insensitive string matching
//! - [`SemanticMatcher`]: sentence embedding retrieval with yes/no disambiguation
//! - [`PunctuationSegmenter`]: the default sentence segmenter
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ontolink_search::{OntologyIndex, PunctuationSegmenter, SemanticMatcher};
//!
//! let index = Arc::new(OntologyIndex::load("resources/ont_index.bin", "resources/labels.json")?);
//! let matcher = SemanticMatcher::new(
//!     index,
//!     embedder,
//!     Arc::new(PunctuationSegmenter::new()),
//!     Some(oracle),
//!     Default::default(),
//! )?;
//! let annotations = matcher.match_document("doc1.txt", &text).await?;
//! ```

pub mod exact;
pub mod segmenter;
pub mod semantic;
pub mod surface_forms;
pub mod vector_index;

// Re-export core types
pub use ontolink_core::*;

pub use exact::ExactMatcher;
pub use segmenter::PunctuationSegmenter;
pub use semantic::{
    concept_name, disambiguation_prompt, OracleFailurePolicy, SemanticMatcher,
    SemanticMatcherConfig, SentenceAnchoring,
};
pub use surface_forms::{normalize_form, SurfaceFormIndex, SurfaceFormTable};
pub use vector_index::{l2_normalize, Candidate, Labels, OntologyIndex, VectorIndex};

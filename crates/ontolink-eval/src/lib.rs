//! # ontolink-eval
//!
//! Scoring and export of entity-linking annotations.
//!
//! This crate provides:
//! - Loading of prediction / gold files in any of the four supported JSON
//!   shapes, normalized to `(doc, start, end, uri)` records
//! - Set-based precision, recall and F1, overall and per document
//! - Web Annotation (OA) Turtle export and upload to an RDF4J-style store
//!
//! ## Example
//!
//! ```rust,no_run
//! use ontolink_eval::{evaluate, format_summary, load_annotations};
//!
//! let predicted = load_annotations("out/exact").unwrap();
//! let gold = load_annotations("gold").unwrap();
//! println!("{}", format_summary(&evaluate(&predicted, &gold)));
//! ```

pub mod evaluator;
pub mod normalizer;
pub mod rdf;

// Re-export core types
pub use ontolink_core::*;

pub use evaluator::{evaluate, evaluate_by_doc, format_summary};
pub use normalizer::{
    coerce_offset, load_annotations, load_file, normalize, resolve_annotation_files,
    RawAnnotations,
};
pub use rdf::{escape_literal, is_valid_iri, to_turtle, upload_turtle};

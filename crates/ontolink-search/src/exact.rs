//! Whole-word exact matching of surface forms.

use regex::Regex;
use tracing::{debug, trace};

use ontolink_core::{Annotation, CharOffsets, Error, Result};

use crate::surface_forms::SurfaceFormIndex;

struct CompiledForm {
    pattern: Regex,
    uris: Vec<String>,
}

/// Finds case-insensitive whole-word occurrences of every indexed form.
///
/// Patterns are compiled once in [`ExactMatcher::new`] and reused for every
/// document.
pub struct ExactMatcher {
    forms: Vec<CompiledForm>,
}

impl ExactMatcher {
    pub fn new(index: &SurfaceFormIndex) -> Result<Self> {
        let mut forms = Vec::with_capacity(index.len());
        for (form, uris) in index.iter() {
            if !form.chars().any(|c| c.is_alphanumeric() || c == '_') {
                debug!(form, "Skipping form without word characters");
                continue;
            }
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(form)))
                .map_err(|e| Error::InvalidInput(format!("Form {:?}: {}", form, e)))?;
            forms.push(CompiledForm {
                pattern,
                uris: uris.to_vec(),
            });
        }
        debug!(patterns = forms.len(), "Compiled exact-match patterns");
        Ok(Self { forms })
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Annotate `text`, one annotation per occurrence and URI.
    ///
    /// Offsets are character offsets; `form` holds the matched document text.
    pub fn find(&self, doc: &str, text: &str) -> Vec<Annotation> {
        let offsets = CharOffsets::new(text);
        let mut annotations = Vec::new();

        for compiled in &self.forms {
            for m in compiled.pattern.find_iter(text) {
                let (start, end) = offsets.span(m.start(), m.end());
                for uri in &compiled.uris {
                    trace!(doc, start, end, uri = %uri, "Exact match");
                    annotations.push(Annotation {
                        doc: doc.to_string(),
                        start,
                        end,
                        uri: uri.clone(),
                        form: Some(m.as_str().to_string()),
                        score: None,
                    });
                }
            }
        }

        debug!(doc, result_count = annotations.len(), "Exact matching complete");
        annotations
    }
}

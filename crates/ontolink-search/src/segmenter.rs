//! Punctuation-based sentence segmentation.

use once_cell::sync::Lazy;
use regex::Regex;

use ontolink_core::{SentenceSegmenter, SentenceSpan};

// Sentence endings: a run of terminators followed by whitespace or end of text.
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("static regex"));

static ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:dr|mr|mrs|ms|prof|sr|jr|inc|ltd|co|etc|vs|e\.g|i\.e)\.$")
        .expect("static regex")
});

/// Splits on `.`, `!` and `?` followed by whitespace.
///
/// Common abbreviations and terminators directly after a digit do not end a
/// sentence. Returned sentences are whitespace-trimmed and their spans point
/// at the trimmed text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSegmenter;

impl PunctuationSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Raw `(start, end)` byte ranges, untrimmed.
    fn find_sentences(&self, text: &str) -> Vec<(usize, usize)> {
        let mut sentences = Vec::new();
        let mut last_end = 0;

        for mat in SENTENCE_END.find_iter(text) {
            let end = mat.end();
            let candidate = &text[last_end..end];

            if ABBREVIATION.is_match(candidate.trim()) {
                continue;
            }

            // Decimal numbers and enumerations
            if text[..mat.start()]
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_digit())
            {
                continue;
            }

            sentences.push((last_end, end));
            last_end = end;
        }

        if last_end < text.len() {
            sentences.push((last_end, text.len()));
        }

        sentences
    }
}

impl SentenceSegmenter for PunctuationSegmenter {
    fn segment(&self, text: &str) -> Vec<SentenceSpan> {
        self.find_sentences(text)
            .into_iter()
            .filter_map(|(start, end)| {
                let raw = &text[start..end];
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let lead = raw.len() - raw.trim_start().len();
                let begin = start + lead;
                Some(SentenceSpan::new(trimmed, begin, begin + trimmed.len()))
            })
            .collect()
    }
}

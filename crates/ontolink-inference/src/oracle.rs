//! Yes/no disambiguation oracle over a chat completion backend.

use async_trait::async_trait;
use tracing::debug;

use ontolink_core::{DisambiguationOracle, Error, GenerationBackend, Result};

/// Interpret a free-text answer as yes or no.
///
/// The answer is trimmed and lowercased; a leading `y` means yes, a leading
/// `n` means no. Anything else is an error so the caller's failure policy
/// decides what happens.
pub fn parse_yes_no(answer: &str) -> Result<bool> {
    let normalized = answer.trim().to_lowercase();
    match normalized.chars().next() {
        Some('y') => Ok(true),
        Some('n') => Ok(false),
        _ => Err(Error::Inference(format!(
            "Unrecognized yes/no answer: {:?}",
            answer
        ))),
    }
}

/// [`DisambiguationOracle`] that asks a [`GenerationBackend`] and parses the
/// reply with [`parse_yes_no`].
pub struct YesNoOracle<G> {
    backend: G,
}

impl<G: GenerationBackend> YesNoOracle<G> {
    pub fn new(backend: G) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }
}

#[async_trait]
impl<G: GenerationBackend> DisambiguationOracle for YesNoOracle<G> {
    async fn confirm(&self, question: &str) -> Result<bool> {
        let answer = self.backend.generate(question).await?;
        let verdict = parse_yes_no(&answer)?;
        debug!(answer = %answer.trim(), verdict, "Oracle answered");
        Ok(verdict)
    }
}

//! Mock backends for deterministic testing.
//!
//! Matchers can be exercised end to end without a running inference server:
//!
//! ```rust
//! use ontolink_inference::mock::{MockEmbeddingBackend, MockOracle};
//!
//! let embedder = MockEmbeddingBackend::new()
//!     .with_dimension(3)
//!     .with_vector("Barolo", vec![1.0, 0.0, 0.0]);
//! let oracle = MockOracle::always(true);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ontolink_core::{
    DisambiguationOracle, EmbeddingBackend, Error, GenerationBackend, Result, Vector,
};

/// Embedding backend returning fixed or text-derived vectors.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    dimension: usize,
    vectors: HashMap<String, Vector>,
    fail_on: Vec<String>,
    fail_all: bool,
    call_log: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockEmbeddingBackend {
    pub fn new() -> Self {
        Self {
            dimension: 8,
            vectors: HashMap::new(),
            fail_on: Vec::new(),
            fail_all: false,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the dimension of generated vectors.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Return `vector` whenever `text` is embedded.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vector) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    /// Fail any batch that contains `text`.
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.fail_on.push(text.into());
        self
    }

    /// Fail every call.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Batches received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Deterministic unit vector derived from the characters of `text`.
    pub fn generate(text: &str, dimension: usize) -> Vector {
        let mut vec = vec![0.0; dimension];
        if dimension == 0 {
            return vec;
        }
        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % dimension;
            vec[idx] += 0.1;
        }
        let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vec.iter_mut().for_each(|x| *x /= magnitude);
        }
        vec
    }
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.call_log.lock().unwrap().push(texts.to_vec());

        if self.fail_all || texts.iter().any(|t| self.fail_on.contains(t)) {
            return Err(Error::Embedding("Simulated failure for testing".to_string()));
        }

        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| Self::generate(t, self.dimension))
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embeddings"
    }
}

/// Generation backend with canned responses.
#[derive(Clone)]
pub struct MockGenerationBackend {
    default_response: String,
    responses: HashMap<String, String>,
    fail: bool,
    call_log: Arc<Mutex<Vec<String>>>,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self {
            default_response: "Yes".to_string(),
            responses: HashMap::new(),
            fail: false,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Answer `prompt` with `response` exactly.
    pub fn with_response_mapping(
        mut self,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.responses.insert(prompt.into(), response.into());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(Error::Inference("Simulated failure for testing".to_string()));
        }
        Ok(self
            .responses
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }

    fn model_name(&self) -> &str {
        "mock-chat"
    }
}

/// Oracle answering from substring rules.
///
/// Rules are checked in insertion order; the first rule whose needle occurs
/// in the question decides. Without a match the default answer applies, and
/// a missing default is reported as an error.
#[derive(Clone)]
pub struct MockOracle {
    rules: Vec<(String, bool)>,
    default: Option<bool>,
    questions: Arc<Mutex<Vec<String>>>,
}

impl MockOracle {
    /// Oracle that always gives `answer`.
    pub fn always(answer: bool) -> Self {
        Self {
            rules: Vec::new(),
            default: Some(answer),
            questions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Oracle that fails every question it has no rule for.
    pub fn failing() -> Self {
        Self {
            rules: Vec::new(),
            default: None,
            questions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_rule(mut self, needle: impl Into<String>, answer: bool) -> Self {
        self.rules.push((needle.into(), answer));
        self
    }

    /// Questions asked so far, in call order.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl DisambiguationOracle for MockOracle {
    async fn confirm(&self, question: &str) -> Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        self.rules
            .iter()
            .find(|(needle, _)| question.contains(needle.as_str()))
            .map(|(_, answer)| *answer)
            .or(self.default)
            .ok_or_else(|| Error::Inference("Simulated oracle failure".to_string()))
    }
}

//! OpenAI-compatible inference backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use ontolink_core::{defaults, EmbeddingBackend, Error, GenerationBackend, Result, Vector};

use super::error::{to_ontolink_error, Endpoint, OpenAIErrorCode};
use super::types::*;

/// Configuration for OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for embeddings.
    pub embed_model: String,
    /// Model to use for chat completions.
    pub chat_model: String,
    /// Expected embedding dimension.
    pub embed_dimension: usize,
    /// Embedding request timeout in seconds.
    pub embed_timeout_secs: u64,
    /// Chat request timeout in seconds.
    pub chat_timeout_secs: u64,
    /// Sampling temperature sent with chat requests.
    pub chat_temperature: Option<f32>,
    /// Maximum tokens in a chat answer.
    pub chat_max_tokens: Option<u32>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            api_key: None,
            embed_model: defaults::EMBED_MODEL.to_string(),
            chat_model: defaults::CHAT_MODEL.to_string(),
            embed_dimension: defaults::EMBED_DIMENSION,
            embed_timeout_secs: defaults::EMBED_TIMEOUT_SECS,
            chat_timeout_secs: defaults::CHAT_TIMEOUT_SECS,
            chat_temperature: Some(defaults::CHAT_TEMPERATURE),
            chat_max_tokens: Some(defaults::CHAT_MAX_TOKENS),
        }
    }
}

impl OpenAIConfig {
    /// Build a configuration from `ONTOLINK_*` environment variables, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            base_url: std::env::var("ONTOLINK_BASE_URL").unwrap_or(base.base_url),
            api_key: std::env::var("ONTOLINK_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            embed_model: std::env::var("ONTOLINK_EMBED_MODEL").unwrap_or(base.embed_model),
            chat_model: std::env::var("ONTOLINK_CHAT_MODEL").unwrap_or(base.chat_model),
            embed_dimension: std::env::var("ONTOLINK_EMBED_DIM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.embed_dimension),
            embed_timeout_secs: std::env::var("ONTOLINK_EMBED_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.embed_timeout_secs),
            chat_timeout_secs: std::env::var("ONTOLINK_CHAT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.chat_timeout_secs),
            chat_temperature: base.chat_temperature,
            chat_max_tokens: base.chat_max_tokens,
        }
    }
}

/// OpenAI-compatible inference backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing OpenAI-compatible backend: url={}, embed={}, chat={}",
            config.base_url, config.embed_model, config.chat_model
        );

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenAIConfig::default())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Build a POST request with authentication if configured.
    fn build_request(&self, endpoint: &str, timeout_secs: u64) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(self.url(endpoint))
            .timeout(Duration::from_secs(timeout_secs));

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    /// Check if the endpoint is reachable (`GET /models`).
    pub async fn health_check(&self) -> Result<bool> {
        let mut req = self
            .client
            .get(self.url("/models"))
            .timeout(Duration::from_secs(defaults::HEALTH_TIMEOUT_SECS));
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        match req.send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!("Health check passed");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Health check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Turn a non-2xx response into an error, keeping the server's message.
    async fn error_from_response(response: reqwest::Response, endpoint: Endpoint) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, error_type) = match serde_json::from_str::<OpenAIErrorResponse>(&body) {
            Ok(parsed) => (parsed.error.message, parsed.error.error_type),
            Err(_) if body.is_empty() => ("Unknown error".to_string(), String::new()),
            Err(_) => (body, String::new()),
        };
        let code = OpenAIErrorCode::from_response(status.as_u16(), &error_type);
        to_ontolink_error(code, endpoint, &format!("{} returned {}", status, message))
    }
}

/// Restore input order and check the response covers every input exactly once.
fn order_embeddings(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vector>> {
    if data.len() != expected {
        return Err(Error::Embedding(format!(
            "Expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }

    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
        for (position, d) in data.iter().enumerate() {
            if d.index != Some(position) {
                return Err(Error::Embedding(format!(
                    "Embedding indices are not a permutation of 0..{}",
                    expected
                )));
            }
        }
    }

    let vectors: Vec<Vector> = data.into_iter().map(|d| d.embedding).collect();

    if let Some(first) = vectors.first() {
        let dim = first.len();
        if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
            return Err(Error::Embedding(
                "Embeddings have empty or inconsistent dimensions".to_string(),
            ));
        }
    }

    Ok(vectors)
}

#[async_trait]
impl EmbeddingBackend for OpenAIBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        debug!(
            input_count = texts.len(),
            model = %self.config.embed_model,
            "Embedding texts"
        );

        let request = EmbeddingRequest {
            model: self.config.embed_model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .build_request("/embeddings", self.config.embed_timeout_secs)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, Endpoint::Embeddings).await);
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        let vectors = order_embeddings(result.data, texts.len())?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            result_count = vectors.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > defaults::SLOW_OPERATION_MS {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.embed_dimension
    }

    fn model_name(&self) -> &str {
        &self.config.embed_model
    }
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            model = %self.config.chat_model,
            prompt_len = prompt.len(),
            "Requesting chat completion"
        );

        let request = ChatCompletionRequest {
            model: self.config.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.chat_temperature,
            max_tokens: self.config.chat_max_tokens,
        };

        let response = self
            .build_request("/chat/completions", self.config.chat_timeout_secs)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, Endpoint::ChatCompletions).await);
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference("Response contained no choices".to_string()))?
            .message
            .content
            .ok_or_else(|| Error::Inference("Response message has no content".to_string()))?;

        debug!(response_len = content.len(), "Chat completion complete");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.chat_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(index: Option<usize>, embedding: Vec<f32>) -> EmbeddingData {
        EmbeddingData { embedding, index }
    }

    #[test]
    fn test_default_config() {
        let config = OpenAIConfig::default();
        assert_eq!(config.base_url, "http://localhost:1234/v1");
        assert_eq!(config.embed_model, defaults::EMBED_MODEL);
        assert_eq!(config.chat_model, defaults::CHAT_MODEL);
        assert_eq!(config.embed_timeout_secs, 120);
        assert_eq!(config.chat_timeout_secs, 60);
        assert_eq!(config.chat_temperature, Some(0.0));
        assert_eq!(config.chat_max_tokens, Some(1));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_backend_creation() {
        let backend = OpenAIBackend::with_defaults().unwrap();
        assert_eq!(backend.config().base_url, defaults::API_BASE_URL);
        assert_eq!(backend.dimension(), defaults::EMBED_DIMENSION);
        assert_eq!(EmbeddingBackend::model_name(&backend), "local-embeddings");
        assert_eq!(GenerationBackend::model_name(&backend), "local-chat");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let backend = OpenAIBackend::new(OpenAIConfig {
            base_url: "http://localhost:1234/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            backend.url("/embeddings"),
            "http://localhost:1234/v1/embeddings"
        );
    }

    #[test]
    fn test_order_embeddings_sorts_by_index() {
        let vectors = order_embeddings(
            vec![data(Some(1), vec![0.0, 1.0]), data(Some(0), vec![1.0, 0.0])],
            2,
        )
        .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_order_embeddings_positional_without_index() {
        let vectors =
            order_embeddings(vec![data(None, vec![1.0]), data(None, vec![2.0])], 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_order_embeddings_rejects_short_response() {
        let err = order_embeddings(vec![data(Some(0), vec![1.0])], 2).unwrap_err();
        assert!(err.to_string().contains("Expected 2 embeddings, got 1"));
    }

    #[test]
    fn test_order_embeddings_rejects_duplicate_index() {
        let result = order_embeddings(
            vec![data(Some(0), vec![1.0]), data(Some(0), vec![2.0])],
            2,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_order_embeddings_rejects_ragged_dimensions() {
        let result = order_embeddings(
            vec![data(Some(0), vec![1.0, 0.0]), data(Some(1), vec![2.0])],
            2,
        );
        assert!(matches!(result, Err(Error::Embedding(_))));
    }
}

//! OpenAI-specific error handling.

use ontolink_core::Error;

/// Which API surface produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Embeddings,
    ChatCompletions,
}

/// OpenAI-specific error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIErrorCode {
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Model not found or not loaded.
    ModelNotFound,
    /// Request too large.
    ContextLengthExceeded,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl OpenAIErrorCode {
    /// Determine error code from HTTP status and error type.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        match (status, error_type) {
            (401, _) => Self::AuthenticationError,
            (429, _) => Self::RateLimitExceeded,
            (404, _) | (_, "model_not_found") => Self::ModelNotFound,
            (400, _) if error_type.contains("context_length") => Self::ContextLengthExceeded,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Convert an OpenAI error response to an ontolink Error.
///
/// Credential and model problems are configuration errors; everything else
/// is attributed to the endpoint that failed.
pub fn to_ontolink_error(code: OpenAIErrorCode, endpoint: Endpoint, message: &str) -> Error {
    let message = match code {
        OpenAIErrorCode::AuthenticationError => {
            return Error::Config(format!("Authentication failed: {}", message))
        }
        OpenAIErrorCode::ModelNotFound => {
            return Error::Config(format!("Model not found: {}", message))
        }
        OpenAIErrorCode::RateLimitExceeded => format!("Rate limit exceeded: {}", message),
        OpenAIErrorCode::ContextLengthExceeded => format!("Context too long: {}", message),
        OpenAIErrorCode::ServerError => format!("Server error: {}", message),
        OpenAIErrorCode::Unknown => message.to_string(),
    };

    match endpoint {
        Endpoint::Embeddings => Error::Embedding(message),
        Endpoint::ChatCompletions => Error::Inference(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_401() {
        let code = OpenAIErrorCode::from_response(401, "invalid_api_key");
        assert_eq!(code, OpenAIErrorCode::AuthenticationError);
    }

    #[test]
    fn test_error_code_from_404() {
        let code = OpenAIErrorCode::from_response(404, "model_not_found");
        assert_eq!(code, OpenAIErrorCode::ModelNotFound);
    }

    #[test]
    fn test_error_code_from_context_length() {
        let code = OpenAIErrorCode::from_response(400, "context_length_exceeded");
        assert_eq!(code, OpenAIErrorCode::ContextLengthExceeded);
    }

    #[test]
    fn test_error_code_from_502() {
        let code = OpenAIErrorCode::from_response(502, "bad_gateway");
        assert_eq!(code, OpenAIErrorCode::ServerError);
    }

    #[test]
    fn test_error_code_from_unknown() {
        let code = OpenAIErrorCode::from_response(418, "im_a_teapot");
        assert_eq!(code, OpenAIErrorCode::Unknown);
    }

    #[test]
    fn test_embedding_failure_maps_to_embedding_error() {
        let err = to_ontolink_error(OpenAIErrorCode::ServerError, Endpoint::Embeddings, "boom");
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("Server error: boom"));
    }

    #[test]
    fn test_chat_failure_maps_to_inference_error() {
        let err = to_ontolink_error(
            OpenAIErrorCode::RateLimitExceeded,
            Endpoint::ChatCompletions,
            "slow down",
        );
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_auth_failure_is_config_error() {
        let err = to_ontolink_error(
            OpenAIErrorCode::AuthenticationError,
            Endpoint::Embeddings,
            "bad key",
        );
        assert!(matches!(err, Error::Config(_)));
    }
}

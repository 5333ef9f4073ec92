use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures on the tool side of the boundary. These never abort a request:
/// the tool loop renders them into the tool result text.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Failures talking to a model provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(reqwest::StatusCode),

    #[error("Request failed: {status} - {body}")]
    Request {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Provider API error: {0}")]
    Api(String),

    #[error("Context length exceeded. Message: {0}")]
    ContextLengthExceeded(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Failures of a whole generation. `ResponseGenerator::generate` turns these
/// into user-facing text; `try_generate` exposes them.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("The provider returned an empty response")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid sanitizer vocabulary: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a dotted settings key (`provider.api_key`) to the environment variable
/// that sets it (`COURSE_RAG_PROVIDER__API_KEY`).
pub fn to_env_var(field_path: &str) -> String {
    let path = field_path
        .split('.')
        .map(|part| part.to_uppercase())
        .collect::<Vec<_>>()
        .join("__");
    format!("COURSE_RAG_{}", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("provider.api_key"), "COURSE_RAG_PROVIDER__API_KEY");
        assert_eq!(to_env_var("type"), "COURSE_RAG_TYPE");
        assert_eq!(
            to_env_var("sanitizer.min_length"),
            "COURSE_RAG_SANITIZER__MIN_LENGTH"
        );
    }

    #[test]
    fn test_agent_error_messages() {
        assert_eq!(
            AgentError::ToolNotFound("search".into()).to_string(),
            "Tool not found: search"
        );
        assert_eq!(
            AgentError::ExecutionError("index offline".into()).to_string(),
            "Tool execution failed: index offline"
        );
    }
}

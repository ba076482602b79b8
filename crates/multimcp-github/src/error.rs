//! Error types for GitHub operations.

use multimcp_protocol::ToolError;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type GithubResult<T> = Result<T, GithubError>;

#[derive(Debug, Error)]
pub enum GithubError {
    /// API answered with a non-success status.
    #[error("{message} (status {status})")]
    ApiRequestFailed {
        status: u16,
        url: String,
        /// `message` field of the error body, or the status reason.
        message: String,
    },

    /// Success status but a body that is not JSON.
    #[error("Invalid response from GitHub API: {0}")]
    InvalidResponse(String),

    /// The configured base URL cannot carry path segments.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<GithubError> for ToolError {
    fn from(err: GithubError) -> Self {
        Self::Failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let error = GithubError::ApiRequestFailed {
            status: 404,
            url: "https://api.github.com/repos/a/b".to_string(),
            message: "Not Found".to_string(),
        };
        assert_eq!(error.to_string(), "Not Found (status 404)");
    }
}

use multimcp_protocol::ToolError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("invalid glob pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("search task failed: {0}")]
    Task(String),
}

impl From<SearchError> for ToolError {
    fn from(err: SearchError) -> Self {
        Self::Failed(err.to_string())
    }
}

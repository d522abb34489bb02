use async_trait::async_trait;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RepositoryReference;

#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum FetchError {
    #[error("repository or file not found")]
    NotFound,

    #[error("the repository host rejected the credentials")]
    #[diagnostic(help("Check the token configured for GitHub access"))]
    Unauthorized,

    #[error("the repository host rate limit was exceeded")]
    #[diagnostic(help("Configure a GitHub token or try again later"))]
    RateLimited,

    #[error("access to the repository is forbidden")]
    Forbidden,

    #[error("unexpected response status {0}")]
    UnexpectedStatus(u16),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl FetchError {
    /// Classifies a non-success HTTP status. `detail` is the response message,
    /// used to tell rate limiting apart from a plain 403.
    pub fn from_status(status: u16, detail: &str) -> Self {
        match status {
            401 => FetchError::Unauthorized,
            404 => FetchError::NotFound,
            429 => FetchError::RateLimited,
            403 if detail.to_ascii_lowercase().contains("rate limit") => FetchError::RateLimited,
            403 => FetchError::Forbidden,
            other => FetchError::UnexpectedStatus(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub default_branch: Option<String>,
    pub description: Option<String>,
    pub private: Option<bool>,
}

/// A repository reference pinned to the branch files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    pub owner: String,
    pub repo: String,
    pub default_branch: String,
}

impl BranchRef {
    pub fn new(reference: &RepositoryReference, branch: impl Into<String>) -> Self {
        Self {
            owner: reference.owner.clone(),
            repo: reference.repo.clone(),
            default_branch: branch.into(),
        }
    }
}

/// Remote repository host capability consumed by the analyzer.
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    async fn fetch_metadata(&self, owner: &str, repo: &str)
    -> Result<RepositoryMetadata, FetchError>;

    async fn fetch_file(&self, repo: &BranchRef, path: &str) -> Result<String, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(FetchError::from_status(404, ""), FetchError::NotFound);
        assert_eq!(FetchError::from_status(401, ""), FetchError::Unauthorized);
        assert_eq!(FetchError::from_status(429, ""), FetchError::RateLimited);
        assert_eq!(
            FetchError::from_status(403, "API rate limit exceeded for 1.2.3.4"),
            FetchError::RateLimited
        );
        assert_eq!(FetchError::from_status(403, "Resource not accessible"), FetchError::Forbidden);
        assert_eq!(FetchError::from_status(502, ""), FetchError::UnexpectedStatus(502));
    }
}

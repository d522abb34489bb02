//! Repository analysis: turns a repository URL into a structured fact set by
//! reading the project manifest through a [`RepositoryFetcher`].

use std::sync::Arc;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::debug;

pub mod fetcher;
pub mod github;
pub mod manifest;
pub mod reference;

pub use fetcher::{BranchRef, FetchError, RepositoryFetcher, RepositoryMetadata};
pub use github::GithubFetcher;
pub use manifest::{DependencyFlags, ManifestFacts, parse_manifest};
pub use reference::{ReferenceError, RepositoryReference, parse_repository_reference};

pub const FALLBACK_BRANCH: &str = "main";

#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),

    #[error("repository analysis timed out after {0}s")]
    Timeout(u64),
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub app_name: Option<String>,
    pub elixir_version: Option<String>,
    pub phoenix_version: Option<String>,
    pub live_view_version: Option<String>,
    pub dependencies: DependencyFlags,
    pub repo_url: String,
    pub default_branch: String,
    pub is_workspace: bool,
}

impl AnalysisResult {
    pub fn from_manifest(text: &str, reference: &RepositoryReference, branch: &str) -> Self {
        let facts = parse_manifest(text);

        Self {
            app_name: facts.app_name,
            elixir_version: facts.elixir_version,
            phoenix_version: facts.phoenix_version,
            live_view_version: facts.live_view_version,
            dependencies: facts.dependencies,
            repo_url: reference.url(),
            default_branch: branch.to_string(),
            is_workspace: manifest::is_workspace(text),
        }
    }
}

#[derive(Clone)]
pub struct Analyzer {
    fetcher: Arc<dyn RepositoryFetcher>,
}

impl Analyzer {
    pub fn new(fetcher: Arc<dyn RepositoryFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches and parses the manifest of the repository at `url`. Fetch
    /// errors are returned as-is; nothing is retried.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult, AnalysisError> {
        let reference: RepositoryReference = url.parse()?;

        let metadata = self
            .fetcher
            .fetch_metadata(&reference.owner, &reference.repo)
            .await?;

        let branch = metadata
            .default_branch
            .filter(|branch| !branch.is_empty())
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string());

        debug!(%reference, %branch, "fetching manifest");

        let manifest = self
            .fetcher
            .fetch_file(&BranchRef::new(&reference, &branch), manifest::MANIFEST_PATH)
            .await?;

        Ok(AnalysisResult::from_manifest(&manifest, &reference, &branch))
    }
}

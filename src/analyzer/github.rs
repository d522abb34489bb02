use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use tracing::{debug, warn};

use super::fetcher::{BranchRef, FetchError, RepositoryFetcher, RepositoryMetadata};
use crate::global::GithubConfig;

/// GitHub-backed fetcher: repository metadata through the REST API, files
/// through the raw content host.
#[derive(Clone)]
pub struct GithubFetcher {
    octocrab: Octocrab,
    http: Client,
    raw_url: String,
    token: Option<String>,
}

impl GithubFetcher {
    pub fn new(config: &GithubConfig, token: Option<String>) -> miette::Result<Self> {
        let mut builder = Octocrab::builder();

        if let Some(token) = &token {
            builder = builder.personal_token(token.clone());
        }

        let octocrab = builder
            .build()
            .map_err(|e| miette::miette!("Failed to create GitHub client: {}", e))?;

        Ok(Self {
            octocrab,
            http: Client::new(),
            raw_url: config.raw_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

fn classify(error: octocrab::Error) -> FetchError {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            FetchError::from_status(source.status_code.as_u16(), &source.message)
        }
        other => FetchError::Transport(other.to_string()),
    }
}

#[async_trait]
impl RepositoryFetcher for GithubFetcher {
    async fn fetch_metadata(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryMetadata, FetchError> {
        debug!(owner, repo, "fetching repository metadata");

        let repository = self
            .octocrab
            .repos(owner, repo)
            .get()
            .await
            .map_err(classify)
            .inspect_err(|e| warn!(owner, repo, error = %e, "metadata request failed"))?;

        Ok(RepositoryMetadata {
            default_branch: repository.default_branch,
            description: repository.description,
            private: repository.private,
        })
    }

    async fn fetch_file(&self, repo: &BranchRef, path: &str) -> Result<String, FetchError> {
        let url = format!(
            "{}/{}/{}/{}/{}",
            self.raw_url, repo.owner, repo.repo, repo.default_branch, path
        );

        debug!(%url, "fetching file");

        let mut request = self.http.get(&url);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let error = FetchError::from_status(status.as_u16(), &detail);
            warn!(%url, error = %error, "file request failed");
            return Err(error);
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

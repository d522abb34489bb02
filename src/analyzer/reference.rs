use std::{fmt::Display, str::FromStr};

use miette::Diagnostic;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CANONICAL_HOST: &str = "github.com";
const WWW_HOST: &str = "www.github.com";
const ARCHIVE_SUFFIX: &str = ".git";

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("invalid repository reference: `{0}`")]
    #[diagnostic(help("Use a URL like https://github.com/owner/repo"))]
    InvalidReference(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryReference {
    pub owner: String,
    pub repo: String,
}

impl RepositoryReference {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn url(&self) -> String {
        format!("https://{}/{}/{}", CANONICAL_HOST, self.owner, self.repo)
    }
}

impl Display for RepositoryReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepositoryReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReferenceError::InvalidReference(s.to_string());

        let url = Url::parse(s.trim()).map_err(|_| invalid())?;

        if !matches!(url.scheme(), "https" | "http") {
            return Err(invalid());
        }

        match url.host_str() {
            Some(CANONICAL_HOST) | Some(WWW_HOST) => {}
            _ => return Err(invalid()),
        }

        // anything after owner/repo (tree/<branch>, blob/...) is ignored
        let mut segments = url
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|segment| !segment.is_empty());

        let owner = segments.next().ok_or_else(invalid)?;
        let repo = segments.next().ok_or_else(invalid)?;
        let repo = repo.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(repo);

        if repo.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(owner, repo))
    }
}

/// Extracts `{owner, repo}` from a repository URL. A missing URL is invalid.
pub fn parse_repository_reference(url: Option<&str>) -> Result<RepositoryReference, ReferenceError> {
    match url {
        Some(url) => url.parse(),
        None => Err(ReferenceError::InvalidReference(String::new())),
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::{AnalysisError, AnalysisResult, Analyzer, GithubFetcher};
use crate::config::{PROJECT_CONFIG_FILE, ProjectConfig};
use crate::global;

pub mod analyze;
pub mod check;
pub mod estimate;
pub mod generate;
pub mod init;
pub mod review;
pub mod wizard;

pub(crate) fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE))
}

/// Loads `deploy.toml` (or the explicit path), falling back to defaults only
/// when no path was given.
pub(crate) fn load_project(explicit: Option<&Path>) -> miette::Result<ProjectConfig> {
    match explicit {
        Some(path) => ProjectConfig::load(path),
        None => ProjectConfig::load_or_default(&config_path(None)),
    }
}

pub(crate) fn github_analyzer(config: &global::Config) -> miette::Result<Analyzer> {
    let token = config.github.resolve_token();
    let fetcher = GithubFetcher::new(&config.github, token)?;

    Ok(Analyzer::new(Arc::new(fetcher)))
}

pub(crate) async fn analyze_with_timeout(
    analyzer: &Analyzer,
    url: &str,
    timeout: Duration,
) -> Result<AnalysisResult, AnalysisError> {
    tokio::time::timeout(timeout, analyzer.analyze(url))
        .await
        .unwrap_or(Err(AnalysisError::Timeout(timeout.as_secs())))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> miette::Result<()> {
    use miette::IntoDiagnostic as _;

    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

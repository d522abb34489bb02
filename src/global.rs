use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use miette::{Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub tasks: TasksConfig,
    pub templates: TemplatesConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GithubConfig {
    /// Name of the environment variable holding the access token.
    pub token_env: String,
    pub raw_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token_env: "GITHUB_TOKEN".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TasksConfig {
    pub timeout_secs: u64,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl TasksConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TemplatesConfig {
    /// Directory overriding the built-in templates.
    pub dir: Option<PathBuf>,
}

pub fn read_config() -> miette::Result<Config> {
    let path = crate::home::global_config_path()?;

    if !path.exists() {
        debug!(path = %path.display(), "no global config, using defaults");
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path)
        .into_diagnostic()
        .context("reading deployer config.toml file")?;

    toml::from_str(&contents)
        .into_diagnostic()
        .context("parsing deployer config.toml file")
}

fn token_from_env_file(path: &Path, key: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;

    let parsed: BTreeMap<String, String> = dotenv_parser::parse_dotenv(&content)
        .inspect_err(|e| debug!(error = %e, "ignoring unparsable env file"))
        .ok()?;

    parsed.get(key).cloned()
}

impl GithubConfig {
    /// Looks up the access token in the environment, then in `./.env`.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .or_else(|| token_from_env_file(Path::new(".env"), &self.token_env))
            .filter(|token| !token.trim().is_empty())
    }
}

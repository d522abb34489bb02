use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::UpdateError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(UpdateError::InvalidEnvironment(other.to_string())),
        }
    }
}

pub const ENVIRONMENTS: &[Environment] = &[
    Environment::Development,
    Environment::Staging,
    Environment::Production,
];

/// The working draft of deployment settings edited across wizard steps.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DeploymentConfiguration {
    pub app_name: String,
    pub environment: Environment,

    pub project_id: String,
    pub region: String,
    pub zone: String,

    pub db_tier: String,
    pub db_version: String,
    pub db_disk_size_gb: u32,

    pub min_instances: u32,
    pub max_instances: u32,
    pub memory_mb: u32,
    pub cpu: u32,

    pub use_private_network: bool,
    pub enable_cdn: bool,
    pub enable_waf: bool,
    pub enable_secret_manager: bool,
    pub tls_policy: String,
    pub custom_domain: Option<String>,
}

impl Default for DeploymentConfiguration {
    fn default() -> Self {
        Self {
            app_name: "my_app".to_string(),
            environment: Environment::default(),
            project_id: String::new(),
            region: "us-central1".to_string(),
            zone: "us-central1-a".to_string(),
            db_tier: "db-f1-micro".to_string(),
            db_version: "POSTGRES_16".to_string(),
            db_disk_size_gb: 10,
            min_instances: 0,
            max_instances: 10,
            memory_mb: 512,
            cpu: 1,
            use_private_network: true,
            enable_cdn: false,
            enable_waf: false,
            enable_secret_manager: true,
            tls_policy: "modern".to_string(),
            custom_domain: None,
        }
    }
}

impl DeploymentConfiguration {
    pub fn memory_gib(&self) -> f64 {
        self.memory_mb as f64 / 1024.0
    }

    /// Memory in the `Mi` notation Cloud Run expects.
    pub fn memory_limit(&self) -> String {
        format!("{}Mi", self.memory_mb)
    }

    pub fn custom_domain(&self) -> Option<&str> {
        self.custom_domain
            .as_deref()
            .map(str::trim)
            .filter(|domain| !domain.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RepositoryConfig {
    pub url: String,
}

/// Contents of a project's `deploy.toml`.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProjectConfig {
    pub repository: Option<RepositoryConfig>,

    #[serde(default)]
    pub deployment: DeploymentConfiguration,
}

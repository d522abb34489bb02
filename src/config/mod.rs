use std::path::Path;

use miette::{Context as _, Diagnostic, IntoDiagnostic as _};
use thiserror::Error;

pub mod merge;
pub mod model;

pub use merge::ConfigUpdate;
pub use model::*;

pub const PROJECT_CONFIG_FILE: &str = "deploy.toml";

#[derive(Debug, Error, Diagnostic)]
pub enum UpdateError {
    #[error("`{field}` must be a whole number, got `{value}`")]
    #[diagnostic(help("Use a non-negative base-10 integer"))]
    InvalidInteger {
        field: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("`{field}` contains characters that are not allowed: {value:?}")]
    #[diagnostic(help("Use letters, digits, `.`, `-` and `_` only"))]
    UnsafeValue { field: String, value: String },

    #[error("unknown environment `{0}`")]
    #[diagnostic(help("Use one of: development, staging, production"))]
    InvalidEnvironment(String),
}

impl ProjectConfig {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("reading {}", path.display()))?;

        let config: Self = toml::from_str(&contents).into_diagnostic()?;
        config.deployment.validate()?;

        Ok(config)
    }

    /// Loads the project config if present, falling back to defaults.
    pub fn load_or_default(path: &Path) -> miette::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> miette::Result<()> {
        let contents = toml::to_string_pretty(self).into_diagnostic()?;
        std::fs::write(path, contents).into_diagnostic()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_deploy_toml_uses_defaults() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [repository]
            url = "https://github.com/acme/shop"

            [deployment]
            project_id = "acme-prod"
            enable_waf = true
            "#,
        )
        .unwrap();

        assert_eq!(config.deployment.project_id, "acme-prod");
        assert!(config.deployment.enable_waf);
        assert_eq!(config.deployment.region, "us-central1");
        assert_eq!(config.repository.unwrap().url, "https://github.com/acme/shop");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);

        let mut config = ProjectConfig::default();
        config.deployment.environment = Environment::Staging;
        config.deployment.custom_domain = Some("shop.example.com".into());
        config.save(&path).unwrap();

        let loaded = ProjectConfig::load(&path).unwrap();
        assert_eq!(loaded.deployment, config.deployment);
    }

    #[test]
    fn test_load_rejects_unsafe_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);

        std::fs::write(
            &path,
            "[deployment]\ncustom_domain = \"shop.example.com\\\"\\n}\"\n",
        )
        .unwrap();

        assert!(ProjectConfig::load(&path).is_err());
    }
}

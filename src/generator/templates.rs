use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::ArtifactKey;

/// Resolves the template text backing an artifact.
pub trait TemplateSource: Send + Sync {
    fn template(&self, key: ArtifactKey) -> Option<Cow<'_, str>>;
}

/// Templates compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplates;

const DOCKERFILE: &str = include_str!("../../templates/Dockerfile.hbs");
const MAIN_TF: &str = include_str!("../../templates/main.tf.hbs");
const VARIABLES_TF: &str = include_str!("../../templates/variables.tf.hbs");
const OUTPUTS_TF: &str = include_str!("../../templates/outputs.tf.hbs");
const GITHUB_WORKFLOW: &str = include_str!("../../templates/deploy.yml.hbs");

impl TemplateSource for EmbeddedTemplates {
    fn template(&self, key: ArtifactKey) -> Option<Cow<'_, str>> {
        let text = match key {
            ArtifactKey::Dockerfile => DOCKERFILE,
            ArtifactKey::MainTf => MAIN_TF,
            ArtifactKey::VariablesTf => VARIABLES_TF,
            ArtifactKey::OutputsTf => OUTPUTS_TF,
            ArtifactKey::GithubWorkflow => GITHUB_WORKFLOW,
        };

        Some(Cow::Borrowed(text))
    }
}

/// Templates read from a user directory, one `*.hbs` file per artifact.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl TemplateSource for DirectoryTemplates {
    fn template(&self, key: ArtifactKey) -> Option<Cow<'_, str>> {
        let path = self.dir.join(key.template_file());

        match std::fs::read_to_string(&path) {
            Ok(text) => Some(Cow::Owned(text)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "template unavailable");
                None
            }
        }
    }
}

impl TemplateSource for HashMap<ArtifactKey, String> {
    fn template(&self, key: ArtifactKey) -> Option<Cow<'_, str>> {
        self.get(&key).map(|text| Cow::Borrowed(text.as_str()))
    }
}

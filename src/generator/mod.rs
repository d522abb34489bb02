//! Generation engine: renders the five deployment artifacts from a flat
//! [`RenderContext`] using handlebars templates.

use std::fmt::Display;

use convert_case::{Case, Casing};
use handlebars::{Context, Handlebars, Helper, Output, RenderErrorReason};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod context;
pub mod output;
pub mod templates;

pub use context::{RenderContext, build_context};
pub use output::{write_to_dir, write_zip};
pub use templates::{DirectoryTemplates, EmbeddedTemplates, TemplateSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKey {
    Dockerfile,
    MainTf,
    VariablesTf,
    OutputsTf,
    GithubWorkflow,
}

impl ArtifactKey {
    pub const ALL: [ArtifactKey; 5] = [
        ArtifactKey::Dockerfile,
        ArtifactKey::MainTf,
        ArtifactKey::VariablesTf,
        ArtifactKey::OutputsTf,
        ArtifactKey::GithubWorkflow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKey::Dockerfile => "dockerfile",
            ArtifactKey::MainTf => "main_tf",
            ArtifactKey::VariablesTf => "variables_tf",
            ArtifactKey::OutputsTf => "outputs_tf",
            ArtifactKey::GithubWorkflow => "github_workflow",
        }
    }

    /// Path of the artifact relative to the repository root.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKey::Dockerfile => "Dockerfile",
            ArtifactKey::MainTf => "terraform/main.tf",
            ArtifactKey::VariablesTf => "terraform/variables.tf",
            ArtifactKey::OutputsTf => "terraform/outputs.tf",
            ArtifactKey::GithubWorkflow => ".github/workflows/deploy.yml",
        }
    }

    /// Name of the template resource backing this artifact.
    pub fn template_file(&self) -> &'static str {
        match self {
            ArtifactKey::Dockerfile => "Dockerfile.hbs",
            ArtifactKey::MainTf => "main.tf.hbs",
            ArtifactKey::VariablesTf => "variables.tf.hbs",
            ArtifactKey::OutputsTf => "outputs.tf.hbs",
            ArtifactKey::GithubWorkflow => "deploy.yml.hbs",
        }
    }
}

impl Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum GenerationError {
    #[error("no template found for artifact `{0}`")]
    #[diagnostic(help("check the `templates.dir` override in ~/.deployer/config.toml"))]
    TemplateNotFound(ArtifactKey),

    #[error("failed to render artifact `{key}`")]
    Render {
        key: ArtifactKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("artifact `{0}` rendered to an empty file")]
    EmptyOutput(ArtifactKey),

    #[error("artifact generation timed out after {0}s")]
    Timeout(u64),

    #[error("artifact generation was interrupted: {0}")]
    Interrupted(String),
}

/// The five rendered artifacts. Only ever built complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifactSet {
    dockerfile: String,
    main_tf: String,
    variables_tf: String,
    outputs_tf: String,
    github_workflow: String,
}

impl GeneratedArtifactSet {
    pub fn get(&self, key: ArtifactKey) -> &str {
        match key {
            ArtifactKey::Dockerfile => &self.dockerfile,
            ArtifactKey::MainTf => &self.main_tf,
            ArtifactKey::VariablesTf => &self.variables_tf,
            ArtifactKey::OutputsTf => &self.outputs_tf,
            ArtifactKey::GithubWorkflow => &self.github_workflow,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKey, &str)> {
        ArtifactKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }
}

/// Escapes a value for a double-quoted HCL or YAML string. Template
/// sequences (`${`, `%{`) are doubled so HCL reads them literally.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }

    escaped
}

fn make_helper<F>(name: &'static str, f: F) -> impl handlebars::HelperDef + Send + Sync + 'static
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    move |h: &Helper,
          _: &Handlebars,
          _: &Context,
          _: &mut handlebars::RenderContext,
          out: &mut dyn Output| {
        let param = h
            .param(0)
            .ok_or_else(|| RenderErrorReason::ParamNotFoundForIndex(name, 0))?;
        let input = param
            .value()
            .as_str()
            .ok_or_else(|| RenderErrorReason::InvalidParamType("Expected a string"))?;
        out.write(&f(input))?;
        Ok(())
    }
}

fn register_helpers(handlebars: &mut Handlebars<'_>) {
    #[allow(clippy::type_complexity)]
    let helpers: &[(&'static str, fn(&str) -> String)] = &[
        ("pascalCase", |s| s.to_case(Case::Pascal)),
        ("snakeCase", |s| s.to_case(Case::Snake)),
        ("kebabCase", |s| s.to_case(Case::Kebab)),
        ("upperCase", |s| s.to_case(Case::Upper)),
        // GitHub Actions expressions share the handlebars delimiters.
        ("ghaExpr", |s| format!("${{{{ {s} }}}}")),
    ];

    for &(name, func) in helpers {
        handlebars.register_helper(name, Box::new(make_helper(name, func)));
    }
}

pub struct GenerationEngine {
    registry: Handlebars<'static>,
    source: Box<dyn TemplateSource>,
}

impl Default for GenerationEngine {
    fn default() -> Self {
        Self::new(Box::new(EmbeddedTemplates))
    }
}

impl GenerationEngine {
    pub fn new(source: Box<dyn TemplateSource>) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(escape_literal);
        register_helpers(&mut registry);

        Self { registry, source }
    }

    /// Uses the override directory from the global config when one is set.
    pub fn from_config(config: &crate::global::TemplatesConfig) -> Self {
        match &config.dir {
            Some(dir) => Self::new(Box::new(DirectoryTemplates::new(dir))),
            None => Self::default(),
        }
    }

    pub fn render(
        &self,
        key: ArtifactKey,
        context: &RenderContext,
    ) -> Result<String, GenerationError> {
        let template = self
            .source
            .template(key)
            .ok_or(GenerationError::TemplateNotFound(key))?;

        let rendered = self
            .registry
            .render_template(&template, context)
            .map_err(|e| GenerationError::Render {
                key,
                source: Box::new(e),
            })?;

        if rendered.trim().is_empty() {
            return Err(GenerationError::EmptyOutput(key));
        }

        if key == ArtifactKey::GithubWorkflow {
            serde_yaml_ng::from_str::<serde_yaml_ng::Value>(&rendered).map_err(|e| {
                GenerationError::Render {
                    key,
                    source: Box::new(e),
                }
            })?;
        }

        debug!(%key, bytes = rendered.len(), "rendered artifact");

        Ok(rendered)
    }

    /// Renders every artifact; the first failure discards the whole set.
    pub fn generate_all(
        &self,
        context: &RenderContext,
    ) -> Result<GeneratedArtifactSet, GenerationError> {
        Ok(GeneratedArtifactSet {
            dockerfile: self.render(ArtifactKey::Dockerfile, context)?,
            main_tf: self.render(ArtifactKey::MainTf, context)?,
            variables_tf: self.render(ArtifactKey::VariablesTf, context)?,
            outputs_tf: self.render(ArtifactKey::OutputsTf, context)?,
            github_workflow: self.render(ArtifactKey::GithubWorkflow, context)?,
        })
    }
}

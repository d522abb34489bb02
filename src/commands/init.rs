use std::path::Path;

use clap::Args as ClapArgs;
use convert_case::{Case, Casing};
use inquire::{Confirm, Select, Text};
use miette::IntoDiagnostic;

use crate::config::{
    DeploymentConfiguration, ENVIRONMENTS, PROJECT_CONFIG_FILE, ProjectConfig, RepositoryConfig,
};

const DEFAULT_APP_NAME: &str = "my_app";

#[derive(ClapArgs)]
pub struct Args {
    /// Accept every default without prompting
    #[arg(long)]
    pub yes: bool,

    /// GitHub repository URL to record in deploy.toml
    #[arg(long)]
    pub repo: Option<String>,

    /// Overwrite an existing deploy.toml
    #[arg(long)]
    pub force: bool,
}

fn infer_app_name() -> String {
    let current_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(_) => return DEFAULT_APP_NAME.to_string(),
    };

    current_dir
        .file_name()
        .and_then(|f| f.to_str())
        .map(|s| s.to_case(Case::Snake))
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string())
}

fn default_config(repo: Option<String>) -> ProjectConfig {
    ProjectConfig {
        repository: repo.map(|url| RepositoryConfig { url }),
        deployment: DeploymentConfiguration {
            app_name: infer_app_name(),
            ..Default::default()
        },
    }
}

fn inquire_config(initial: ProjectConfig) -> miette::Result<ProjectConfig> {
    let mut deployment = initial.deployment;

    let repo = Text::new("GitHub repository URL:")
        .with_initial_value(
            initial
                .repository
                .as_ref()
                .map(|r| r.url.as_str())
                .unwrap_or_default(),
        )
        .prompt_skippable()
        .into_diagnostic()?
        .filter(|url| !url.trim().is_empty());

    deployment.app_name = Text::new("Application name:")
        .with_initial_value(&deployment.app_name)
        .prompt()
        .into_diagnostic()?;

    deployment.project_id = Text::new("Google Cloud project id:")
        .with_initial_value(&deployment.project_id)
        .prompt()
        .into_diagnostic()?;

    deployment.region = Text::new("Region:")
        .with_initial_value(&deployment.region)
        .prompt()
        .into_diagnostic()?;

    deployment.environment = Select::new("Environment:", ENVIRONMENTS.to_vec())
        .with_starting_cursor(ENVIRONMENTS.len() - 1)
        .prompt()
        .into_diagnostic()?;

    deployment.enable_waf = Confirm::new("Protect the service with Cloud Armor?")
        .with_default(deployment.enable_waf)
        .prompt()
        .into_diagnostic()?;

    deployment.enable_cdn = Confirm::new("Serve static assets through Cloud CDN?")
        .with_default(deployment.enable_cdn)
        .prompt()
        .into_diagnostic()?;

    Ok(ProjectConfig {
        repository: repo.map(|url| RepositoryConfig { url }),
        deployment,
    })
}

pub fn run(args: Args) -> miette::Result<()> {
    let path = Path::new(PROJECT_CONFIG_FILE);

    if path.exists() && !args.force {
        miette::bail!("{PROJECT_CONFIG_FILE} already exists, use --force to overwrite it");
    }

    let initial = default_config(args.repo);

    let config = if args.yes {
        initial
    } else {
        inquire_config(initial)?
    };

    config.deployment.validate()?;
    config.save(path)?;

    println!("Wrote {PROJECT_CONFIG_FILE}");

    Ok(())
}

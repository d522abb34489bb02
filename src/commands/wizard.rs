use std::path::PathBuf;
use std::sync::Arc;

use clap::Args as ClapArgs;
use inquire::{Confirm, CustomType, Select, Text};
use miette::IntoDiagnostic;

use crate::config::{ConfigUpdate, ENVIRONMENTS, ProjectConfig, RepositoryConfig};
use crate::generator::{GenerationEngine, write_to_dir};
use crate::global;
use crate::pricing::{GCP_PRICING, tier_description};
use crate::wizard::{STEPS, Step, WizardSession};

use super::review::{self, ReviewView};

#[derive(ClapArgs)]
pub struct Args {
    /// Path to the project config to start from and save to
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory generated artifacts are written into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

const TLS_POLICIES: [&str; 3] = ["modern", "restricted", "compatible"];

enum ReviewAction {
    Generate,
    Revisit,
    Save,
    Quit,
}

impl std::fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewAction::Generate => write!(f, "Generate deployment files"),
            ReviewAction::Revisit => write!(f, "Go back to a step"),
            ReviewAction::Save => write!(f, "Save configuration"),
            ReviewAction::Quit => write!(f, "Quit"),
        }
    }
}

struct TierOption(&'static str);

impl std::fmt::Display for TierOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.0, tier_description(self.0))
    }
}

fn update(pairs: Vec<(&str, String)>) -> ConfigUpdate {
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect()
}

fn prompt_number(message: &str, current: u32) -> miette::Result<u32> {
    CustomType::<u32>::new(message)
        .with_default(current)
        .with_error_message("Enter a whole number")
        .prompt()
        .into_diagnostic()
}

/// Applies the update and prints the session message when it is rejected.
fn merge(session: &mut WizardSession, update: ConfigUpdate) -> bool {
    let applied = session.merge_configuration(&update);

    if let Some(message) = session.take_message() {
        eprintln!("{message}");
    }

    applied
}

async fn repository_step(session: &mut WizardSession, project: &mut ProjectConfig) -> miette::Result<()> {
    let initial = project
        .repository
        .as_ref()
        .map(|r| r.url.clone())
        .unwrap_or_default();

    let url = Text::new("GitHub repository URL (Esc to skip):")
        .with_initial_value(&initial)
        .prompt_skippable()
        .into_diagnostic()?
        .filter(|url| !url.trim().is_empty());

    let Some(url) = url else {
        session.advance();
        return Ok(());
    };

    println!("Analyzing {url}...");
    session.submit_analysis(&url);
    session.settle().await;

    match session.take_message() {
        Some(message) => eprintln!("{message}"),
        None => {
            if let Some(analysis) = session.analysis() {
                println!(
                    "Found {} (Elixir {}, Phoenix {})",
                    analysis.app_name.as_deref().unwrap_or("an unnamed app"),
                    analysis.elixir_version.as_deref().unwrap_or("?"),
                    analysis.phoenix_version.as_deref().unwrap_or("?"),
                );
            }
            project.repository = Some(RepositoryConfig { url });
        }
    }

    Ok(())
}

fn environment_step(session: &mut WizardSession) -> miette::Result<()> {
    let config = session.config().clone();

    let cursor = ENVIRONMENTS
        .iter()
        .position(|env| *env == config.environment)
        .unwrap_or_default();

    let environment = Select::new("Environment:", ENVIRONMENTS.to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .into_diagnostic()?;

    let project_id = Text::new("Google Cloud project id:")
        .with_initial_value(&config.project_id)
        .prompt()
        .into_diagnostic()?;

    let region = Text::new("Region:")
        .with_initial_value(&config.region)
        .prompt()
        .into_diagnostic()?;

    let zone = Text::new("Zone:")
        .with_initial_value(&config.zone)
        .prompt()
        .into_diagnostic()?;

    if merge(
        session,
        update(vec![
            ("environment", environment.to_string()),
            ("project_id", project_id),
            ("region", region),
            ("zone", zone),
        ]),
    ) {
        session.advance();
    }

    Ok(())
}

fn database_step(session: &mut WizardSession) -> miette::Result<()> {
    let config = session.config().clone();

    let tiers: Vec<TierOption> = GCP_PRICING.tier_names().map(TierOption).collect();
    let cursor = tiers
        .iter()
        .position(|tier| tier.0 == config.db_tier)
        .unwrap_or_default();

    let tier = Select::new("Cloud SQL tier:", tiers)
        .with_starting_cursor(cursor)
        .prompt()
        .into_diagnostic()?;

    let version = Text::new("Postgres version:")
        .with_initial_value(&config.db_version)
        .prompt()
        .into_diagnostic()?;

    let disk = prompt_number("Disk size (GB):", config.db_disk_size_gb)?;

    if merge(
        session,
        update(vec![
            ("db_tier", tier.0.to_string()),
            ("db_version", version),
            ("db_disk_size_gb", disk.to_string()),
        ]),
    ) {
        session.advance();
    }

    Ok(())
}

fn compute_step(session: &mut WizardSession) -> miette::Result<()> {
    let config = session.config().clone();

    let min_instances = prompt_number("Minimum instances:", config.min_instances)?;
    let max_instances = prompt_number("Maximum instances:", config.max_instances)?;
    let memory_mb = prompt_number("Memory per instance (MB):", config.memory_mb)?;
    let cpu = prompt_number("vCPUs per instance:", config.cpu)?;

    if merge(
        session,
        update(vec![
            ("min_instances", min_instances.to_string()),
            ("max_instances", max_instances.to_string()),
            ("memory_mb", memory_mb.to_string()),
            ("cpu", cpu.to_string()),
        ]),
    ) {
        session.advance();
    }

    Ok(())
}

fn security_step(session: &mut WizardSession) -> miette::Result<()> {
    let config = session.config().clone();

    let confirm = |message: &str, current: bool| {
        Confirm::new(message)
            .with_default(current)
            .prompt()
            .into_diagnostic()
    };

    let private_network = confirm("Keep the database on a private network?", config.use_private_network)?;
    let secret_manager = confirm("Store secrets in Secret Manager?", config.enable_secret_manager)?;
    let waf = confirm("Protect the service with Cloud Armor?", config.enable_waf)?;
    let cdn = confirm("Serve static assets through Cloud CDN?", config.enable_cdn)?;

    let cursor = TLS_POLICIES
        .iter()
        .position(|policy| *policy == config.tls_policy)
        .unwrap_or_default();

    let tls_policy = Select::new("TLS policy:", TLS_POLICIES.to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .into_diagnostic()?;

    let domain = Text::new("Custom domain (empty for none):")
        .with_initial_value(config.custom_domain().unwrap_or_default())
        .prompt()
        .into_diagnostic()?;

    if merge(
        session,
        update(vec![
            ("use_private_network", private_network.to_string()),
            ("enable_secret_manager", secret_manager.to_string()),
            ("enable_waf", waf.to_string()),
            ("enable_cdn", cdn.to_string()),
            ("tls_policy", tls_policy.to_string()),
            ("custom_domain", domain),
        ]),
    ) {
        session.advance();
    }

    Ok(())
}

/// Returns `false` once the user chose to quit.
async fn review_step(
    session: &mut WizardSession,
    project: &mut ProjectConfig,
    args: &Args,
) -> miette::Result<bool> {
    if let (Some(cost), Some(security)) = (session.cost(), session.security()) {
        review::print(&ReviewView::build(session.config(), cost, security))?;
    }

    let actions = vec![
        ReviewAction::Generate,
        ReviewAction::Revisit,
        ReviewAction::Save,
        ReviewAction::Quit,
    ];

    match Select::new("Next:", actions).prompt().into_diagnostic()? {
        ReviewAction::Generate => {
            session.submit_generation();
            session.settle().await;

            if let Some(message) = session.take_message() {
                eprintln!("{message}");
            }

            if let Some(artifacts) = session.artifacts() {
                for path in write_to_dir(artifacts, &args.out)? {
                    println!("Wrote {}", path.display());
                }
            }
        }
        ReviewAction::Revisit => {
            let target = Select::new("Step:", STEPS[..STEPS.len() - 1].to_vec())
                .prompt()
                .into_diagnostic()?;
            session.jump_to(target);
        }
        ReviewAction::Save => {
            project.deployment = session.config().clone();
            let path = super::config_path(args.config.as_deref());
            project.save(&path)?;
            println!("Saved {}", path.display());
        }
        ReviewAction::Quit => return Ok(false),
    }

    Ok(true)
}

pub async fn run(args: Args) -> miette::Result<()> {
    let global = global::read_config()?;
    let mut project = super::load_project(args.config.as_deref())?;

    let mut session = WizardSession::new(
        super::github_analyzer(&global)?,
        Arc::new(GenerationEngine::from_config(&global.templates)),
        global.tasks.timeout(),
    )
    .with_config(project.deployment.clone());

    loop {
        println!("\n== {} ==", session.step());

        match session.step() {
            Step::Repository => repository_step(&mut session, &mut project).await?,
            Step::Environment => environment_step(&mut session)?,
            Step::Database => database_step(&mut session)?,
            Step::Compute => compute_step(&mut session)?,
            Step::Security => security_step(&mut session)?,
            Step::Review => {
                if !review_step(&mut session, &mut project, &args).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

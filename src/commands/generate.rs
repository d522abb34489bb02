use std::path::PathBuf;

use clap::Args as ClapArgs;
use tracing::info;

use crate::generator::{GenerationEngine, build_context, write_to_dir, write_zip};
use crate::global;
use crate::security::check_artifacts;

#[derive(ClapArgs)]
pub struct Args {
    /// GitHub repository to analyze first (defaults to the one in deploy.toml)
    #[arg(long)]
    pub repo: Option<String>,

    /// Path to the project config (defaults to ./deploy.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the artifacts are written into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Write a zip archive instead of individual files
    #[arg(long)]
    pub zip: Option<PathBuf>,
}

pub async fn run(args: Args) -> miette::Result<()> {
    let global = global::read_config()?;
    let project = super::load_project(args.config.as_deref())?;

    let repo = args
        .repo
        .or_else(|| project.repository.as_ref().map(|r| r.url.clone()));

    let analysis = match repo {
        Some(url) => {
            let analyzer = super::github_analyzer(&global)?;
            Some(super::analyze_with_timeout(&analyzer, &url, global.tasks.timeout()).await?)
        }
        None => None,
    };

    let context = build_context(&project.deployment, analysis.as_ref());
    let engine = GenerationEngine::from_config(&global.templates);
    let artifacts = engine.generate_all(&context)?;

    match &args.zip {
        Some(path) => {
            write_zip(&artifacts, path)?;
            println!("Wrote {}", path.display());
        }
        None => {
            for path in write_to_dir(&artifacts, &args.out)? {
                println!("Wrote {}", path.display());
            }
        }
    }

    let report = check_artifacts(&artifacts);
    info!(score = report.score, "scanned generated artifacts");

    println!(
        "Security scan: score {}/100, {} error(s), {} warning(s)",
        report.score,
        report.errors.len(),
        report.warnings.len()
    );

    Ok(())
}

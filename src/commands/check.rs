use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args as ClapArgs;
use miette::{Context as _, IntoDiagnostic as _};

use crate::security::{Issue, SCANNED_ARTIFACTS, SecurityReport, check_configuration, scan_artifacts};

#[derive(ClapArgs)]
pub struct Args {
    /// Path to the project config (defaults to ./deploy.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding previously generated artifacts to scan as well
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Print the reports as JSON
    #[arg(long)]
    pub json: bool,
}

fn scan_directory(dir: &Path) -> miette::Result<SecurityReport> {
    let mut texts = BTreeMap::new();

    for (key, _) in SCANNED_ARTIFACTS {
        let path = dir.join(key.file_name());
        let text = std::fs::read_to_string(&path)
            .into_diagnostic()
            .with_context(|| format!("reading {}", path.display()))?;

        texts.insert(key, text);
    }

    Ok(scan_artifacts(|key| {
        texts.get(&key).map(String::as_str).unwrap_or_default()
    }))
}

fn print_issue(issue: &Issue) {
    println!("  [{}] {} {}", issue.severity, issue.code, issue.message);

    if !issue.recommendation.is_empty() {
        println!("      {}", issue.recommendation);
    }
}

fn print_report(title: &str, report: &SecurityReport) {
    println!("{title}: score {}/100", report.score);

    for issue in report.errors.iter().chain(report.warnings.iter()) {
        print_issue(issue);
    }

    println!("  {} passed", report.passed.len());
}

pub fn run(args: Args) -> miette::Result<()> {
    let project = super::load_project(args.config.as_deref())?;

    let configuration = check_configuration(&project.deployment);
    let artifacts = args.artifacts.as_deref().map(scan_directory).transpose()?;

    if args.json {
        return super::print_json(&serde_json::json!({
            "configuration": configuration,
            "artifacts": artifacts,
        }));
    }

    print_report("Configuration", &configuration);

    if let Some(report) = &artifacts {
        println!();
        print_report("Generated files", report);
    }

    Ok(())
}

//! CLI parsing for deployer

use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "deployer")]
#[command(about = "Deployment artifacts, cost estimates and security reviews for Phoenix apps on Cloud Run", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print debug logs to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a deploy.toml with the deployment settings
    Init(commands::init::Args),

    /// Read the mix.exs of a GitHub repository and report what it uses
    Analyze(commands::analyze::Args),

    /// Estimate the monthly cost of a deployment configuration
    Estimate(commands::estimate::Args),

    /// Review a configuration, and optionally generated files, for security issues
    Check(commands::check::Args),

    /// Render the Dockerfile, Terraform and GitHub Actions workflow
    Generate(commands::generate::Args),

    /// Walk through the configuration step by step
    Wizard(commands::wizard::Args),
}

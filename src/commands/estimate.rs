use std::path::PathBuf;

use clap::Args as ClapArgs;

use crate::pricing::{estimate, tier_description};

#[derive(ClapArgs)]
pub struct Args {
    /// Path to the project config (defaults to ./deploy.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the breakdown as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: Args) -> miette::Result<()> {
    let project = super::load_project(args.config.as_deref())?;
    let config = &project.deployment;

    let cost = estimate(config);

    if args.json {
        return super::print_json(&cost);
    }

    println!(
        "Database tier: {} ({})",
        config.db_tier,
        tier_description(&config.db_tier)
    );
    println!();

    for (label, amount) in cost.components() {
        println!("{label:<16}{amount:>10.2}");
    }

    println!("{:<16}{:>10.2} {}/month", "Total", cost.total, cost.currency);

    Ok(())
}

use clap::Parser;
use miette::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use deployer::cli::{Cli, Commands};
use deployer::commands;

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Analyze(args) => commands::analyze::run(args).await,
        Commands::Estimate(args) => commands::estimate::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Generate(args) => commands::generate::run(args).await,
        Commands::Wizard(args) => commands::wizard::run(args).await,
    }
}

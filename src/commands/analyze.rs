use clap::Args as ClapArgs;

use crate::analyzer::AnalysisResult;
use crate::global;

#[derive(ClapArgs)]
pub struct Args {
    /// GitHub repository URL, e.g. https://github.com/owner/repo
    pub url: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn print_result(result: &AnalysisResult) {
    let missing = "-";
    let deps = &result.dependencies;

    println!("Repository:    {} ({})", result.repo_url, result.default_branch);
    println!("Application:   {}", result.app_name.as_deref().unwrap_or(missing));
    println!("Elixir:        {}", result.elixir_version.as_deref().unwrap_or(missing));
    println!("Phoenix:       {}", result.phoenix_version.as_deref().unwrap_or(missing));
    println!("LiveView:      {}", result.live_view_version.as_deref().unwrap_or(missing));
    println!("Umbrella:      {}", yes_no(result.is_workspace));
    println!();
    println!("Ecto/Postgres: {}", yes_no(deps.ecto_sql || deps.postgrex));
    println!("Oban:          {}", yes_no(deps.oban));
    println!("Swoosh:        {}", yes_no(deps.swoosh));
    println!("Assets:        {}", yes_no(deps.has_assets()));
}

pub async fn run(args: Args) -> miette::Result<()> {
    let global = global::read_config()?;
    let analyzer = super::github_analyzer(&global)?;

    let result = super::analyze_with_timeout(&analyzer, &args.url, global.tasks.timeout()).await?;

    if args.json {
        return super::print_json(&result);
    }

    print_result(&result);

    Ok(())
}

/// Utility functions for the home directory
use std::path::PathBuf;

pub fn deployer_dir() -> miette::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| miette::miette!("failed to get home directory"))?
        .join(".deployer");

    Ok(home)
}

pub fn global_config_path() -> miette::Result<PathBuf> {
    Ok(deployer_dir()?.join("config.toml"))
}

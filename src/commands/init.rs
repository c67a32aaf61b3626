use anyhow::{bail, Context, Result};
use colored::Colorize;

use crate::cli::Cli;
use crate::config::Config;

pub fn run(cli: &Cli, name: &str) -> Result<()> {
    let config_path = &cli.config;

    if config_path.exists() {
        bail!(
            "{} already exists. Remove it first or use a different path with --config.",
            config_path.display()
        );
    }
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        bail!("Invalid icon name '{name}'");
    }

    let template = Config::default_template(name);
    std::fs::write(config_path, template)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("{} Created {}", "✓".green(), config_path.display());
    println!("Point [source] at your original image, then run `iconprep prepare`.");
    Ok(())
}

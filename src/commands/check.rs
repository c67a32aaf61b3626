use anyhow::{bail, Result};
use colored::Colorize;

use crate::cli::Cli;
use crate::config::{config_dir, Config};
use crate::diff::{build_check_plan, Status};
use crate::lockfile::{Lockfile, LOCKFILE_NAME};

pub fn run(cli: &Cli) -> Result<()> {
    // Validate config
    let config = Config::load(&cli.config)?;
    println!("{} Config is valid ({})", "✓".green(), cli.config.display());

    let config_dir = config_dir(&cli.config);
    let lockfile_path = config_dir.join(LOCKFILE_NAME);

    if !lockfile_path.exists() {
        println!(
            "{} No lockfile found. Run `iconprep prepare` to create one.",
            "!".yellow()
        );
    }

    let lockfile = Lockfile::load(&lockfile_path)?;
    let plan = build_check_plan(&config, &lockfile, config_dir)?;

    for warning in &plan.warnings {
        println!("{} {}", "!".yellow(), warning);
    }

    if plan.source != Status::UpToDate {
        println!(
            "{} Source {}: {}",
            "✗".red(),
            config.source.path.display(),
            plan.source
        );
    }
    for icon in &plan.icons {
        if icon.status != Status::UpToDate {
            println!("{} {}x{}: {}", "✗".red(), icon.size, icon.size, icon.status);
        }
    }

    if plan.is_up_to_date() {
        println!("{} Everything is up to date.", "✓".green());
        Ok(())
    } else {
        bail!(
            "Icons are out of date ({}). Run `iconprep prepare`.",
            plan.summary()
        );
    }
}

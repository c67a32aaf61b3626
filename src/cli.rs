use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "iconprep",
    about = "Crop a source image to its visible content and render 16/48/96/128 px PNG icons"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true, default_value = crate::config::CONFIG_NAME)]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new iconprep.toml config file
    Init {
        /// Icon family name
        #[arg(long, default_value = "app")]
        name: String,
    },

    /// Render the icon family from the source image
    Prepare {
        /// Show the crop and target files without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that the icons on disk match the source and lockfile
    Check,
}

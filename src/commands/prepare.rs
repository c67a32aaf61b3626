use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;

use crate::cli::Cli;
use crate::codec::{ImageCodec, RasterCodec};
use crate::config::{config_dir, Config};
use crate::icon::{icon_file_name, prepare_concurrent, IconPreparer, PreparedSource, ICON_SIZES};
use crate::lockfile::{Lockfile, LOCKFILE_NAME};

pub async fn run(cli: &Cli, dry_run: bool) -> Result<()> {
    run_with_codec(cli, dry_run, RasterCodec).await
}

/// The lockfile is only written once every size has been rendered.
pub async fn run_with_codec<C>(cli: &Cli, dry_run: bool, codec: C) -> Result<()>
where
    C: ImageCodec + Send + Sync + 'static,
{
    let config = Config::load(&cli.config)?;
    let config_dir = config_dir(&cli.config);
    let source_path = config.source_path(config_dir);
    let output_dir = config.output_dir(config_dir);
    let name = &config.source.name;

    let preparer = IconPreparer::new(codec, config.icons.prepare_options());

    if dry_run {
        let source = preparer.prepare_source(&source_path)?;
        print_crop(&source);
        for size in ICON_SIZES {
            let path = output_dir.join(icon_file_name(name, size));
            println!("  {} {}x{} -> {}", "+".green(), size, size, path.display());
        }
        println!("\n{} Dry run, nothing written.", "ℹ".blue());
        return Ok(());
    }

    let (source, record) = if config.icons.parallel {
        prepare_concurrent(Arc::new(preparer), &source_path, &output_dir, name).await?
    } else {
        preparer.prepare(&source_path, &output_dir, name)?
    };

    print_crop(&source);
    for (size, path) in record.iter() {
        println!("{} {}x{} -> {}", "✓".green(), size, size, path.display());
    }

    let lockfile = Lockfile::from_record(&source_path, &record, config_dir)?;
    let lockfile_path = config_dir.join(LOCKFILE_NAME);
    lockfile.save(&lockfile_path)?;
    println!("{} Updated {}", "✓".green(), lockfile_path.display());

    Ok(())
}

fn print_crop(source: &PreparedSource) {
    let (w, h) = source.original_size;
    let bounds = source.bounds;
    println!(
        "{} Source {}x{}, content bounds {}, cropped to {}x{}",
        "✓".green(),
        w,
        h,
        bounds,
        bounds.width(),
        bounds.height()
    );
}

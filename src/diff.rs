use std::fmt;
use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::icon::{icon_file_name, ICON_SIZES};
use crate::lockfile::{hash_file, relative_to, Lockfile};

#[derive(Debug)]
pub struct CheckPlan {
    pub source: Status,
    pub icons: Vec<IconStatus>,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct IconStatus {
    pub size: u32,
    pub status: Status,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Status {
    UpToDate,
    /// Not in the lockfile, or the lockfile doesn't exist yet.
    Untracked,
    Missing,
    Changed { old: String, new: String },
    WrongDimensions { width: u32, height: u32 },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::UpToDate => write!(f, "up to date"),
            Status::Untracked => write!(f, "not recorded in lockfile"),
            Status::Missing => write!(f, "missing"),
            Status::Changed { old, new } => write!(f, "hash {} -> {}", old, new),
            Status::WrongDimensions { width, height } => {
                write!(f, "is {}x{}", width, height)
            }
        }
    }
}

impl CheckPlan {
    pub fn is_up_to_date(&self) -> bool {
        self.source == Status::UpToDate
            && self.icons.iter().all(|i| i.status == Status::UpToDate)
    }

    pub fn summary(&self) -> String {
        let fresh = self
            .icons
            .iter()
            .filter(|i| i.status == Status::UpToDate)
            .count();
        format!(
            "{} of {} icons up to date, source {}",
            fresh,
            self.icons.len(),
            self.source
        )
    }
}

fn short(hash: &str) -> String {
    hash.chars().take(8).collect::<String>() + "..."
}

fn compare_hash(path: &Path, recorded: &str) -> Result<Status> {
    if !path.exists() {
        return Ok(Status::Missing);
    }
    let current = hash_file(path)?;
    if current == recorded {
        Ok(Status::UpToDate)
    } else {
        Ok(Status::Changed {
            old: short(recorded),
            new: short(&current),
        })
    }
}

/// Compares what the config would produce with the lockfile and the files on
/// disk.
pub fn build_check_plan(
    config: &Config,
    lockfile: &Lockfile,
    config_dir: &Path,
) -> Result<CheckPlan> {
    let mut warnings = Vec::new();

    let source_path = config.source_path(config_dir);
    let source = if lockfile.source_hash.is_empty() {
        Status::Untracked
    } else {
        // Normalized the same way the lockfile stores it.
        if lockfile.source != relative_to(&source_path, config_dir) {
            warnings.push(format!(
                "Lockfile was written for source '{}', config now uses '{}'",
                lockfile.source.display(),
                config.source.path.display()
            ));
        }
        compare_hash(&source_path, &lockfile.source_hash)?
    };

    for lock in &lockfile.icons {
        if !ICON_SIZES.contains(&lock.size) {
            warnings.push(format!(
                "Lockfile has an entry for unknown size {} ({})",
                lock.size,
                lock.path.display()
            ));
        }
    }

    let output_dir = config.output_dir(config_dir);
    let mut icons = Vec::with_capacity(ICON_SIZES.len());

    for size in ICON_SIZES {
        let path = output_dir.join(icon_file_name(&config.source.name, size));
        let recorded = lockfile.icons.iter().find(|l| l.size == size);

        let status = match recorded {
            None if path.exists() => Status::Untracked,
            None => Status::Missing,
            Some(lock) => match compare_hash(&path, &lock.hash)? {
                Status::UpToDate => check_dimensions(&path, size)?,
                other => other,
            },
        };

        icons.push(IconStatus { size, status });
    }

    Ok(CheckPlan {
        source,
        icons,
        warnings,
    })
}

fn check_dimensions(path: &Path, size: u32) -> Result<Status> {
    let (width, height) = image::image_dimensions(path)?;
    if width == size && height == size {
        Ok(Status::UpToDate)
    } else {
        Ok(Status::WrongDimensions { width, height })
    }
}

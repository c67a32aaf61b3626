use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::icon::OutputRecord;

pub const LOCKFILE_NAME: &str = "iconprep.lock.toml";

/// Record of the last successful `prepare` run.
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Lockfile {
    pub version: u32,
    pub source: PathBuf,
    pub source_hash: String,

    #[serde(default)]
    pub icons: Vec<IconLock>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IconLock {
    pub size: u32,
    pub path: PathBuf,
    pub hash: String,
}

pub fn hash_file(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Paths are stored relative to `base` when possible.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

impl Lockfile {
    pub fn from_record(source: &Path, record: &OutputRecord, base: &Path) -> Result<Self> {
        let icons = record
            .iter()
            .map(|(size, path)| -> Result<IconLock> {
                Ok(IconLock {
                    size,
                    path: relative_to(path, base),
                    hash: hash_file(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version: 1,
            source: relative_to(source, base),
            source_hash: hash_file(source)?,
            icons,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let lockfile: Lockfile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(lockfile)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

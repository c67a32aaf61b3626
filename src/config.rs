use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::icon::{EmptyPolicy, PrepareOptions};

pub const CONFIG_NAME: &str = "iconprep.toml";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,

    #[serde(default, skip_serializing_if = "OutputConfig::is_default")]
    pub output: OutputConfig,

    #[serde(default, skip_serializing_if = "IconsConfig::is_default")]
    pub icons: IconsConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Source image, relative to the config file
    pub path: PathBuf,
    /// Icon family name, used in output file names: `<name>_icon_<size>.png`
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory the icons are written to, relative to the config file (default: ".")
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl OutputConfig {
    fn is_default(&self) -> bool {
        self.dir == default_output_dir()
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct IconsConfig {
    /// Fill color under transparent pixels of each written icon (default: false)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bleed: bool,

    /// Fully transparent source: "error" (default) or "full"
    #[serde(default)]
    pub empty: EmptyPolicy,

    /// Render all sizes concurrently (default: false)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parallel: bool,
}

impl IconsConfig {
    fn is_default(&self) -> bool {
        !self.bleed && self.empty == EmptyPolicy::default() && !self.parallel
    }

    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            bleed: self.bleed,
            empty: self.empty,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Directory that relative paths in a config file are resolved against.
pub fn config_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

impl Config {
    pub fn new(source: PathBuf, name: String) -> Self {
        Self {
            source: SourceConfig { path: source, name },
            output: OutputConfig::default(),
            icons: IconsConfig::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate(config_dir(path))?;

        Ok(config)
    }

    fn validate(&self, config_dir: &Path) -> Result<()> {
        let name = &self.source.name;
        if name.trim().is_empty() {
            bail!("source.name must not be empty");
        }
        if name.contains(['/', '\\']) {
            bail!("source.name must not contain path separators: '{name}'");
        }

        let source = config_dir.join(&self.source.path);
        if !source.exists() {
            bail!("Source image does not exist: {}", source.display());
        }
        Ok(())
    }

    pub fn source_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.source.path)
    }

    pub fn output_dir(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.output.dir)
    }

    pub fn default_template(name: &str) -> String {
        format!(
            r#"# iconprep configuration

[source]
path = "icon_{name}_original.png"   # Source image, relative to this file
name = "{name}"                     # Outputs are named {name}_icon_<size>.png

# Output settings
# [output]
# dir = "."            # Must already exist

# Icon settings
# [icons]
# bleed = false        # Alpha bleed on each icon (for consumers that rescale it)
# empty = "error"      # Fully transparent source: "error" or "full"
# parallel = false     # Render 16/48/96/128 concurrently
"#
        )
    }
}

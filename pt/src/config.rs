//! Configuration for the pt command

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::convert::ConversionOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Separator between examples when converting to a few-shot block
    #[serde(default = "default_example_separator")]
    pub example_separator: String,

    /// Prefix used for few-shot conversions when none is given on the command line
    #[serde(default)]
    pub few_shot_prefix: Option<String>,

    /// Log filter applied when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_example_separator() -> String {
    crate::DEFAULT_EXAMPLE_SEPARATOR.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            example_separator: default_example_separator(),
            few_shot_prefix: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!(?config_path, "Config::load: explicit path");
            return Self::read(config_path);
        }

        // Try default locations
        let default_paths = [Self::default_path(), Some(PathBuf::from("pt.yml"))];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                debug!(?path, "Config::load: found config");
                return Self::read(path);
            }
        }

        debug!("Config::load: using defaults");
        Ok(Config::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Per-user config location, when the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prompt-templates").join("config.yml"))
    }

    /// Save config to file, creating missing parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(?path, "Config::save: called");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Conversion options seeded from this config
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            example_separator: self.example_separator.clone(),
            prefix: self.few_shot_prefix.clone(),
            suffix: None,
        }
    }
}

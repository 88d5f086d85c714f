//! `ssc.toml` configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ssc_codegen::CompileOptions;
use std::path::Path;
use tracing::debug;

/// File name looked up next to the script
pub const CONFIG_FILE: &str = "ssc.toml";

/// Project configuration
///
/// ```toml
/// [compile]
/// module-name = "script"
/// uninit-reads = "error"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Options passed to every compilation
    pub compile: CompileOptions,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `ssc.toml` from `dir` if it exists
    pub fn find_in_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.is_file() {
            return Ok(None);
        }
        Self::from_file(&config_path).map(Some)
    }

    /// Configuration for a script: an explicit file, else `ssc.toml` beside the
    /// script, else defaults
    pub fn for_script(script: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let dir = script.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::find_in_dir(dir)?.unwrap_or_default())
    }
}

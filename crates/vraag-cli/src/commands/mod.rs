//! CLI subcommands.

pub mod analyze;
pub mod config;
pub mod questions;

use std::path::{Path, PathBuf};

use tracing::debug;
use vraag_core::VraagConfig;

/// Default location of the user configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vraag").join("config.json"))
}

/// Load the given configuration file, else the user configuration if it
/// exists, else the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VraagConfig> {
    if let Some(path) = config_path {
        return Ok(VraagConfig::from_file(Path::new(path))?);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            debug!("Using config from {}", path.display());
            Ok(VraagConfig::from_file(&path)?)
        }
        _ => Ok(VraagConfig::default()),
    }
}

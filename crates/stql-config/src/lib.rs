//! Configuration loading for the `stqlmon` CLI.
//!
//! An optional TOML file is read (default search: `stqlmon.toml` in the
//! working directory); a missing or unparsable file falls back to defaults
//! rather than failing the run, since a monitor demo should still start
//! without any configuration on disk.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub fps: f64,
    pub formula: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: 30.0,
            formula: "next_car".to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn discover() -> PathBuf {
    PathBuf::from("stqlmon.toml")
}

/// Load configuration from `path` (or the default search location), CLI
/// overrides applied afterward by the caller. A missing file yields
/// [`Config::default`]; a present-but-unparsable file also falls back to
/// defaults, logging a warning rather than aborting the run.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "no config file found, using defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => {
            info!(target: "config", path = %path.display(), "loaded config");
            Ok(config)
        }
        Err(err) => {
            warn!(target: "config", path = %path.display(), error = %err, "failed to parse config, using defaults");
            Ok(Config::default())
        }
    }
}

/// Apply CLI-flag overrides on top of a loaded config; `None` fields leave
/// the loaded value untouched.
pub fn apply_overrides(
    mut config: Config,
    fps: Option<f64>,
    formula: Option<String>,
    log_level: Option<String>,
) -> Config {
    if let Some(fps) = fps {
        config.fps = fps;
    }
    if let Some(formula) = formula {
        config.formula = formula;
    }
    if let Some(log_level) = log_level {
        config.log_level = log_level;
    }
    config
}

//! Loading [`GameConfig`] overrides from TOML.

use std::{fs, path::Path};

use abyss_core::GameConfig;
use anyhow::{Context, Result};

/// Reads and validates the configuration at `path`, or returns the defaults.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        log::debug!("no configuration file given, using defaults");
        return Ok(GameConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    let config = parse(&source)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    log::info!("loaded configuration from {}", path.display());
    Ok(config)
}

/// Parses TOML overrides on top of the defaults and validates the result.
pub(crate) fn parse(source: &str) -> Result<GameConfig> {
    let config: GameConfig = toml::from_str(source).context("failed to parse TOML")?;
    config.validate()?;
    Ok(config)
}

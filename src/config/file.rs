//! Configuration file loading.

use crate::config::types::BridgeConfig;
use crate::error::BridgeError;
use std::path::{Path, PathBuf};

/// Default configuration file name for the local config.
const LOCAL_CONFIG_NAME: &str = "script-http.toml";

/// Default configuration file name within the XDG config directory.
const XDG_CONFIG_NAME: &str = "config.toml";

/// Application name for XDG directory lookup.
const APP_NAME: &str = "script-http";

/// Loads configuration from the default search paths.
///
/// Search order:
/// 1. `./script-http.toml`
/// 2. `~/.config/script-http/config.toml`
///
/// Returns the default configuration if no config file is found.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read, parsed or
/// validated.
pub fn load() -> Result<BridgeConfig, BridgeError> {
    for path in search_paths() {
        if path.exists() {
            return from_path(&path);
        }
    }

    Ok(BridgeConfig::default())
}

/// Loads configuration from a specific file path.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file contains invalid TOML
/// - The TOML doesn't match the expected schema
/// - A value fails [`BridgeConfig::validate`]
pub fn from_path(path: &Path) -> Result<BridgeConfig, BridgeError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        BridgeError::configuration(
            "config_file",
            format!("failed to read '{}': {}", path.display(), e),
        )
    })?;

    from_str(&contents).map_err(|e| {
        BridgeError::configuration(
            "config_file",
            format!("failed to load '{}': {}", path.display(), e),
        )
    })
}

/// Parses and validates configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid, doesn't match the schema, or
/// fails validation.
pub fn from_str(toml_str: &str) -> Result<BridgeConfig, BridgeError> {
    let config: BridgeConfig = toml::from_str(toml_str)
        .map_err(|e| BridgeError::configuration("config", format!("invalid TOML: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Returns the paths that would be searched for configuration files.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(dir) = xdg_config_dir() {
        paths.push(dir.join(XDG_CONFIG_NAME));
    }

    paths
}

/// Returns the path to the XDG config directory for script-http.
///
/// This is `~/.config/script-http` on most systems.
#[must_use]
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}

//! Configuration loading for Tessellate.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

mod types;

use std::fs;
use std::path::{Path, PathBuf};

pub use types::{
    BorderColors, BordersConfig, Config, LayoutConfig, MAX_WORKSPACES, WindowRule,
    parse_hex_color,
};

use crate::error::ConfigError;

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Configuration file names in the home directory.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".tessellate.jsonc", ".tessellate.json"];

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/tessellate/config.jsonc` or `config.json`
/// 2. `~/.config/tessellate/config.jsonc` or `config.json`
/// 3. `~/.tessellate.jsonc` or `~/.tessellate.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        let dir = PathBuf::from(xdg_config).join("tessellate");
        paths.extend(CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)));
    }

    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".config").join("tessellate");
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            // XDG_CONFIG_HOME might be ~/.config
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths.extend(HOME_CONFIG_FILE_NAMES.iter().map(|name| home.join(name)));
    }

    paths
}

/// Loads and validates the configuration from an explicit path.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::Io` / `ConfigError::Parse` if it cannot be read or parsed, and
/// `ConfigError::Invalid` if a value is out of range.
pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let file = fs::File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: Config = serde_json::from_reader(reader).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Finds the first existing configuration file in the search paths.
#[must_use]
pub fn find_config_path() -> Option<PathBuf> { config_paths().into_iter().find(|p| p.exists()) }

/// Loads the configuration from the search paths.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists, or the
/// errors of [`load_config_from_path`].
pub fn load_config() -> Result<(Config, PathBuf), ConfigError> {
    let path = find_config_path().ok_or(ConfigError::NotFound)?;
    let config = load_config_from_path(&path)?;
    Ok((config, path))
}

/// Loads the configuration, falling back to defaults when no file exists.
///
/// An explicit `custom` path must exist.
///
/// # Errors
///
/// Returns any error other than a missing file in the search paths.
pub fn load_or_default(custom: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = custom {
        let config = load_config_from_path(path)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        return Ok(config);
    }

    match load_config() {
        Ok((config, path)) => {
            tracing::info!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("no configuration file found, using defaults");
            Ok(Config::default())
        }
        Err(err) => Err(err),
    }
}

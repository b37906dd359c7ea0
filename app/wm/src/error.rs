//! Error types for Tessellate.
//!
//! Model lookups and invalid transitions never produce errors; they are
//! reported through `Option`/`bool` results. The types here cover the fallible
//! surfaces around the model: configuration, the actor channel and startup.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::wm::actor::ActorError;

/// Errors raised while locating, reading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file exists in any searched location.
    #[error(
        "no configuration file found (searched $XDG_CONFIG_HOME/tessellate, ~/.config/tessellate and ~/.tessellate.jsonc)"
    )]
    NotFound,
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON(C) for the configuration schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A value is out of range or malformed.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum WmError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Actor(#[from] ActorError),
    /// The windowing display could not be acquired.
    #[error("cannot open display: {0}")]
    DisplayUnavailable(String),
    /// Another window manager already controls the display.
    #[error("another window manager is already running")]
    AnotherWmRunning,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input at line {line}: {message}")]
    Input { line: usize, message: String },
}

/// Convenience alias for results carrying a [`WmError`].
pub type WmResult<T> = Result<T, WmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let msg = ConfigError::NotFound.to_string();
        assert!(msg.contains("no configuration file found"));

        let err = ConfigError::Invalid("contexts must be between 1 and 26".to_string());
        assert_eq!(err.to_string(), "invalid configuration: contexts must be between 1 and 26");
    }

    #[test]
    fn test_wm_error_wraps_config_error() {
        let err: WmError = ConfigError::Invalid("gap".to_string()).into();
        assert!(matches!(err, WmError::Config(ConfigError::Invalid(_))));
        assert_eq!(err.to_string(), "invalid configuration: gap");
    }

    #[test]
    fn test_fatal_startup_errors() {
        assert_eq!(
            WmError::AnotherWmRunning.to_string(),
            "another window manager is already running"
        );
        assert!(WmError::DisplayUnavailable(":0".to_string()).to_string().contains(":0"));
    }
}

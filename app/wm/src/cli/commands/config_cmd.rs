//! Config CLI commands.

use std::path::Path;

use clap::Subcommand;

use crate::config::{config_paths, find_config_path, load_or_default};
use crate::error::WmError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Show where Tessellate looks for its configuration file.
    ///
    /// Lists every searched location in priority order and marks the one in
    /// use, if any.
    Path,

    /// Load and validate the configuration file.
    Check,
}

/// Executes config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
pub fn execute(cmd: &ConfigCommands, custom: Option<&Path>) -> Result<(), WmError> {
    match cmd {
        ConfigCommands::Path => {
            show_config_path(custom);
            Ok(())
        }
        ConfigCommands::Check => check_config(custom),
    }
}

fn show_config_path(custom: Option<&Path>) {
    if let Some(path) = custom {
        println!("{} (from --config)", path.display());
        return;
    }
    let active = find_config_path();
    for path in config_paths() {
        let marker = if active.as_ref() == Some(&path) { " (in use)" } else { "" };
        println!("{}{marker}", path.display());
    }
    if active.is_none() {
        println!("no configuration file found, defaults are in use");
    }
}

fn check_config(custom: Option<&Path>) -> Result<(), WmError> {
    let config = load_or_default(custom)?;
    println!(
        "configuration is valid: {} contexts x {} workspaces, {} rules",
        config.contexts,
        config.workspaces,
        config.rules.len()
    );
    Ok(())
}

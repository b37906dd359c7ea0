//! CLI module for Tessellate.
//!
//! The binary has no display backend of its own: it replays recorded
//! sessions against the in-memory backend, evaluates layouts, and manages
//! the configuration file.

mod commands;

use clap::Parser;
pub use commands::{Cli, ScreenSize};

use crate::error::WmError;

/// Parses the command line and runs the selected command.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run() -> Result<(), WmError> {
    let cli = Cli::parse();
    cli.execute()
}

//! CLI command definitions using Clap.
//!
//! - `replay` - feed a recorded session through the window manager
//! - `layout` - print the rectangles a layout mode produces
//! - `config` - locate and validate the configuration file

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::WmError;
use crate::schema;
use crate::wm::geometry::Rect;
use crate::wm::layout::LayoutMode;

pub mod config_cmd;
pub mod layout;
pub mod replay;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tessellate CLI.
#[derive(Parser, Debug)]
#[command(name = "tessellate")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Replay a recorded session.
    ///
    /// Reads one JSON event or command per line, feeds them through the
    /// window manager with an in-memory display, logs every display effect
    /// and prints the final state as JSON. Blank lines and lines starting
    /// with `#` are skipped.
    #[command(after_long_help = r#"Examples:
  tessellate replay session.jsonl
  tessellate replay session.jsonl --screen 2560x1440
  TESSELLATE_LOG=debug tessellate replay session.jsonl"#)]
    Replay {
        /// Session file, one JSON object per line.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Screen size.
        #[arg(long, default_value = "1920x1080")]
        screen: ScreenSize,
    },

    /// Print the rectangles a layout mode assigns.
    Layout {
        /// Layout mode.
        #[arg(long, short)]
        mode: LayoutMode,

        /// Number of tiled windows.
        #[arg(long, short = 'n', default_value_t = 3)]
        clients: usize,

        /// Screen size.
        #[arg(long, default_value = "1920x1080")]
        screen: ScreenSize,

        /// Gap around every window, in pixels.
        #[arg(long, default_value_t = 0)]
        gap: i32,

        /// Windows in the master zone.
        #[arg(long, default_value_t = 1)]
        nmaster: usize,

        /// Fraction of the width given to the master zone.
        #[arg(long, default_value_t = 0.55)]
        mfactor: f64,

        /// Put the master zone on the right.
        #[arg(long)]
        mirror: bool,
    },

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(tessellate completions --shell zsh)"
    ///   tessellate completions --shell fish > ~/.config/fish/completions/tessellate.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

/// Screen size given as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    /// The screen as a rectangle at the origin.
    #[must_use]
    pub const fn rect(self) -> Rect { Rect::new(0, 0, self.width, self.height) }
}

impl FromStr for ScreenSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid screen size '{s}', expected WIDTHxHEIGHT (e.g. 1920x1080)");
        let (width, height) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: i32 = width.trim().parse().map_err(|_| invalid())?;
        let height: i32 = height.trim().parse().map_err(|_| invalid())?;
        if width <= 0 || height <= 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl Cli {
    /// Executes the parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn execute(&self) -> Result<(), WmError> {
        match &self.command {
            Commands::Replay { file, screen } => {
                replay::execute(file, *screen, self.config.as_deref())
            }
            Commands::Layout { mode, clients, screen, gap, nmaster, mfactor, mirror } => {
                let request = crate::wm::layout::LayoutRequest::new(*mode, screen.rect())
                    .with_gap(*gap)
                    .with_nmaster(*nmaster)
                    .with_mfactor(*mfactor)
                    .with_mirror(*mirror);
                layout::execute(*clients, &request)
            }
            Commands::Config(cmd) => config_cmd::execute(cmd, self.config.as_deref()),
            Commands::Schema => {
                println!("{}", schema::generate_schema_json());
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "tessellate", &mut io::stdout());
    }
}

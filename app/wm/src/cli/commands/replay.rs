//! The `replay` command.
//!
//! Runs a recorded session through the actor on a current-thread runtime,
//! exactly as a live display connection would feed it: one message at a
//! time, each fully applied before the next.

use std::fs;
use std::path::Path;

use crate::cli::ScreenSize;
use crate::config::load_or_default;
use crate::error::{ActorError, WmError, WmResult};
use crate::wm::{Input, RecordingBackend, WindowManager, WmActor};

/// Parses a session: one JSON [`Input`] per line. Blank lines and lines
/// starting with `#` are skipped.
///
/// # Errors
///
/// Returns [`WmError::Input`] naming the first line that does not parse.
pub fn parse_session(text: &str) -> WmResult<Vec<Input>> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|err| WmError::Input { line, message: err.to_string() })
        })
        .collect()
}

/// Replays the session in `file` and prints the final state.
///
/// # Errors
///
/// Returns an error if the file or configuration cannot be loaded, a line
/// does not parse, or the actor stops early.
pub fn execute(file: &Path, screen: ScreenSize, config_path: Option<&Path>) -> WmResult<()> {
    let config = load_or_default(config_path)?;
    let inputs = parse_session(&fs::read_to_string(file)?)?;
    tracing::info!(file = %file.display(), inputs = inputs.len(), "replaying session");

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async move {
        let mut manager = WindowManager::new(&config, RecordingBackend::new(screen.rect()))?;
        manager.bootstrap();
        let (handle, task) = WmActor::spawn(manager);

        let interrupt = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted, shutting down");
                // The actor may already be gone
                let _ = interrupt.shutdown().await;
            }
        });

        for input in inputs {
            match input {
                Input::Event(event) => handle.event(event).await?,
                Input::Command(command) => handle.command(command).await?,
            }
        }
        let snapshot = handle.snapshot().await?;
        handle.shutdown().await?;
        let manager = task.await.map_err(|_| ActorError::ReceiveFailed)?;

        for effect in manager.backend().effects() {
            tracing::info!(?effect, "effect");
        }
        let json = serde_json::to_string_pretty(&snapshot).map_err(std::io::Error::other)?;
        println!("{json}");
        Ok::<(), WmError>(())
    })
}

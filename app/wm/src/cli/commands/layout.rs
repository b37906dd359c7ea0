//! The `layout` command.

use serde::Serialize;

use crate::error::WmError;
use crate::wm::geometry::{Rect, WindowId};
use crate::wm::layout::{LayoutRequest, calculate_layout};

/// One computed cell.
#[derive(Debug, Serialize)]
struct Cell {
    window: WindowId,
    #[serde(flatten)]
    rect: Rect,
}

/// Lays out `clients` windows, numbered from 1, and prints the cells as JSON.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn execute(clients: usize, request: &LayoutRequest) -> Result<(), WmError> {
    let windows: Vec<WindowId> = (1..).take(clients).collect();
    let cells: Vec<Cell> = calculate_layout(&windows, request)
        .into_iter()
        .map(|(window, rect)| Cell { window, rect })
        .collect();
    let json = serde_json::to_string_pretty(&cells).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}

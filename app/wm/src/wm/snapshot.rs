//! Serializable view of the model, returned by state queries.

use serde::Serialize;

use super::geometry::WindowId;
use super::layout::LayoutMode;

/// Summary of one populated workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    /// Context letter and one-based number, e.g. `b:3`.
    pub name: String,
    pub layout: LayoutMode,
    pub live: Vec<WindowId>,
    pub icons: Vec<WindowId>,
    pub disowned: Vec<WindowId>,
}

impl WorkspaceSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.icons.is_empty() && self.disowned.is_empty()
    }
}

/// Summary of the whole model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Letter of the active context.
    pub context: char,
    /// One-based number of the shown workspace.
    pub workspace: usize,
    /// Content window of the focused client.
    pub focused: Option<WindowId>,
    /// Workspaces holding at least one client.
    pub workspaces: Vec<WorkspaceSnapshot>,
}

//! Configuration types for Tessellate.
//!
//! Every type derives `JsonSchema` so the `schema` subcommand can describe the
//! file format. Missing keys fall back to their defaults.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::wm::context::MAX_CONTEXTS;
use crate::wm::layout::LayoutMode;

/// Maximum number of workspaces per context.
pub const MAX_WORKSPACES: usize = 32;

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Number of contexts, lettered from `a` (1-26).
    pub contexts: usize,
    /// Number of workspaces per context (1-32).
    pub workspaces: usize,
    /// Focus follows the pointer into a window.
    pub focus_follows_mouse: bool,
    /// Initial layout of every workspace, restored by `reset`.
    pub layout: LayoutConfig,
    /// Border width and colors.
    pub borders: BordersConfig,
    /// Window rules, first match wins.
    pub rules: Vec<WindowRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contexts: 4,
            workspaces: 9,
            focus_follows_mouse: true,
            layout: LayoutConfig::default(),
            borders: BordersConfig::default(),
            rules: Vec::new(),
        }
    }
}

impl Config {
    /// Checks every value for range and format errors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CONTEXTS).contains(&self.contexts) {
            return Err(invalid(format!(
                "contexts must be between 1 and {MAX_CONTEXTS}, got {}",
                self.contexts
            )));
        }
        if !(1..=MAX_WORKSPACES).contains(&self.workspaces) {
            return Err(invalid(format!(
                "workspaces must be between 1 and {MAX_WORKSPACES}, got {}",
                self.workspaces
            )));
        }
        self.layout.validate()?;
        self.borders.resolve()?;

        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate(self.contexts, self.workspaces)
                .map_err(|msg| invalid(format!("rules[{index}]: {msg}")))?;
        }
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError { ConfigError::Invalid(message) }

// ============================================================================
// Layout
// ============================================================================

/// Default layout parameters of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    /// Windows in the master zone.
    pub nmaster: usize,
    /// Fraction of the width given to the master zone (0.05-0.95).
    pub mfactor: f64,
    /// Gap around every tiled window, in pixels.
    pub gap: i32,
    /// Put the master zone on the right.
    pub mirror: bool,
    /// Reserve the sidebar strip on the left edge.
    pub sidebar: bool,
    /// Width of the sidebar strip, in pixels.
    pub sidebar_width: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Tile,
            nmaster: 1,
            mfactor: 0.55,
            gap: 0,
            mirror: false,
            sidebar: false,
            sidebar_width: 24,
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.05..=0.95).contains(&self.mfactor) {
            return Err(invalid(format!(
                "layout.mfactor must be between 0.05 and 0.95, got {}",
                self.mfactor
            )));
        }
        if self.gap < 0 {
            return Err(invalid(format!("layout.gap must not be negative, got {}", self.gap)));
        }
        if self.sidebar_width < 0 {
            return Err(invalid(format!(
                "layout.sidebarWidth must not be negative, got {}",
                self.sidebar_width
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Borders
// ============================================================================

/// Border configuration. Colors are `#RRGGBB` hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BordersConfig {
    pub width: i32,
    pub focused: String,
    pub unfocused: String,
    pub urgent: String,
}

impl Default for BordersConfig {
    fn default() -> Self {
        Self {
            width: 1,
            focused: "#5e81ac".to_string(),
            unfocused: "#3b4252".to_string(),
            urgent: "#bf616a".to_string(),
        }
    }
}

/// Border settings with colors parsed to `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderColors {
    pub width: i32,
    pub focused: u32,
    pub unfocused: u32,
    pub urgent: u32,
}

impl Default for BorderColors {
    fn default() -> Self {
        BordersConfig::default().resolve().unwrap_or(Self {
            width: 1,
            focused: 0x005e_81ac,
            unfocused: 0x003b_4252,
            urgent: 0x00bf_616a,
        })
    }
}

impl BordersConfig {
    /// Parses the configured colors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a negative width or a malformed color.
    pub fn resolve(&self) -> Result<BorderColors, ConfigError> {
        if self.width < 0 {
            return Err(invalid(format!("borders.width must not be negative, got {}", self.width)));
        }
        let color = |key: &str, value: &str| {
            parse_hex_color(value)
                .ok_or_else(|| invalid(format!("borders.{key}: '{value}' is not a #RRGGBB color")))
        };
        Ok(BorderColors {
            width: self.width,
            focused: color("focused", &self.focused)?,
            unfocused: color("unfocused", &self.unfocused)?,
            urgent: color("urgent", &self.urgent)?,
        })
    }
}

/// Parses `#RRGGBB` (or `RRGGBB`) into `0xRRGGBB`.
#[must_use]
pub fn parse_hex_color(value: &str) -> Option<u32> {
    let hex = value.trim().strip_prefix('#').unwrap_or_else(|| value.trim());
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

// ============================================================================
// Rules
// ============================================================================

/// A window rule.
///
/// Criteria are regular expressions matched against the window's class,
/// instance and title; every given criterion must match. A rule without any
/// criterion never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Target context letter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<char>,
    /// Target workspace number (1-based).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<usize>,
    pub floating: bool,
    pub center: bool,
    pub fullscreen: bool,
    /// Close the window as soon as it is managed.
    pub autoclose: bool,
}

impl WindowRule {
    /// Returns true if the rule has at least one matching criterion.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.class.is_some() || self.instance.is_some() || self.title.is_some()
    }

    fn validate(&self, contexts: usize, workspaces: usize) -> Result<(), String> {
        for pattern in [&self.class, &self.instance, &self.title].into_iter().flatten() {
            regex::Regex::new(pattern).map_err(|err| format!("bad pattern '{pattern}': {err}"))?;
        }
        if let Some(letter) = self.context {
            match crate::wm::context::context_index(letter) {
                Some(index) if index < contexts => {}
                _ => return Err(format!("context '{letter}' does not exist")),
            }
        }
        if let Some(workspace) = self.workspace
            && !(1..=workspaces).contains(&workspace)
        {
            return Err(format!("workspace {workspace} does not exist"));
        }
        Ok(())
    }
}

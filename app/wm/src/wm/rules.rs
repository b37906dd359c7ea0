//! Window rule matching.
//!
//! Rules from the configuration are compiled once into a [`RuleSet`]. When a
//! window is managed, the first rule whose criteria all match decides where
//! it goes and how it is placed.
//!
//! # Examples
//!
//! ```text
//! // Rule: class = "^mpv$", floating = true, center = true
//! // Matches: every mpv window, placed floating in the middle of the screen
//!
//! // Rule: class = "firefox", title = "Picture-in-Picture", context = "b"
//! // Matches: Firefox PiP windows only (AND logic), sent to context b
//! ```

use regex::Regex;

use super::context::context_index;
use crate::config::WindowRule;
use crate::error::ConfigError;

/// Placement decided for a window being managed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ManageRule {
    /// Target context index.
    pub context: Option<usize>,
    /// Target workspace index (zero-based).
    pub workspace: Option<usize>,
    pub floating: bool,
    pub center: bool,
    pub fullscreen: bool,
    pub autoclose: bool,
}

impl ManageRule {
    /// Whether the rule names an explicit destination.
    #[must_use]
    pub const fn has_target(&self) -> bool { self.context.is_some() || self.workspace.is_some() }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    class: Option<Regex>,
    instance: Option<Regex>,
    title: Option<Regex>,
    action: ManageRule,
}

impl CompiledRule {
    fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        let criteria = [(&self.class, class), (&self.instance, instance), (&self.title, title)];
        let mut any = false;
        for (pattern, value) in criteria {
            if let Some(regex) = pattern {
                if !regex.is_match(value) {
                    return false;
                }
                any = true;
            }
        }
        any
    }
}

/// Compiled window rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compiles configuration rules.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a pattern fails to compile or a
    /// context letter is malformed.
    pub fn compile(rules: &[WindowRule]) -> Result<Self, ConfigError> {
        let compile = |pattern: &Option<String>| {
            pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|err| ConfigError::Invalid(format!("bad rule pattern: {err}")))
        };

        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if !rule.is_valid() {
                tracing::warn!(?rule, "window rule without criteria never matches, skipping");
                continue;
            }
            let context = match rule.context {
                Some(letter) => Some(context_index(letter).ok_or_else(|| {
                    ConfigError::Invalid(format!("rule context '{letter}' is not a letter"))
                })?),
                None => None,
            };
            compiled.push(CompiledRule {
                class: compile(&rule.class)?,
                instance: compile(&rule.instance)?,
                title: compile(&rule.title)?,
                action: ManageRule {
                    context,
                    workspace: rule.workspace.and_then(|ws| ws.checked_sub(1)),
                    floating: rule.floating,
                    center: rule.center,
                    fullscreen: rule.fullscreen,
                    autoclose: rule.autoclose,
                },
            });
        }
        Ok(Self { rules: compiled })
    }

    #[must_use]
    pub fn len(&self) -> usize { self.rules.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// Returns the action of the first matching rule, or the default rule.
    #[must_use]
    pub fn resolve(&self, class: &str, instance: &str, title: &str) -> ManageRule {
        self.rules
            .iter()
            .find(|rule| rule.matches(class, instance, title))
            .map(|rule| {
                tracing::debug!(class, instance, title, action = ?rule.action, "window rule matched");
                rule.action
            })
            .unwrap_or_default()
    }
}

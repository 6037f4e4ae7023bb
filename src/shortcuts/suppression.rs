//! Suppression policy: decides whether a key event reaches the matcher.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::key::KeyPress;
use super::registry::Registry;

/// Why an event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Focus is in a text-editable control
    TextField,
    /// A modifier is held that no binding asks for
    Modifier,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextField => f.write_str("focus in text field"),
            Self::Modifier => f.write_str("unbound modifier combination"),
        }
    }
}

/// Stateless per-event filter. Both rules are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionPolicy {
    /// Drop keys typed into text inputs, text areas and editable regions
    #[serde(default = "default_true")]
    pub text_fields: bool,
    /// Drop modified keys (ctrl, alt, super, meta, shift on named keys) unless a binding uses them
    #[serde(default = "default_true")]
    pub modifiers: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        Self {
            text_fields: true,
            modifiers: true,
        }
    }
}

impl SuppressionPolicy {
    /// Returns the reason to drop `event`, or `None` to let it through.
    #[must_use]
    pub fn reason(&self, event: &KeyPress, registry: &Registry) -> Option<SuppressReason> {
        if self.text_fields && event.target.is_text_editable() {
            return Some(SuppressReason::TextField);
        }
        if self.modifiers && event.token.has_modifiers() && !registry.requires_modifiers(&event.token)
        {
            return Some(SuppressReason::Modifier);
        }
        None
    }

    #[must_use]
    pub fn should_suppress(&self, event: &KeyPress, registry: &Registry) -> bool {
        self.reason(event, registry).is_some()
    }
}

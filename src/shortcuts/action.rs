//! Application actions.
//!
//! This enum is the bridge between keymap entries and application behavior:
//! the keymap names an action by id, and the handler bound to its sequence
//! queues the action for the host application to apply.

use serde::{Serialize, Serializer};
use std::fmt;

/// All actions a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // === NAVIGATION ===
    NavigateUp,
    NavigateDown,
    JumpToFirst,
    JumpToLast,
    GotoItems,
    GotoChecklist,
    NextPane,

    // === ACTIONS ===
    ToggleItem,
    FocusFilter,
    ClearFilter,
    ToggleHelp,
    PauseShortcuts,
    Cancel,
    Quit,

    // === VIEWS ===
    ViewCompact,
    ViewDetailed,
    ToggleChecklist,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::NavigateUp,
        Self::NavigateDown,
        Self::JumpToFirst,
        Self::JumpToLast,
        Self::GotoItems,
        Self::GotoChecklist,
        Self::NextPane,
        Self::ToggleItem,
        Self::FocusFilter,
        Self::ClearFilter,
        Self::ToggleHelp,
        Self::PauseShortcuts,
        Self::Cancel,
        Self::Quit,
        Self::ViewCompact,
        Self::ViewDetailed,
        Self::ToggleChecklist,
    ];

    /// Get the action ID string used in keymap files
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            // Navigation
            Self::NavigateUp => "navigate_up",
            Self::NavigateDown => "navigate_down",
            Self::JumpToFirst => "jump_first",
            Self::JumpToLast => "jump_last",
            Self::GotoItems => "goto_items",
            Self::GotoChecklist => "goto_checklist",
            Self::NextPane => "next_pane",

            // Actions
            Self::ToggleItem => "toggle_item",
            Self::FocusFilter => "focus_filter",
            Self::ClearFilter => "clear_filter",
            Self::ToggleHelp => "toggle_help",
            Self::PauseShortcuts => "pause_shortcuts",
            Self::Cancel => "cancel",
            Self::Quit => "quit",

            // Views
            Self::ViewCompact => "view_compact",
            Self::ViewDetailed => "view_detailed",
            Self::ToggleChecklist => "toggle_checklist",
        }
    }

    /// Looks up an action by its keymap id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_and_resolve() {
        let ids: HashSet<&str> = Action::ALL.iter().map(Action::id).collect();
        assert_eq!(ids.len(), Action::ALL.len());

        for action in Action::ALL {
            assert_eq!(Action::from_id(action.id()), Some(action));
        }
        assert_eq!(Action::from_id("launch_rockets"), None);
    }
}

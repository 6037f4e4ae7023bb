//! Applies actions fired by shortcuts to the application state.

use tracing::debug;

use crate::shortcuts::Action;
use crate::tui::{AppState, HelpOverlay, Pane, ViewMode};

/// Apply one action. Navigation goes to the help overlay while it is open.
pub fn dispatch_action(state: &mut AppState, action: Action) {
    debug!(%action, "applying action");
    state.clear_messages();

    if state.show_help && scroll_help(state, action) {
        return;
    }

    match action {
        Action::NavigateUp => move_cursor(state, |cursor, _| cursor.saturating_sub(1)),
        Action::NavigateDown => move_cursor(state, |cursor, len| (cursor + 1).min(len - 1)),
        Action::JumpToFirst => move_cursor(state, |_, _| 0),
        Action::JumpToLast => move_cursor(state, |_, len| len - 1),
        Action::GotoItems => state.pane = Pane::Items,
        Action::GotoChecklist => {
            state.show_checklist = true;
            state.pane = Pane::Checklist;
        }
        Action::NextPane => {
            state.pane = match state.pane {
                Pane::Items if state.show_checklist => Pane::Checklist,
                _ => Pane::Items,
            };
        }
        Action::ToggleItem => toggle_item(state),
        Action::FocusFilter => state.filter.set_focused(true),
        Action::ClearFilter => {
            state.filter.clear();
            state.item_cursor = 0;
            state.set_status("Filter cleared");
        }
        Action::ToggleHelp => {
            state.show_help = !state.show_help;
            state.help.scroll_to_top();
        }
        Action::PauseShortcuts => {
            let enabled = !state.dispatcher.is_enabled();
            state.dispatcher.set_enabled(enabled);
            state.set_status(if enabled {
                "Shortcuts resumed"
            } else {
                "Shortcuts paused"
            });
        }
        Action::Cancel => {
            if state.show_help {
                state.show_help = false;
            } else if !state.filter.value().is_empty() {
                state.filter.clear();
                state.item_cursor = 0;
            }
        }
        Action::Quit => state.should_quit = true,
        Action::ViewCompact => state.view = ViewMode::Compact,
        Action::ViewDetailed => state.view = ViewMode::Detailed,
        Action::ToggleChecklist => {
            state.show_checklist = !state.show_checklist;
            if !state.show_checklist {
                state.pane = Pane::Items;
            }
        }
    }
}

/// Returns true if the action was consumed as a help scroll.
fn scroll_help(state: &mut AppState, action: Action) -> bool {
    let total = HelpOverlay::content(&state.dispatcher, &state.theme).len();
    match action {
        Action::NavigateUp => state.help.scroll_up(),
        Action::NavigateDown => state.help.scroll_down(total),
        Action::JumpToFirst => state.help.scroll_to_top(),
        Action::JumpToLast => state.help.scroll_to_bottom(total),
        _ => return false,
    }
    true
}

/// Moves the cursor of the focused pane. `step` receives the cursor and a
/// non-zero length.
fn move_cursor(state: &mut AppState, step: impl Fn(usize, usize) -> usize) {
    match state.pane {
        Pane::Items => {
            let len = state.visible_items().len();
            if len > 0 {
                state.item_cursor = step(state.item_cursor.min(len - 1), len);
            }
        }
        Pane::Checklist => {
            let len = state.checklist.len();
            if len > 0 {
                state.checklist_cursor = step(state.checklist_cursor, len);
            }
        }
    }
}

fn toggle_item(state: &mut AppState) {
    match state.pane {
        Pane::Checklist => {
            if let Some(entry) = state.checklist.get_mut(state.checklist_cursor) {
                entry.done = !entry.done;
            }
        }
        Pane::Items => {
            let message = state
                .visible_items()
                .get(state.item_cursor)
                .map(|item| format!("{}: {}% of quota used", item.name, item.quota_used));
            if let Some(message) = message {
                state.set_status(message);
            }
        }
    }
}

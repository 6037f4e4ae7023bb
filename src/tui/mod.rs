//! Terminal user interface hosting the shortcut dispatcher.
//!
//! This module contains the main TUI loop, `AppState`, the scoped terminal
//! guard, and the widgets. Every key event is routed through the
//! [`Dispatcher`]; actions fired by shortcut handlers are queued and applied
//! once the dispatcher has returned.

// Allow intentional type casts for terminal coordinates
#![allow(clippy::cast_possible_truncation)]

pub mod component;
pub mod filter_input;
pub mod handlers;
pub mod help_overlay;
pub mod item_list;
pub mod status_bar;
pub mod theme;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Clear},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::Config;
use crate::keymap::{ActionQueue, Keymap};
use crate::shortcuts::{
    Action, Dispatcher, KeyPress, Outcome, StateSnapshot, SuppressReason, Target,
};

pub use component::Component;
pub use filter_input::{FilterEvent, FilterInput};
pub use help_overlay::{HelpOverlay, HelpOverlayState};
pub use item_list::{ChecklistEntry, Item, ItemList};
pub use status_bar::StatusBar;
pub use theme::Theme;

/// Which pane receives navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Items,
    Checklist,
}

/// How items are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Compact,
    Detailed,
}

/// Application state for the TUI.
pub struct AppState {
    pub items: Vec<Item>,
    pub checklist: Vec<ChecklistEntry>,
    /// Cursor into the filtered item list
    pub item_cursor: usize,
    pub checklist_cursor: usize,
    pub pane: Pane,
    pub view: ViewMode,
    pub show_checklist: bool,
    pub show_help: bool,
    pub help: HelpOverlayState,
    pub filter: FilterInput,
    pub status_message: String,
    pub error_message: Option<String>,
    pub should_quit: bool,
    pub theme: Theme,
    pub config: Config,
    pub keymap: Keymap,
    pub dispatcher: Dispatcher,
    actions: ActionQueue,
    shortcut_state: Rc<RefCell<StateSnapshot>>,
}

impl AppState {
    /// Builds the application state and registers the keymap.
    pub fn new(config: Config, keymap: Keymap) -> Result<Self> {
        let mut dispatcher = Dispatcher::new(config.dispatcher_settings());
        let actions = ActionQueue::new();
        dispatcher
            .register(keymap.queued_definitions(&actions))
            .context("Failed to register keymap")?;

        // The status bar and help overlay render from this snapshot
        let shortcut_state = Rc::new(RefCell::new(dispatcher.snapshot()));
        let sink = Rc::clone(&shortcut_state);
        dispatcher.subscribe(move |snapshot| {
            *sink.borrow_mut() = snapshot.clone();
        });

        Ok(Self {
            items: Item::samples(),
            checklist: ChecklistEntry::samples(),
            item_cursor: 0,
            checklist_cursor: 0,
            pane: Pane::Items,
            view: ViewMode::Compact,
            show_checklist: true,
            show_help: config.ui.show_help_on_startup,
            help: HelpOverlayState::new(),
            filter: FilterInput::new(),
            status_message: String::new(),
            error_message: None,
            should_quit: false,
            theme: Theme::from_mode(config.ui.theme_mode),
            config,
            keymap,
            dispatcher,
            actions,
            shortcut_state,
        })
    }

    /// Latest dispatcher state pushed to this app.
    #[must_use]
    pub fn shortcut_state(&self) -> StateSnapshot {
        self.shortcut_state.borrow().clone()
    }

    /// Items matching the current filter (case-insensitive substring).
    #[must_use]
    pub fn visible_items(&self) -> Vec<&Item> {
        let needle = self.filter.value().to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Swaps in a new keymap. On failure the previous shortcuts stay active.
    pub fn replace_keymap(&mut self, keymap: Keymap) -> Result<()> {
        self.dispatcher
            .register(keymap.queued_definitions(&self.actions))
            .context("Failed to register keymap")?;
        self.keymap = keymap;
        Ok(())
    }

    /// Routes one terminal key event.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        let target = if self.filter.is_focused() {
            Target::TextInput
        } else {
            Target::Document
        };
        let Some(press) = KeyPress::from_crossterm(&key, target, now) else {
            return Ok(());
        };

        if !self.dispatcher.is_enabled() {
            // While paused, only the pause binding itself is honored
            if self.keymap.sequence_for(Action::PauseShortcuts) == Some(&[press.token][..]) {
                self.apply_action(Action::PauseShortcuts);
            }
            return Ok(());
        }

        let outcome = self.dispatcher.handle_event(&press)?;
        debug!(key = %press.token, ?outcome, "key handled");
        if outcome == Outcome::Suppressed(SuppressReason::TextField) {
            if let Some(event) = self.filter.handle_input(key) {
                self.handle_filter_event(event);
            }
        }

        for action in self.actions.drain() {
            self.apply_action(action);
        }
        Ok(())
    }

    /// Applies an action fired by a shortcut.
    pub fn apply_action(&mut self, action: Action) {
        handlers::dispatch_action(self, action);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.error_message = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn clear_messages(&mut self) {
        self.status_message.clear();
        self.error_message = None;
    }

    fn handle_filter_event(&mut self, event: FilterEvent) {
        match event {
            FilterEvent::Changed(_) => self.item_cursor = 0,
            FilterEvent::Submitted | FilterEvent::Cancelled => self.filter.set_focused(false),
        }
    }

    /// Poll timeout: the tick rate, shortened to wake for a chord deadline.
    #[must_use]
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let tick = self.config.tick_rate();
        self.dispatcher
            .next_deadline()
            .map_or(tick, |deadline| tick.min(deadline.saturating_duration_since(now)))
    }
}

/// Scoped ownership of the terminal: raw mode and the alternate screen are
/// entered on acquisition and restored when the guard drops.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn acquire() -> Result<Self> {
        Ok(Self {
            terminal: setup_terminal()?,
        })
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal(&mut self.terminal) {
            warn!("Failed to restore terminal: {e:#}");
        }
    }
}

/// Initialize terminal for TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main event loop. The dispatcher listens only while this runs.
pub fn run_tui(state: &mut AppState, guard: &mut TerminalGuard) -> Result<()> {
    state.dispatcher.start();
    let result = event_loop(state, guard.terminal_mut());
    state.dispatcher.stop();
    result
}

fn event_loop(
    state: &mut AppState,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, state))?;

        if event::poll(state.poll_timeout(Instant::now()))? {
            // Resize and mouse events just trigger the redraw above
            if let Event::Key(key) = event::read()? {
                if let Err(e) = state.handle_key(key, Instant::now()) {
                    warn!("shortcut handler failed: {e:#}");
                    state.set_error(format!("{e:#}"));
                }
            }
        }

        state.dispatcher.tick(Instant::now());

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

/// Render the UI from current state
fn render(f: &mut Frame, state: &AppState) {
    let full_bg = Block::default().style(Style::default().bg(state.theme.background));
    f.render_widget(full_bg, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter
            Constraint::Min(5),    // Lists
            Constraint::Length(4), // Status bar
        ])
        .split(f.area());

    state.filter.render(f, chunks[0], &state.theme);
    ItemList::render(f, chunks[1], state, &state.theme);
    StatusBar::render(f, chunks[2], state, &state.theme);

    if state.show_help {
        let area = centered_rect(70, 80, f.area());
        f.render_widget(Clear, area);
        HelpOverlay::render(f, area, state, &state.theme);
    }
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn app() -> AppState {
        let mut state = AppState::new(Config::new(), Keymap::load_default().unwrap()).unwrap();
        state.dispatcher.start();
        state
    }

    fn press(state: &mut AppState, code: KeyCode, at: Instant) {
        state
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE), at)
            .unwrap();
    }

    #[test]
    fn test_chord_switches_pane() {
        let mut state = app();
        let t0 = Instant::now();

        press(&mut state, KeyCode::Char('g'), t0);
        assert_eq!(state.shortcut_state().pending.len(), 1);
        assert_eq!(state.pane, Pane::Items);

        press(&mut state, KeyCode::Char('c'), t0 + Duration::from_millis(100));
        assert_eq!(state.pane, Pane::Checklist);
        assert!(state.shortcut_state().pending.is_empty());
    }

    #[test]
    fn test_help_toggle() {
        let mut state = app();
        let t0 = Instant::now();
        press(&mut state, KeyCode::Char('?'), t0);
        assert!(state.show_help);
        press(&mut state, KeyCode::Esc, t0);
        assert!(!state.show_help);
    }

    #[test]
    fn test_filter_typing_is_not_a_shortcut() {
        let mut state = app();
        let t0 = Instant::now();

        press(&mut state, KeyCode::Char('/'), t0);
        assert!(state.filter.is_focused());

        // "q" would quit, "g" would start a chord
        press(&mut state, KeyCode::Char('q'), t0);
        press(&mut state, KeyCode::Char('g'), t0);
        assert!(!state.should_quit);
        assert!(state.shortcut_state().pending.is_empty());
        assert_eq!(state.filter.value(), "qg");

        press(&mut state, KeyCode::Enter, t0);
        assert!(!state.filter.is_focused());
        press(&mut state, KeyCode::Char('q'), t0);
        assert!(state.should_quit);
    }

    #[test]
    fn test_pause_blocks_everything_but_resume() {
        let mut state = app();
        let t0 = Instant::now();
        let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);

        state.handle_key(ctrl_p, t0).unwrap();
        assert!(!state.dispatcher.is_enabled());
        assert!(!state.shortcut_state().enabled);

        press(&mut state, KeyCode::Char('q'), t0);
        assert!(!state.should_quit);

        state.handle_key(ctrl_p, t0).unwrap();
        assert!(state.dispatcher.is_enabled());
        press(&mut state, KeyCode::Char('q'), t0);
        assert!(state.should_quit);
    }

    #[test]
    fn test_poll_timeout_shortened_by_pending_chord() {
        let mut state = app();
        let t0 = Instant::now();
        assert_eq!(state.poll_timeout(t0), state.config.tick_rate());

        press(&mut state, KeyCode::Char('g'), t0);
        let near_deadline = t0 + Duration::from_millis(950);
        assert!(state.poll_timeout(near_deadline) < state.config.tick_rate());
    }
}

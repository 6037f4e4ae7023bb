//! Status bar widget for displaying status messages and the chord indicator

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{AppState, Theme};
use crate::shortcuts::{format_sequence, Action};

/// Actions advertised in the hints line, in display order
const HINT_ACTIONS: [(Action, &str); 5] = [
    (Action::ToggleHelp, "Help"),
    (Action::FocusFilter, "Filter"),
    (Action::GotoChecklist, "Checklist"),
    (Action::PauseShortcuts, "Pause"),
    (Action::Quit, "Quit"),
];

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn render(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let first_line = if let Some(error) = &state.error_message {
            Line::from(vec![
                Span::styled("ERROR: ", Style::default().fg(theme.error)),
                Span::raw(error.clone()),
            ])
        } else if !state.status_message.is_empty() {
            Line::from(state.status_message.clone())
        } else {
            Self::hints_line(state, theme)
        };

        let status = Paragraph::new(vec![first_line, Self::shortcut_line(state, theme)])
            .style(Style::default().bg(theme.background))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Status ")
                    .style(Style::default().bg(theme.background)),
            );

        f.render_widget(status, area);
    }

    /// Pending chord and paused indicator, from the last pushed snapshot.
    fn shortcut_line(state: &AppState, theme: &Theme) -> Line<'static> {
        let snapshot = state.shortcut_state();
        let mut spans = Vec::new();

        if snapshot.enabled {
            spans.push(Span::styled("Shortcuts: on", Style::default().fg(theme.success)));
        } else {
            spans.push(Span::styled(
                "Shortcuts: paused",
                Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
            ));
            if let Some(keys) = state.keymap.sequence_for(Action::PauseShortcuts) {
                spans.push(Span::styled(
                    format!(" ({} to resume)", format_sequence(keys)),
                    Style::default().fg(theme.text_muted),
                ));
            }
        }

        if !snapshot.pending.is_empty() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{} …", format_sequence(&snapshot.pending)),
                Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
            ));
        }

        Line::from(spans)
    }

    /// Key hints for a few common actions, using the active keymap.
    fn hints_line(state: &AppState, theme: &Theme) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (action, label) in HINT_ACTIONS {
            let Some(keys) = state.keymap.sequence_for(action) else {
                continue;
            };
            if !spans.is_empty() {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                format_sequence(keys),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(label, Style::default().fg(theme.text_muted)));
        }
        Line::from(spans)
    }
}

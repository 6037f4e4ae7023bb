//! Help overlay widget showing all keyboard shortcuts organized by category.
//!
//! The listing is generated from the dispatcher's registry, so it always
//! matches what is bound. While a chord is pending, the definitions that can
//! still complete it are highlighted and the rest are dimmed.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::{AppState, Theme};
use crate::shortcuts::{format_sequence, Dispatcher, KeyToken};

/// Width of the key column in the listing
const KEY_COLUMN_WIDTH: usize = 18;

/// State for the help overlay.
#[derive(Debug, Clone, Default)]
pub struct HelpOverlayState {
    /// Current scroll offset (line number)
    pub scroll_offset: usize,
}

impl HelpOverlayState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scroll up by one line.
    pub const fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scroll down by one line, stopping at the last of `total_lines`.
    pub const fn scroll_down(&mut self, total_lines: usize) {
        if self.scroll_offset + 1 < total_lines {
            self.scroll_offset += 1;
        }
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self, total_lines: usize) {
        self.scroll_offset = total_lines.saturating_sub(1);
    }
}

/// Help overlay widget
pub struct HelpOverlay;

impl HelpOverlay {
    /// Builds the help listing for the dispatcher's current shortcuts.
    #[must_use]
    pub fn content(dispatcher: &Dispatcher, theme: &Theme) -> Vec<Line<'static>> {
        let pending = dispatcher.pending();
        let mut lines = vec![
            Line::from(Span::styled(
                "Keyboard Shortcuts",
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for (category, definitions) in dispatcher.by_category() {
            lines.push(Line::from(Span::styled(
                format!("═══ {} ═══", category.title()),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));

            for definition in definitions {
                let (key_style, text_style) = Self::entry_styles(definition.sequence(), pending, theme);
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<KEY_COLUMN_WIDTH$}", definition.display_keys()),
                        key_style,
                    ),
                    Span::styled(definition.description().to_string(), text_style),
                ]));
            }
            lines.push(Line::from(""));
        }

        if !dispatcher.is_enabled() {
            lines.push(Line::from(Span::styled(
                "Shortcuts are paused",
                Style::default().fg(theme.warning),
            )));
        }

        lines
    }

    fn entry_styles(sequence: &[KeyToken], pending: &[KeyToken], theme: &Theme) -> (Style, Style) {
        if pending.is_empty() {
            (Style::default().fg(theme.success), Style::default().fg(theme.text))
        } else if sequence.len() > pending.len() && sequence.starts_with(pending) {
            (
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                Style::default().fg(theme.text),
            )
        } else {
            (
                Style::default().fg(theme.text_muted),
                Style::default().fg(theme.text_muted),
            )
        }
    }

    /// Render the help overlay
    pub fn render(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let content = Self::content(&state.dispatcher, theme);
        let total_lines = content.len();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        // Subtract 2 for borders
        let visible_height = chunks[0].height.saturating_sub(2) as usize;
        let max_offset = total_lines.saturating_sub(visible_height);
        let offset = state.help.scroll_offset.min(max_offset);

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(theme.primary))
                    .style(Style::default().bg(theme.background)),
            )
            .scroll((offset as u16, 0));
        f.render_widget(paragraph, chunks[0]);

        if total_lines > visible_height {
            let mut scrollbar_state = ScrollbarState::new(max_offset).position(offset);
            f.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                chunks[0],
                &mut scrollbar_state,
            );
        }

        let pending = state.dispatcher.pending();
        let footer = if pending.is_empty() {
            Line::from(Span::styled(
                "j/k scroll  esc close",
                Style::default().fg(theme.text_muted),
            ))
        } else {
            Line::from(vec![
                Span::styled("Pending: ", Style::default().fg(theme.text_muted)),
                Span::styled(
                    format!("{} …", format_sequence(pending)),
                    Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
                ),
            ])
        };
        f.render_widget(
            Paragraph::new(footer).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

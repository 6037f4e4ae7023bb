//! Single-line filter field.
//!
//! While this field has focus, key events are tagged as text input, so the
//! shortcut dispatcher suppresses them and typing reaches the field instead.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::component::Component;
use super::Theme;

/// Events emitted by the filter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    /// Text changed
    Changed(String),
    /// Enter pressed, keep the filter and leave the field
    Submitted,
    /// Esc pressed, leave the field
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct FilterInput {
    value: String,
    /// Cursor position in characters
    cursor: usize,
    focused: bool,
}

impl FilterInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.cursor = self.value.chars().count();
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }
}

impl Component for FilterInput {
    type Event = FilterEvent;

    fn handle_input(&mut self, key: KeyEvent) -> Option<FilterEvent> {
        match key.code {
            KeyCode::Enter => Some(FilterEvent::Submitted),
            KeyCode::Esc => Some(FilterEvent::Cancelled),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let at = self.byte_index();
                self.value.insert(at, c);
                self.cursor += 1;
                Some(FilterEvent::Changed(self.value.clone()))
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index();
                self.value.remove(at);
                Some(FilterEvent::Changed(self.value.clone()))
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
                None
            }
            KeyCode::Home => {
                self.cursor = 0;
                None
            }
            KeyCode::End => {
                self.cursor = self.value.chars().count();
                None
            }
            _ => None,
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let border = if self.focused {
            theme.accent
        } else {
            theme.text_muted
        };

        let mut spans = vec![Span::styled("/ ", Style::default().fg(theme.text_muted))];
        if self.value.is_empty() && !self.focused {
            spans.push(Span::styled(
                "press / to filter",
                Style::default().fg(theme.text_muted),
            ));
        } else {
            let (before, after) = self.value.split_at(self.byte_index());
            spans.push(Span::styled(before.to_string(), Style::default().fg(theme.text)));
            if self.focused {
                spans.push(Span::styled(
                    "▏",
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                ));
            }
            spans.push(Span::styled(after.to_string(), Style::default().fg(theme.text)));
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Filter ")
                .border_style(Style::default().fg(border)),
        );
        f.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_editing() {
        let mut input = FilterInput::new();
        input.set_focused(true);

        assert_eq!(
            input.handle_input(key(KeyCode::Char('g'))),
            Some(FilterEvent::Changed("g".to_string()))
        );
        input.handle_input(key(KeyCode::Char('c')));
        input.handle_input(key(KeyCode::Left));
        input.handle_input(key(KeyCode::Char('é')));
        assert_eq!(input.value(), "géc");

        input.handle_input(key(KeyCode::Backspace));
        assert_eq!(input.value(), "gc");
        input.handle_input(key(KeyCode::Home));
        assert_eq!(input.handle_input(key(KeyCode::Backspace)), None);
    }

    #[test]
    fn test_enter_and_escape() {
        let mut input = FilterInput::new();
        assert_eq!(
            input.handle_input(key(KeyCode::Enter)),
            Some(FilterEvent::Submitted)
        );
        assert_eq!(
            input.handle_input(key(KeyCode::Esc)),
            Some(FilterEvent::Cancelled)
        );
    }

    #[test]
    fn test_control_chars_not_inserted() {
        let mut input = FilterInput::new();
        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_input(ctrl_l), None);
        assert!(input.value().is_empty());
    }
}

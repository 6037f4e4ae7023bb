//! Item list and checklist panes.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use super::{AppState, Pane, Theme, ViewMode};

/// Width of the quota gauge in detailed view
const GAUGE_WIDTH: usize = 10;

/// A row in the main list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub detail: String,
    /// Percentage of quota used, 0..=100
    pub quota_used: u8,
}

impl Item {
    #[must_use]
    pub fn new(name: &str, detail: &str, quota_used: u8) -> Self {
        Self {
            name: name.to_string(),
            detail: detail.to_string(),
            quota_used: quota_used.min(100),
        }
    }

    /// Rows shown when the app starts.
    #[must_use]
    pub fn samples() -> Vec<Self> {
        vec![
            Self::new("api-gateway", "Edge routing and auth", 72),
            Self::new("billing", "Invoices and payment retries", 41),
            Self::new("build-cache", "Shared compilation cache", 93),
            Self::new("docs-site", "Static documentation", 8),
            Self::new("email-relay", "Outbound notification mail", 55),
            Self::new("feature-flags", "Runtime toggles", 17),
            Self::new("log-archive", "Cold storage for logs", 88),
            Self::new("metrics", "Time series ingestion", 64),
            Self::new("search-index", "Full text index", 36),
            Self::new("uploads", "User file storage", 79),
        ]
    }

    fn gauge(&self) -> String {
        let filled = usize::from(self.quota_used) * GAUGE_WIDTH / 100;
        format!(
            "[{}{}] {:>3}%",
            "#".repeat(filled),
            "-".repeat(GAUGE_WIDTH - filled),
            self.quota_used
        )
    }
}

/// A checkbox row in the side pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistEntry {
    pub label: String,
    pub done: bool,
}

impl ChecklistEntry {
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            done: false,
        }
    }

    #[must_use]
    pub fn samples() -> Vec<Self> {
        vec![
            Self::new("Review quotas over 80%"),
            Self::new("Rotate gateway keys"),
            Self::new("Prune build cache"),
            Self::new("Archive old logs"),
        ]
    }
}

/// Renders the item list and, when shown, the checklist beside it.
pub struct ItemList;

impl ItemList {
    pub fn render(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let areas = if state.show_checklist {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(area)
        } else {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(100)])
                .split(area)
        };

        Self::render_items(f, areas[0], state, theme);
        if state.show_checklist {
            Self::render_checklist(f, areas[1], state, theme);
        }
    }

    fn pane_block(title: String, focused: bool, theme: &Theme) -> Block<'static> {
        let border = if focused { theme.primary } else { theme.text_muted };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border))
    }

    fn highlight(theme: &Theme) -> Style {
        Style::default()
            .bg(theme.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    fn render_items(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let visible = state.visible_items();
        let rows: Vec<ListItem> = visible
            .iter()
            .map(|item| {
                let name = Span::styled(item.name.clone(), Style::default().fg(theme.text));
                match state.view {
                    ViewMode::Compact => ListItem::new(Line::from(name)),
                    ViewMode::Detailed => {
                        let gauge_color = if item.quota_used >= 80 {
                            theme.error
                        } else {
                            theme.success
                        };
                        ListItem::new(vec![
                            Line::from(vec![
                                name,
                                Span::raw("  "),
                                Span::styled(item.gauge(), Style::default().fg(gauge_color)),
                            ]),
                            Line::from(Span::styled(
                                format!("  {}", item.detail),
                                Style::default().fg(theme.text_secondary),
                            )),
                        ])
                    }
                }
            })
            .collect();

        let title = format!(" Items ({}/{}) ", visible.len(), state.items.len());
        let list = List::new(rows)
            .block(Self::pane_block(title, state.pane == Pane::Items, theme))
            .highlight_style(Self::highlight(theme));

        let mut list_state = ListState::default();
        if !visible.is_empty() {
            list_state.select(Some(state.item_cursor.min(visible.len() - 1)));
        }
        f.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_checklist(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let rows: Vec<ListItem> = state
            .checklist
            .iter()
            .map(|entry| {
                let (mark, color) = if entry.done {
                    ("[x] ", theme.success)
                } else {
                    ("[ ] ", theme.text_muted)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, Style::default().fg(color)),
                    Span::styled(entry.label.clone(), Style::default().fg(theme.text)),
                ]))
            })
            .collect();

        let done = state.checklist.iter().filter(|e| e.done).count();
        let title = format!(" Checklist ({done}/{}) ", state.checklist.len());
        let list = List::new(rows)
            .block(Self::pane_block(title, state.pane == Pane::Checklist, theme))
            .highlight_style(Self::highlight(theme));

        let mut list_state = ListState::default();
        if !state.checklist.is_empty() {
            list_state.select(Some(state.checklist_cursor.min(state.checklist.len() - 1)));
        }
        f.render_stateful_widget(list, area, &mut list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_rendering() {
        assert_eq!(Item::new("a", "", 0).gauge(), "[----------]   0%");
        assert_eq!(Item::new("a", "", 55).gauge(), "[#####-----]  55%");
        assert_eq!(Item::new("a", "", 250).gauge(), "[##########] 100%");
    }
}

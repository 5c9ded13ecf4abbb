use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::tabbar::item::{TabBadge, TabItem};
use crate::ui::theme::Theme;

/// Bottom navigation bar: one equal-width cell per visible tab, the active
/// one inverted, badges rendered inline after the label.
pub struct TabBar<'a> {
    pub tabs: &'a [TabItem],
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [TabItem], selected: usize, theme: &'a Theme) -> Self {
        Self {
            tabs,
            selected,
            theme,
        }
    }
}

fn badge_text(badge: &TabBadge) -> String {
    match badge {
        TabBadge::Dot => "●".to_string(),
        TabBadge::Count(n) => format!("{n}"),
        TabBadge::Text(text) => text.clone(),
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.tabs.is_empty() || inner.width == 0 || inner.height == 0 {
            return;
        }

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                self.tabs
                    .iter()
                    .map(|_| Constraint::Ratio(1, self.tabs.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(inner);

        for (i, tab) in self.tabs.iter().enumerate() {
            let is_active = i == self.selected;
            let base = if is_active {
                Style::default()
                    .fg(colors.tab_active_fg())
                    .bg(colors.tab_active_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.tab_inactive()).bg(colors.bg())
            };

            let mut spans = vec![Span::styled(
                format!(" {} {} ", tab.icon, tab.label),
                base,
            )];
            if let Some(badge) = &tab.badge {
                spans.push(Span::styled(
                    format!(" {} ", badge_text(badge)),
                    Style::default()
                        .fg(colors.badge_fg())
                        .bg(colors.badge_bg())
                        .add_modifier(Modifier::BOLD),
                ));
            }

            if i < cells.len() {
                // Paint the cell background first so the active style covers
                // the full cell, not just the label.
                if is_active {
                    for x in cells[i].x..cells[i].right() {
                        for y in cells[i].y..cells[i].bottom() {
                            buf[(x, y)].set_style(Style::default().bg(colors.tab_active_bg()));
                        }
                    }
                }
                Paragraph::new(Line::from(spans)).render(cells[i], buf);
            }
        }
    }
}

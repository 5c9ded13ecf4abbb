use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::bank::pack::QuestionPack;
use crate::ui::theme::Theme;

/// Selectable list of question packs. Used both to pick a pack to drill
/// and to manage imported packs.
pub struct PackList<'a> {
    pub title: &'a str,
    pub packs: &'a [QuestionPack],
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> PackList<'a> {
    pub fn new(title: &'a str, packs: &'a [QuestionPack], selected: usize, theme: &'a Theme) -> Self {
        Self {
            title,
            packs,
            selected,
            theme,
        }
    }
}

impl Widget for PackList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.packs.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No packs. Import one with --import <file>.",
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
            return;
        }

        let lines: Vec<Line> = self
            .packs
            .iter()
            .enumerate()
            .map(|(i, pack)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let origin = if pack.pack_id == "builtin" { " (built-in)" } else { "" };
                let label = format!(
                    " {indicator} {} · v{} · {} questions{origin}",
                    pack.title,
                    pack.version,
                    pack.len(),
                );
                let style = if is_selected {
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(label, style))
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

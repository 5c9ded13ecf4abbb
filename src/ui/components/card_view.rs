use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::cards::CardDeck;
use crate::session::browse::CardBrowse;
use crate::ui::theme::Theme;

/// A single flashcard, front or back, with collection and filter state in
/// the frame title.
pub struct CardView<'a> {
    pub deck: &'a CardDeck,
    pub browse: &'a CardBrowse,
    pub theme: &'a Theme,
}

impl<'a> CardView<'a> {
    pub fn new(deck: &'a CardDeck, browse: &'a CardBrowse, theme: &'a Theme) -> Self {
        Self {
            deck,
            browse,
            theme,
        }
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let visible = self.browse.visible_indices(self.deck);

        let mut title = format!(" Cards {}/{} ",
            if visible.is_empty() { 0 } else { self.browse.position(self.deck) + 1 },
            visible.len(),
        );
        if self.browse.collected_only() {
            title.push_str("· collected ");
        }

        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let Some(index) = self.browse.current_index(self.deck) else {
            let hint = if self.browse.collected_only() {
                "No collected cards yet. Press c on a card to collect it."
            } else {
                "No cards available."
            };
            Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(colors.muted()),
            )))
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        };
        let card = &self.deck.cards()[index];

        let star = if card.collected { "★" } else { "☆" };
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    format!("{star} "),
                    Style::default().fg(colors.warning()),
                ),
                Span::styled(
                    card.title.clone(),
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                card.chapter.clone(),
                Style::default().fg(colors.muted()),
            )),
            Line::from(""),
        ];

        if self.browse.show_back() {
            lines.push(Line::from(Span::styled(
                card.content.clone(),
                Style::default().fg(colors.fg()),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "· · ·",
                Style::default().fg(colors.accent_dim()),
            )));
            lines.push(Line::from(Span::styled(
                "space to flip",
                Style::default().fg(colors.muted()),
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

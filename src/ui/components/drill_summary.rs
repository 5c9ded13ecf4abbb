use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::session::quiz::QuizSession;
use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

/// End-of-drill popup with the score.
pub struct DrillSummary<'a> {
    pub session: &'a QuizSession,
    pub theme: &'a Theme,
}

impl<'a> DrillSummary<'a> {
    pub fn new(session: &'a QuizSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

impl Widget for DrillSummary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let popup = centered_rect(50, 50, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" Drill complete ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(popup);
        block.render(popup, buf);

        let answered = self.session.correct_count() + self.session.wrong_count();
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{} of {} questions answered", answered, self.session.total()),
                Style::default().fg(colors.fg()),
            )),
            Line::from(vec![
                Span::styled(
                    format!("{} correct", self.session.correct_count()),
                    Style::default().fg(colors.correct()).add_modifier(Modifier::BOLD),
                ),
                Span::styled("  ·  ", Style::default().fg(colors.muted())),
                Span::styled(
                    format!("{} wrong", self.session.wrong_count()),
                    Style::default().fg(colors.incorrect()).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!("{:.0}% accuracy", self.session.accuracy() * 100.0),
                Style::default().fg(colors.accent()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "r retry · esc back",
                Style::default().fg(colors.muted()),
            )),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

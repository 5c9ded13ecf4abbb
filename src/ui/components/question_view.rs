use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::quiz::QuizSession;
use crate::ui::theme::Theme;

/// One quiz question: prompt, options with the selection cursor, and after
/// reveal the verdict plus analysis.
pub struct QuestionView<'a> {
    pub session: &'a QuizSession,
    pub theme: &'a Theme,
}

impl<'a> QuestionView<'a> {
    pub fn new(session: &'a QuizSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

impl Widget for QuestionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(question) = self.session.current() else {
            return;
        };

        let mut title = format!(
            " Question {}/{} · {} ",
            self.session.position(),
            self.session.total(),
            question.chapter
        );
        if let Some(difficulty) = question.difficulty {
            title.push_str(&"★".repeat(difficulty as usize));
            title.push(' ');
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

        let option_rows = question.options.len().max(1) as u16;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(option_rows + 1),
                Constraint::Min(0),
            ])
            .split(inner);

        let mut prompt_lines = vec![Line::from(Span::styled(
            question.title.clone(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        ))];
        let mut meta: Vec<String> = Vec::new();
        if question.is_wrong {
            meta.push("missed before".to_string());
        }
        if let Some(source) = &question.source {
            meta.push(source.clone());
        }
        if let Some(tags) = &question.tags {
            if !tags.is_empty() {
                meta.push(tags.join(", "));
            }
        }
        if !meta.is_empty() {
            prompt_lines.push(Line::from(Span::styled(
                meta.join(" · "),
                Style::default().fg(colors.muted()),
            )));
        }
        Paragraph::new(prompt_lines)
            .wrap(Wrap { trim: false })
            .render(layout[0], buf);

        let revealed = self.session.revealed();
        let correct_idx = question.correct_option_index();
        let option_lines: Vec<Line> = question
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let is_cursor = i == self.session.selected();
                let indicator = if is_cursor { ">" } else { " " };
                let style = if revealed && Some(i) == correct_idx {
                    Style::default().fg(colors.correct()).add_modifier(Modifier::BOLD)
                } else if revealed && is_cursor {
                    Style::default().fg(colors.incorrect()).add_modifier(Modifier::BOLD)
                } else if is_cursor {
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(
                    format!(" {indicator} {}. {}", option.label, option.value),
                    style,
                ))
            })
            .collect();
        Paragraph::new(option_lines).render(layout[1], buf);

        if revealed {
            let verdict_correct = question
                .options
                .get(self.session.selected())
                .map(|o| o.label == question.answer)
                .unwrap_or(false);
            let mut lines = vec![Line::from(Span::styled(
                if verdict_correct {
                    format!("Correct. The answer is {}.", question.answer)
                } else {
                    format!("Not quite. The answer is {}.", question.answer)
                },
                Style::default()
                    .fg(if verdict_correct {
                        colors.correct()
                    } else {
                        colors.incorrect()
                    })
                    .add_modifier(Modifier::BOLD),
            ))];
            if !question.analysis.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    question.analysis.clone(),
                    Style::default().fg(colors.fg()),
                )));
            }
            if let Some(attachments) = &question.attachments {
                lines.push(Line::from(""));
                for attachment in attachments {
                    lines.push(Line::from(Span::styled(
                        format!("[image] {}", attachment.url),
                        Style::default().fg(colors.muted()),
                    )));
                }
            }
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .render(layout[2], buf);
        }
    }
}

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::detail::DetailSelection;
use crate::render::RenderContext;

/// What the detail panel has to show.
pub enum DetailContent<'a> {
    Selection(&'a DetailSelection),
    /// Empty-state or not-found text.
    Message(String),
}

/// "Insecticide Information" panel: name, formulation and the pests it is used against.
pub struct DetailPanel<'a> {
    ctx: &'a RenderContext,
    content: DetailContent<'a>,
    focused: bool,
    /// Position among the selectable insecticides, e.g. (2, 5).
    position: Option<(usize, usize)>,
}

impl<'a> DetailPanel<'a> {
    pub fn new(ctx: &'a RenderContext, content: DetailContent<'a>) -> Self {
        Self {
            ctx,
            content,
            focused: false,
            position: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn position(mut self, position: Option<(usize, usize)>) -> Self {
        self.position = position;
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let label = Style::default()
            .fg(self.ctx.text_secondary)
            .add_modifier(Modifier::BOLD);
        match &self.content {
            DetailContent::Selection(detail) => vec![
                Line::from(vec![
                    Span::styled("Insecticide: ", label),
                    Span::raw(detail.insecticide.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Formulation: ", label),
                    Span::raw(detail.formulation.clone().unwrap_or_else(|| "-".to_string())),
                ]),
                Line::from(vec![
                    Span::styled("Used against: ", label),
                    Span::raw(detail.pests_joined()),
                ]),
            ],
            DetailContent::Message(message) => vec![Line::styled(
                message.clone(),
                Style::default().fg(self.ctx.warning),
            )],
        }
    }
}

impl Widget for DetailPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            self.ctx.focus_border
        } else {
            self.ctx.border
        };
        let title = match self.position {
            Some((i, n)) => format!(" Insecticide Information ({}/{}) ", i, n),
            None => " Insecticide Information ".to_string(),
        };
        let lines = self.lines();
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(border))
                    .title(title),
            )
            .render(area, buf);
    }
}

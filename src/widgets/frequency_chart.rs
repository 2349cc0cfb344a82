use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::frequency::FrequencyRow;
use crate::render::RenderContext;

/// Horizontal usage chart, most used insecticide on top.
pub struct FrequencyChart<'a> {
    ctx: &'a RenderContext,
    rows: &'a [FrequencyRow],
    title: String,
    message: Option<&'a str>,
}

impl<'a> FrequencyChart<'a> {
    pub fn new(ctx: &'a RenderContext, rows: &'a [FrequencyRow]) -> Self {
        Self {
            ctx,
            rows,
            title: " Insecticide Usage ".to_string(),
            message: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = format!(" {} ", title.into());
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

/// Rows to draw, top to bottom. Rows arrive ascending by count, so the tail holds
/// the most used; at most `limit` bars are kept.
pub fn visible_bars(rows: &[FrequencyRow], limit: usize) -> Vec<&FrequencyRow> {
    rows.iter().rev().take(limit.max(1)).collect()
}

impl Widget for FrequencyChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.ctx.border))
            .title(self.title);
        let inner = block.inner(area);
        block.render(area, buf);

        if let Some(message) = self.message {
            Paragraph::new(Line::from(message))
                .style(Style::default().fg(self.ctx.warning))
                .wrap(Wrap { trim: true })
                .render(inner, buf);
            return;
        }

        let rows = visible_bars(self.rows, self.ctx.max_chart_bars);
        let label_width = rows
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0)
            .min(inner.width as usize / 2);
        let bars: Vec<Bar> = rows
            .iter()
            .map(|r| {
                let label: String = r.label.chars().take(label_width).collect();
                Bar::default()
                    .value(r.count)
                    .label(Line::from(label))
                    .text_value(r.count.to_string())
                    .style(Style::default().fg(self.ctx.chart_bar))
                    .value_style(Style::default().fg(self.ctx.chart_value).bg(self.ctx.chart_bar))
            })
            .collect();

        BarChart::default()
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars))
            .render(inner, buf);
    }
}

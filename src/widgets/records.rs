//! Results table for the filtered view.
//!
//! Only the visible page is pulled out of the frame; scrolling moves a window
//! of `visible_rows` over the view and re-reads it.

use polars::prelude::PolarsResult;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Row, StatefulWidget, Table, Widget, Wrap},
};

use crate::dataset::{FilteredView, Record, DISPLAY_COLUMNS};
use crate::render::RenderContext;

#[derive(Debug, Default, Clone)]
pub struct RecordsState {
    pub offset: usize,
    pub selected: usize,
    pub total: usize,
    pub visible_rows: usize,
    page: Vec<Record>,
}

impl RecordsState {
    pub fn new() -> Self {
        Self {
            visible_rows: 20,
            ..Self::default()
        }
    }

    pub fn page(&self) -> &[Record] {
        &self.page
    }

    /// Start over on a new view.
    pub fn reset(&mut self, view: &FilteredView) -> PolarsResult<()> {
        self.offset = 0;
        self.selected = 0;
        self.reload(view)
    }

    /// Re-read the visible window, clamping the selection to the view.
    pub fn reload(&mut self, view: &FilteredView) -> PolarsResult<()> {
        self.total = view.height();
        if self.total == 0 {
            self.offset = 0;
            self.selected = 0;
            self.page.clear();
            return Ok(());
        }
        self.selected = self.selected.min(self.total - 1);
        let rows = self.visible_rows.max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + rows {
            self.offset = self.selected + 1 - rows;
        }
        self.page = view.records_range(self.offset, rows)?;
        Ok(())
    }

    pub fn select_next(&mut self, step: usize) {
        if self.total > 0 {
            self.selected = (self.selected + step).min(self.total - 1);
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.total.saturating_sub(1);
    }

    /// Resize the window to the table body height.
    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows.max(1);
    }
}

pub struct RecordsTable<'a> {
    ctx: &'a RenderContext,
    title: String,
    focused: bool,
    /// Shown instead of the table when the view is empty.
    message: Option<&'a str>,
}

impl<'a> RecordsTable<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self {
            ctx,
            title: " Filtered Results ".to_string(),
            focused: false,
            message: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl StatefulWidget for RecordsTable<'_> {
    type State = RecordsState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let border = if self.focused {
            self.ctx.focus_border
        } else {
            self.ctx.border
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
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

        let header = Row::new(DISPLAY_COLUMNS.iter().copied()).style(
            Style::default()
                .fg(self.ctx.table_header)
                .bg(self.ctx.table_header_bg)
                .add_modifier(Modifier::BOLD),
        );

        let selected_style = match self.ctx.table_selected {
            Some(color) => Style::default().bg(color),
            None => Style::default().add_modifier(Modifier::REVERSED),
        };
        let rows = state.page.iter().enumerate().map(|(i, record)| {
            let index = state.offset + i;
            let cells = DISPLAY_COLUMNS
                .iter()
                .map(|c| record.field(c).unwrap_or("").to_string());
            let style = if index == state.selected && self.focused {
                selected_style
            } else {
                match self.ctx.alternate_row_color {
                    Some(color) if index % 2 == 1 => Style::default().bg(color),
                    _ => Style::default().fg(self.ctx.text_primary),
                }
            };
            Row::new(cells).style(style)
        });

        let widths = [
            Constraint::Percentage(22),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(18),
        ];
        Widget::render(
            Table::new(rows, widths)
                .header(header)
                .column_spacing(self.ctx.table_cell_padding),
            inner,
            buf,
        );
    }
}

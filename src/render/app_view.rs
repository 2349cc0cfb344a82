//! Draws the whole application screen.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget};

use super::{app_layout, layout::columns};
use crate::chart_export::chart_title;
use crate::error_display::{empty_state_message, user_message_from_not_found};
use crate::pipeline::EmptyState;
use crate::widgets::controls::Controls;
use crate::widgets::detail::{DetailContent, DetailPanel};
use crate::widgets::dropdown::Dropdown;
use crate::widgets::frequency_chart::FrequencyChart;
use crate::widgets::records::RecordsTable;
use crate::widgets::text_input::TextInput;
use crate::{App, Focus, StatusKind};

impl App {
    fn text_box(&self, title: &str, input: &TextInput, focused: bool, area: Rect, buf: &mut Buffer) {
        let block = self.field_block(title, focused);
        let inner = block.inner(area);
        block.render(area, buf);
        input.render(inner, buf);
    }

    fn field_block(&self, title: &str, focused: bool) -> Block<'static> {
        let color = if focused {
            self.ctx.focus_border
        } else {
            self.ctx.border
        };
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .title(format!(" {} ", title))
    }

    fn status_line(&self) -> Line<'static> {
        match &self.status {
            Some(status) => {
                let color = match status.kind {
                    StatusKind::Info => self.ctx.text_secondary,
                    StatusKind::Success => self.ctx.success,
                    StatusKind::Warning => self.ctx.warning,
                    StatusKind::Error => self.ctx.error,
                };
                Line::styled(status.message.clone(), Style::default().fg(color))
            }
            None => Line::styled(
                empty_state_message(EmptyState::NoFile),
                Style::default().fg(self.ctx.dimmed),
            ),
        }
    }

    fn detail_content(&self) -> DetailContent<'_> {
        let Some(snapshot) = &self.snapshot else {
            return DetailContent::Message(empty_state_message(EmptyState::NoFile).to_string());
        };
        if let Some(state) = snapshot.detail_state() {
            return DetailContent::Message(empty_state_message(state).to_string());
        }
        match &snapshot.detail {
            Some(Ok(detail)) => DetailContent::Selection(detail),
            Some(Err(e)) => DetailContent::Message(user_message_from_not_found(e)),
            None => DetailContent::Message(
                empty_state_message(EmptyState::NoDetailSelected).to_string(),
            ),
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;
        let layout = app_layout(area, self.debug.enabled);

        // Title
        let mut title = vec![Span::styled(
            "Insecticide Usage Explorer",
            Style::default()
                .fg(self.ctx.title)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(session) = &self.session {
            title.push(Span::styled(
                format!("  {}", session.display_name()),
                Style::default().fg(self.ctx.text_secondary),
            ));
        }
        Paragraph::new(Line::from(title)).render(layout.title, buf);

        // File row: path input and load status
        let file_row = columns(layout.file, 2);
        self.text_box(
            "File",
            &self.file_input,
            self.focus == Focus::File,
            file_row[0],
            buf,
        );
        let status_block = self.field_block("Status", false);
        Paragraph::new(self.status_line())
            .block(status_block)
            .render(file_row[1], buf);

        // Text filters and the show-all checkbox
        let filters = columns(layout.filters, 4);
        self.text_box(
            "Pest",
            &self.pest_input,
            self.focus == Focus::Pest,
            filters[0],
            buf,
        );
        self.text_box(
            "Crop contains",
            &self.crop_input,
            self.focus == Focus::CropContains,
            filters[1],
            buf,
        );
        self.text_box(
            "Insecticide contains",
            &self.insecticide_input,
            self.focus == Focus::InsecticideContains,
            filters[2],
            buf,
        );
        let checkbox = if self.show_all { "[x]" } else { "[ ]" };
        Paragraph::new(format!("{} Show All Data", checkbox))
            .block(self.field_block("Show all", self.focus == Focus::ShowAll))
            .render(filters[3], buf);

        // Dropdowns are overridden while showing all data
        let dropdowns = columns(layout.dropdowns, 2);
        Dropdown::new("Crop")
            .focused(self.focus == Focus::Crop)
            .disabled(self.show_all)
            .with_colors(self.ctx.border, self.ctx.focus_border, self.ctx.dimmed)
            .render(dropdowns[0], buf, &mut self.crop);
        Dropdown::new("Insecticide")
            .focused(self.focus == Focus::Insecticide)
            .disabled(self.show_all)
            .with_colors(self.ctx.border, self.ctx.focus_border, self.ctx.dimmed)
            .render(dropdowns[1], buf, &mut self.insecticide);

        // Results, detail and chart
        let total = self.session.as_ref().map(|s| s.dataset.height()).unwrap_or(0);
        let (message, shown) = match &self.snapshot {
            None => (Some(empty_state_message(EmptyState::NoFile)), 0),
            Some(s) => (s.table_state().map(empty_state_message), s.staged.view.height()),
        };
        RecordsTable::new(&self.ctx)
            .title(format!(" Filtered Results ({} of {}) ", shown, total))
            .focused(self.focus == Focus::Results)
            .message(message)
            .render(layout.results, buf, &mut self.records);

        let position = self.snapshot.as_ref().and_then(|s| {
            let d = s.resolved_detail()?;
            let i = s.detail_options.iter().position(|o| *o == d.insecticide)?;
            Some((i + 1, s.detail_options.len()))
        });
        DetailPanel::new(&self.ctx, self.detail_content())
            .focused(self.focus == Focus::Detail)
            .position(position)
            .render(layout.detail, buf);

        let spec = self.filter_spec();
        let chart_message = match &self.snapshot {
            None => Some(empty_state_message(EmptyState::NoFile)),
            Some(s) => s.chart_state().map(empty_state_message),
        };
        let rows = self
            .snapshot
            .as_ref()
            .map(|s| s.frequencies.as_slice())
            .unwrap_or(&[]);
        FrequencyChart::new(&self.ctx, rows)
            .title(chart_title(&spec))
            .message(chart_message)
            .render(layout.chart, buf);

        let mut controls = Controls::from_context(&self.ctx);
        if self.session.is_some() {
            controls = controls.with_record_count(shown, total);
        }
        controls.render(layout.control_bar, buf);

        if let Some(debug_area) = layout.debug {
            self.debug.render(debug_area, buf);
        }
    }
}

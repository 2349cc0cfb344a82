//! Cycling selector for the crop and insecticide choices.
//!
//! The option list always starts with "All". Options are replaced every time
//! the filters above change; a selection that is no longer offered falls back
//! to "All".

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget},
};

use crate::filter::Selection;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownState {
    options: Vec<String>,
    selection: Selection,
}

impl DropdownState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the options. Returns true when the current selection was dropped.
    pub fn set_options(&mut self, options: Vec<String>) -> bool {
        let retained = self.selection.retain_in(&options);
        let dropped = retained != self.selection;
        self.options = options;
        self.selection = retained;
        dropped
    }

    /// Set the selection before options are known; the next `set_options`
    /// keeps it only if offered.
    pub fn preset(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Select by name; unknown names select "All".
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection.retain_in(&self.options);
    }

    fn position(&self) -> usize {
        match &self.selection {
            Selection::All => 0,
            Selection::Only(v) => self
                .options
                .iter()
                .position(|o| o == v)
                .map(|i| i + 1)
                .unwrap_or(0),
        }
    }

    fn select_position(&mut self, pos: usize) {
        self.selection = match pos {
            0 => Selection::All,
            n => self
                .options
                .get(n - 1)
                .cloned()
                .map(Selection::Only)
                .unwrap_or_default(),
        };
    }

    pub fn next(&mut self) {
        let len = self.options.len() + 1;
        self.select_position((self.position() + 1) % len);
    }

    pub fn prev(&mut self) {
        let len = self.options.len() + 1;
        self.select_position((self.position() + len - 1) % len);
    }
}

pub struct Dropdown<'a> {
    title: &'a str,
    focused: bool,
    disabled: bool,
    border_color: Color,
    focus_color: Color,
    dimmed_color: Color,
}

impl<'a> Dropdown<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            focused: false,
            disabled: false,
            border_color: Color::Reset,
            focus_color: Color::Yellow,
            dimmed_color: Color::DarkGray,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Drawn dimmed when "Show All Data" overrides the selection.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_colors(mut self, border: Color, focus: Color, dimmed: Color) -> Self {
        self.border_color = border;
        self.focus_color = focus;
        self.dimmed_color = dimmed;
        self
    }
}

impl StatefulWidget for Dropdown<'_> {
    type State = DropdownState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let border_style = if self.focused {
            Style::default().fg(self.focus_color)
        } else {
            Style::default().fg(self.border_color)
        };
        let title = format!(" {} ({}) ", self.title, state.options.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        let text_style = if self.disabled {
            Style::default().fg(self.dimmed_color)
        } else if self.focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let line = Line::from(vec![
            Span::styled("◀ ", Style::default().fg(self.dimmed_color)),
            Span::styled(state.selection.to_string(), text_style),
            Span::styled(" ▶", Style::default().fg(self.dimmed_color)),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

use crate::render::RenderContext;

const CONTROLS: [(&str, &str); 7] = [
    ("Tab", "Focus"),
    ("Enter", "Load"),
    ("Space", "Show all"),
    ("←/→", "Select"),
    ("^E", "Export"),
    ("^D", "Debug"),
    ("Esc", "Quit"),
];

pub struct Controls {
    pub record_count: Option<(usize, usize)>,
    pub dimmed: bool,
    bg: Color,
    key_color: Color,
    label_color: Color,
    dimmed_color: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            record_count: None,
            dimmed: false,
            bg: Color::Indexed(235),
            key_color: Color::Cyan,
            label_color: Color::Indexed(252),
            dimmed_color: Color::DarkGray,
        }
    }
}

impl Controls {
    pub fn from_context(ctx: &RenderContext) -> Self {
        Self {
            record_count: None,
            dimmed: false,
            bg: ctx.controls_bg,
            key_color: ctx.keybind_hints,
            label_color: ctx.keybind_labels,
            dimmed_color: ctx.dimmed,
        }
    }

    /// Show "Records: shown/total" on the right.
    pub fn with_record_count(mut self, shown: usize, total: usize) -> Self {
        self.record_count = Some((shown, total));
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = CONTROLS.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        if self.record_count.is_some() {
            constraints.push(Constraint::Fill(1));
            constraints.push(Constraint::Length(24));
        } else {
            constraints.push(Constraint::Fill(1));
        }

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let (key_color, label_color) = if self.dimmed {
            (self.dimmed_color, self.dimmed_color)
        } else {
            (self.key_color, self.label_color)
        };
        let base_style = Style::default().bg(self.bg);

        for (i, (key, action)) in CONTROLS.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.fg(key_color).bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.fg(label_color))
                .render(layout[j + 1], buf);
        }

        let fill_idx = CONTROLS.len() * 2;
        Paragraph::new("").style(base_style).render(layout[fill_idx], buf);
        if let Some((shown, total)) = self.record_count {
            Paragraph::new(format!("Records: {}/{} ", shown, total))
                .style(base_style.fg(label_color))
                .right_aligned()
                .render(layout[fill_idx + 1], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(controls: &Controls) -> String {
        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        controls.render(area, &mut buf);
        (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn test_controls_show_hints_and_count() {
        let text = rendered(&Controls::default().with_record_count(3, 10));
        assert!(text.contains("Focus"));
        assert!(text.contains("Export"));
        assert!(text.contains("Records: 3/10"));
    }

    #[test]
    fn test_controls_without_count() {
        let text = rendered(&Controls::default());
        assert!(!text.contains("Records"));
    }
}

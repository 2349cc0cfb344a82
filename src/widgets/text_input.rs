//! One-line text box used for the file path and the three search fields.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::config::Theme;

/// What a key press did to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    /// Text changed; filters should re-run.
    Changed,
    Submit,
    Cancel,
}

pub struct TextInput {
    textarea: TextArea<'static>,
    style: Style,
    cursor_color: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut input = Self {
            textarea: TextArea::default(),
            style: Style::default(),
            cursor_color: None,
            focused: false,
        };
        input.restyle();
        input
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        if let Some(fg) = theme.get_optional("text_primary") {
            self.style = self.style.fg(fg);
        }
        self.cursor_color = theme
            .get_optional("cursor_focused")
            .filter(|c| *c != Color::Reset);
        self.restyle();
        self
    }

    /// Reapply styles; a fresh `TextArea` starts unstyled.
    fn restyle(&mut self) {
        self.textarea.set_style(self.style);
        self.textarea.set_cursor_line_style(Style::default());
        let cursor = match (self.focused, self.cursor_color) {
            (false, _) => self.style,
            (true, Some(color)) => Style::default().bg(color),
            (true, None) => Style::default().add_modifier(Modifier::REVERSED),
        };
        self.textarea.set_cursor_style(cursor);
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The cursor is only drawn while focused.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.restyle();
    }

    pub fn value(&self) -> &str {
        self.textarea.lines().first().map(String::as_str).unwrap_or("")
    }

    /// Replace the text and put the cursor at its end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let line = value.into().replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![line]);
        self.textarea.move_cursor(CursorMove::End);
        self.restyle();
    }

    /// Cursor column, in characters.
    pub fn cursor(&self) -> usize {
        self.textarea.cursor().1
    }

    pub fn clear(&mut self) {
        self.set_value(String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextInputEvent {
        let key = match event.code {
            KeyCode::Enter => return TextInputEvent::Submit,
            KeyCode::Esc => return TextInputEvent::Cancel,
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            // multi-line movement and tabs don't apply to a one-line box
            _ => return TextInputEvent::None,
        };
        let input = Input {
            key,
            ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
            alt: event.modifiers.contains(KeyModifiers::ALT),
            shift: event.modifiers.contains(KeyModifiers::SHIFT),
        };
        if self.textarea.input(input) {
            TextInputEvent::Changed
        } else {
            TextInputEvent::None
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.textarea.render(area, buf);
        // the cursor line comes back underlined; the cursor cell is enough
        buf.set_style(area, Style::default().remove_modifier(Modifier::UNDERLINED));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_input_new() {
        let input = TextInput::new();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
        assert!(!input.is_focused());
    }

    #[test]
    fn test_typing_reports_changes() {
        let mut input = TextInput::new();
        assert_eq!(input.handle_key(&key(KeyCode::Char('a'))), TextInputEvent::Changed);
        assert_eq!(input.handle_key(&key(KeyCode::Char('p'))), TextInputEvent::Changed);
        assert_eq!(input.value(), "ap");
        assert_eq!(input.handle_key(&key(KeyCode::Left)), TextInputEvent::None);
        assert_eq!(input.handle_key(&key(KeyCode::Backspace)), TextInputEvent::Changed);
        assert_eq!(input.value(), "p");
    }

    #[test]
    fn test_enter_and_esc() {
        let mut input = TextInput::new();
        input.set_value("aphid");
        assert_eq!(input.handle_key(&key(KeyCode::Enter)), TextInputEvent::Submit);
        assert_eq!(input.handle_key(&key(KeyCode::Esc)), TextInputEvent::Cancel);
        assert_eq!(input.value(), "aphid");
    }

    #[test]
    fn test_set_value_moves_cursor_to_end() {
        let mut input = TextInput::new();
        input.set_value("mite");
        assert_eq!(input.cursor(), 4);
        assert_eq!(input.handle_key(&key(KeyCode::Tab)), TextInputEvent::None);
        assert_eq!(input.handle_key(&key(KeyCode::Char('s'))), TextInputEvent::Changed);
        assert_eq!(input.value(), "mites");
    }

    #[test]
    fn test_clear() {
        let mut input = TextInput::new();
        input.set_value("hello");
        assert!(!input.is_empty());
        input.clear();
        assert!(input.is_empty());
    }
}

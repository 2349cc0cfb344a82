use crate::config::{AppConfig, Theme};
use ratatui::style::Color;

/// Snapshot of theme colors and display configuration for rendering.
/// Passed to widgets to avoid threading many individual parameters.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub keybind_hints: Color,
    pub keybind_labels: Color,
    pub controls_bg: Color,
    pub title: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub dimmed: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub border: Color,
    pub focus_border: Color,
    pub cursor_focused: Color,

    pub table_header: Color,
    pub table_header_bg: Color,
    /// `None` means the selected row is drawn reversed.
    pub table_selected: Option<Color>,
    pub alternate_row_color: Option<Color>,

    pub chart_bar: Color,
    pub chart_value: Color,

    pub table_cell_padding: u16,
    pub max_chart_bars: usize,
}

impl RenderContext {
    /// Build render context from app theme and config.
    /// This is a snapshot; changes to theme won't affect this instance.
    pub fn from_theme_and_config(theme: &Theme, config: &AppConfig) -> Self {
        Self {
            keybind_hints: theme.get("keybind_hints"),
            keybind_labels: theme.get("keybind_labels"),
            controls_bg: theme.get("controls_bg"),
            title: theme.get("title"),
            text_primary: theme.get("text_primary"),
            text_secondary: theme.get("text_secondary"),
            dimmed: theme.get("dimmed"),
            success: theme.get("success"),
            warning: theme.get("warning"),
            error: theme.get("error"),
            border: theme.get("border"),
            focus_border: theme.get("focus_border"),
            cursor_focused: theme.get("cursor_focused"),

            table_header: theme.get("table_header"),
            table_header_bg: theme.get("table_header_bg"),
            table_selected: if theme.is_reversed("table_selected") {
                None
            } else {
                theme.get_optional("table_selected")
            },
            alternate_row_color: theme.get_optional("alternate_row_color"),

            chart_bar: theme.get("chart_bar"),
            chart_value: theme.get("chart_value"),

            table_cell_padding: config.display.table_cell_padding,
            max_chart_bars: config.display.max_chart_bars,
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::from_theme_and_config(&Theme::default(), &AppConfig::default())
    }
}

use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::chart_export::ChartExportFormat;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Render the default configuration as a TOML template.
    ///
    /// Every setting is commented out, so the file changes nothing until a
    /// line is uncommented. Unset optional settings are shown with an example.
    pub fn generate_default_config(&self) -> String {
        let defaults = match toml::Value::try_from(AppConfig::default()) {
            Ok(value) => value,
            Err(e) => return format!("# failed to serialize default config: {}\n", e),
        };

        let mut out = String::from(
            "# insectui configuration file\n\
             # This file uses TOML format. See https://toml.io/ for syntax reference.\n\n",
        );
        if let Some(version) = defaults.get("version") {
            out.push_str("# Configuration format version\n");
            out.push_str(&format!("# version = {}\n\n", version));
        }

        for section in TEMPLATE_SECTIONS {
            out.push_str(&format!("# {}\n", RULE));
            push_commented(&mut out, section.banner);
            out.push_str(&format!("# {}\n", RULE));
            out.push_str(&format!("# [{}]\n", section.name));
            let table = section
                .name
                .split('.')
                .try_fold(&defaults, |value, key| value.get(key));
            for (field, help, example) in section.fields {
                push_commented(&mut out, help);
                match table.and_then(|t| t.get(*field)) {
                    Some(value) => out.push_str(&format!("# {} = {}\n", field, value)),
                    None => out.push_str(&format!("# {} = {}\n", field, example)),
                }
            }
            out.push('\n');
        }
        out
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, self.generate_default_config())?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub display: DisplayConfig,
    pub chart: ChartConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

/// One `[section]` of the generated template.
struct TemplateSection {
    name: &'static str,
    banner: &'static str,
    /// (field, help text, example shown when the default is unset)
    fields: &'static [(&'static str, &'static str, &'static str)],
}

const RULE: &str = "============================================================================";

const TEMPLATE_SECTIONS: &[TemplateSection] = &[
    TemplateSection {
        name: "file_loading",
        banner: "File Loading Defaults",
        fields: FILE_LOADING_FIELDS,
    },
    TemplateSection {
        name: "display",
        banner: "Display Settings",
        fields: DISPLAY_FIELDS,
    },
    TemplateSection {
        name: "chart",
        banner: "Usage Chart",
        fields: CHART_FIELDS,
    },
    TemplateSection {
        name: "theme.colors",
        banner: "Color Theme\n\nSupported formats:\n  - Named colors: \"red\", \"bright_red\", \"dark_gray\", etc. (case-insensitive)\n  - Hex colors: \"#ff0000\"\n  - Indexed colors: \"indexed(0-255)\" for xterm 256-color palette entries\nColors adapt to the terminal's capabilities",
        fields: COLOR_FIELDS,
    },
    TemplateSection {
        name: "debug",
        banner: "Debug Settings",
        fields: DEBUG_FIELDS,
    },
];

fn push_commented(out: &mut String, text: &str) {
    for line in text.lines() {
        if line.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    /// Excel sheet to open: 0-based index or sheet name
    pub excel_sheet: Option<String>,
}

const FILE_LOADING_FIELDS: &[(&str, &str, &str)] = &[
    (
        "delimiter",
        "Default delimiter for CSV files (as ASCII value, e.g., 44 for comma)\nIf not specified, the delimiter implied by the file extension is used",
        "44",
    ),
    (
        "has_header",
        "Whether delimited files have a header row\nIf not specified, a header row is assumed",
        "true",
    ),
    (
        "excel_sheet",
        "Excel sheet to load: 0-based index (e.g. \"0\") or sheet name (e.g. \"Sheet1\")\nIf not specified, the first sheet is used",
        "\"Sheet1\"",
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub table_cell_padding: u16,
    /// Largest number of bars drawn in the terminal chart (the most used products are kept)
    pub max_chart_bars: usize,
    pub event_poll_interval_ms: u64,
}

const DISPLAY_FIELDS: &[(&str, &str, &str)] = &[
    ("table_cell_padding", "Number of spaces between columns in the results table", ""),
    ("max_chart_bars", "Largest number of bars drawn in the terminal chart\nWhen there are more products, the most used ones are shown", ""),
    ("event_poll_interval_ms", "How often the terminal is polled for input, in milliseconds", ""),
];

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            table_cell_padding: 2,
            max_chart_bars: 25,
            event_poll_interval_ms: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub export_width: u32,
    pub export_height: u32,
    /// "png" or "eps"
    pub default_format: String,
    /// Bar color for exported images, as #rrggbb
    pub bar_color: String,
}

const CHART_FIELDS: &[(&str, &str, &str)] = &[
    ("export_width", "Width of exported PNG charts in pixels", ""),
    ("export_height", "Height of exported PNG charts in pixels", ""),
    ("default_format", "Format used when the export file name has no known extension: \"png\" or \"eps\"", ""),
    ("bar_color", "Bar color for exported charts (#rrggbb)", ""),
];

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            export_width: 1024,
            export_height: 768,
            default_format: "png".to_string(),
            bar_color: "#1f77b4".to_string(),
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.export_width != default.export_width {
            self.export_width = other.export_width;
        }
        if other.export_height != default.export_height {
            self.export_height = other.export_height;
        }
        if other.default_format != default.default_format {
            self.default_format = other.default_format;
        }
        if other.bar_color != default.bar_color {
            self.bar_color = other.bar_color;
        }
    }

    pub fn export_format(&self) -> ChartExportFormat {
        ChartExportFormat::parse(&self.default_format).unwrap_or(ChartExportFormat::Png)
    }

    /// Bar color as RGB, falling back to the default blue if unparsable.
    pub fn bar_rgb(&self) -> (u8, u8, u8) {
        parse_hex(&self.bar_color).unwrap_or((31, 119, 180))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

/// Color configuration for the application theme.
///
/// Colors can be specified as named colors ("cyan"), hex ("#ff0000") or
/// indexed ("indexed(236)"). `table_selected = "reversed"` selects by
/// reversing the row instead of coloring it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub keybind_hints: String,
    pub keybind_labels: String,
    pub title: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub table_header_bg: String,
    pub table_selected: String,
    /// "default" = no alternate row color
    pub alternate_row_color: String,
    pub border: String,
    pub focus_border: String,
    pub chart_bar: String,
    pub chart_value: String,
    pub cursor_focused: String,
}

const COLOR_FIELDS: &[(&str, &str, &str)] = &[
    ("keybind_hints", "Keys shown in the controls bar", ""),
    ("keybind_labels", "Action labels in the controls bar", ""),
    ("title", "Application title", ""),
    ("success", "Success messages (e.g. chart exported)", ""),
    ("error", "Error messages", ""),
    ("warning", "Empty-result messages", ""),
    ("dimmed", "Disabled inputs and placeholders", ""),
    ("controls_bg", "Controls bar background", ""),
    ("text_primary", "Primary text", ""),
    ("text_secondary", "Secondary text", ""),
    ("table_header", "Results table header text", ""),
    ("table_header_bg", "Results table header background", ""),
    ("table_selected", "Selected row style (\"reversed\" or a color)", ""),
    ("alternate_row_color", "Background for every other row (\"default\" to disable)", ""),
    ("border", "Borders of unfocused panels", ""),
    ("focus_border", "Border of the focused input or panel", ""),
    ("chart_bar", "Bars in the usage chart", ""),
    ("chart_value", "Counts drawn on the bars", ""),
    ("cursor_focused", "Text cursor in the focused input", ""),
];

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            keybind_hints: "cyan".to_string(),
            keybind_labels: "indexed(252)".to_string(),
            title: "green".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(235)".to_string(),
            text_primary: "default".to_string(),
            text_secondary: "indexed(240)".to_string(),
            table_header: "white".to_string(),
            table_header_bg: "indexed(235)".to_string(),
            table_selected: "reversed".to_string(),
            alternate_row_color: "indexed(235)".to_string(),
            border: "indexed(240)".to_string(),
            focus_border: "yellow".to_string(),
            chart_bar: "cyan".to_string(),
            chart_value: "black".to_string(),
            cursor_focused: "default".to_string(),
        }
    }
}

impl ColorConfig {
    /// Every color field with its config name.
    fn named(&self) -> [(&'static str, &String); 19] {
        [
            ("keybind_hints", &self.keybind_hints),
            ("keybind_labels", &self.keybind_labels),
            ("title", &self.title),
            ("success", &self.success),
            ("error", &self.error),
            ("warning", &self.warning),
            ("dimmed", &self.dimmed),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("table_header", &self.table_header),
            ("table_header_bg", &self.table_header_bg),
            ("table_selected", &self.table_selected),
            ("alternate_row_color", &self.alternate_row_color),
            ("border", &self.border),
            ("focus_border", &self.focus_border),
            ("chart_bar", &self.chart_bar),
            ("chart_value", &self.chart_value),
            ("cursor_focused", &self.cursor_focused),
        ]
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.named() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for theme.colors.{}: {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        macro_rules! take_if_changed {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        take_if_changed!(
            keybind_hints,
            keybind_labels,
            title,
            success,
            error,
            warning,
            dimmed,
            controls_bg,
            text_primary,
            text_secondary,
            table_header,
            table_header_bg,
            table_selected,
            alternate_row_color,
            border,
            focus_border,
            chart_bar,
            chart_value,
            cursor_focused,
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Show how long the last filter/aggregate pass took
    pub show_performance: bool,
}

const DEBUG_FIELDS: &[(&str, &str, &str)] = &[
    ("enabled", "Enable debug line by default", ""),
    ("show_performance", "Show how long the last filter and aggregation took", ""),
];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            file_loading: FileLoadingConfig::default(),
            display: DisplayConfig::default(),
            chart: ChartConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let manager = ConfigManager::new(app_name)?;
        Self::load_from(&manager)
    }

    /// Load configuration using the config file managed by `manager`
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        let config_path = manager.config_path("config.toml");
        config.merge(Self::load_user_config(&config_path)?);

        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_path.display(), e))?;

        Ok(config)
    }

    fn load_user_config(config_path: &Path) -> Result<AppConfig> {
        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.file_loading.merge(other.file_loading);
        self.display.merge(other.display);
        self.chart.merge(other.chart);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.display.max_chart_bars == 0 {
            return Err(eyre!("display.max_chart_bars must be greater than 0"));
        }
        if self.display.event_poll_interval_ms == 0 {
            return Err(eyre!("display.event_poll_interval_ms must be greater than 0"));
        }

        if self.chart.export_width < 100 || self.chart.export_height < 100 {
            return Err(eyre!(
                "chart.export_width and chart.export_height must be at least 100, got {}x{}",
                self.chart.export_width,
                self.chart.export_height
            ));
        }
        if ChartExportFormat::parse(&self.chart.default_format).is_none() {
            return Err(eyre!(
                "chart.default_format must be \"png\" or \"eps\", got \"{}\"",
                self.chart.default_format
            ));
        }
        parse_hex(&self.chart.bar_color).map_err(|e| eyre!("chart.bar_color: {}", e))?;

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }
}

impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.has_header.is_some() {
            self.has_header = other.has_header;
        }
        if other.excel_sheet.is_some() {
            self.excel_sheet = other.excel_sheet;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.table_cell_padding != default.table_cell_padding {
            self.table_cell_padding = other.table_cell_padding;
        }
        if other.max_chart_bars != default.max_chart_bars {
            self.max_chart_bars = other.max_chart_bars;
        }
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.show_performance != default.show_performance {
            self.show_performance = other.show_performance;
        }
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("bright_black", Color::Indexed(8)),
    ("bright_red", Color::Indexed(9)),
    ("bright_green", Color::Indexed(10)),
    ("bright_yellow", Color::Indexed(11)),
    ("bright_blue", Color::Indexed(12)),
    ("bright_magenta", Color::Indexed(13)),
    ("bright_cyan", Color::Indexed(14)),
    ("bright_white", Color::Indexed(15)),
    ("gray", Color::Indexed(8)),
    ("dark_gray", Color::Indexed(8)),
    ("light_gray", Color::Indexed(7)),
];

/// Turns theme strings into terminal colors, downgrading hex colors to what
/// the terminal can show.
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Detect the capabilities of stdout; `NO_COLOR` turns every color into `Reset`.
    pub fn new() -> Self {
        let support = supports_color::on(Stream::Stdout);
        Self {
            supports_true_color: support.as_ref().is_some_and(|s| s.has_16m),
            supports_256: support.as_ref().is_some_and(|s| s.has_256),
            no_color: std::env::var_os("NO_COLOR").is_some(),
        }
    }

    /// Parser with fixed capabilities, independent of the current terminal
    pub fn with_capabilities(supports_true_color: bool, supports_256: bool) -> Self {
        Self {
            supports_true_color,
            supports_256,
            no_color: false,
        }
    }

    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let spec = s.trim();
        if spec.starts_with('#') {
            let (r, g, b) = parse_hex(spec)?;
            return Ok(self.fit_rgb(r, g, b));
        }

        let key = spec
            .to_ascii_lowercase()
            .replace(' ', "_")
            .replace("grey", "gray");
        if let Some(index) = key
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return index
                .trim()
                .parse::<u8>()
                .map(Color::Indexed)
                .map_err(|_| eyre!("Invalid indexed color '{}': expected indexed(0-255)", spec));
        }

        // "reversed" and "default" are resolved by Theme; parsing only checks them
        if matches!(key.as_str(), "reset" | "default" | "none" | "reversed") {
            return Ok(Color::Reset);
        }

        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, color)| *color)
            .ok_or_else(|| {
                eyre!(
                    "Unknown color '{}'. Use a name (cyan, bright_red, dark_gray), #rrggbb or indexed(n)",
                    spec
                )
            })
    }

    fn fit_rgb(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(nearest_xterm_index(r, g, b))
        } else {
            nearest_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `#rrggbb` into its components.
pub fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let s = s.trim();
    let digits = s
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| eyre!("Invalid hex color '{}': expected #rrggbb", s))?;
    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| eyre!("Invalid hex color '{}': expected #rrggbb", s))?;
    Ok(((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

/// Channel values of the xterm 6x6x6 cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2) as u32;
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

fn nearest_cube_level(c: u8) -> usize {
    (0..CUBE_LEVELS.len())
        .min_by_key(|&i| (CUBE_LEVELS[i] as i32 - c as i32).abs())
        .unwrap_or(0)
}

/// Closest entry of the 256-color palette: either a cube color (16-231) or a
/// step of the grayscale ramp (232-255, values 8, 18, .. 238).
fn nearest_xterm_index(r: u8, g: u8, b: u8) -> u8 {
    let (ri, gi, bi) = (
        nearest_cube_level(r),
        nearest_cube_level(g),
        nearest_cube_level(b),
    );
    let cube = (CUBE_LEVELS[ri], CUBE_LEVELS[gi], CUBE_LEVELS[bi]);

    let avg = (r as u32 + g as u32 + b as u32) / 3;
    let step = (avg.saturating_sub(3) / 10).min(23) as u8;
    let gray = 8 + 10 * step;

    if distance((gray, gray, gray), (r, g, b)) < distance(cube, (r, g, b)) {
        232 + step
    } else {
        16 + 36 * ri as u8 + 6 * gi as u8 + bi as u8
    }
}

const ANSI_PALETTE: [(Color, (u8, u8, u8)); 8] = [
    (Color::Black, (0, 0, 0)),
    (Color::Red, (205, 0, 0)),
    (Color::Green, (0, 205, 0)),
    (Color::Yellow, (205, 205, 0)),
    (Color::Blue, (0, 0, 238)),
    (Color::Magenta, (205, 0, 205)),
    (Color::Cyan, (0, 205, 205)),
    (Color::White, (229, 229, 229)),
];

fn nearest_ansi(r: u8, g: u8, b: u8) -> Color {
    ANSI_PALETTE
        .iter()
        .min_by_key(|(_, rgb)| distance(*rgb, (r, g, b)))
        .map(|(color, _)| *color)
        .unwrap_or(Color::Reset)
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
    /// Names whose config value was "reversed"
    reversed: HashSet<String>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        Self::from_config_with_parser(config, &ColorParser::new())
    }

    pub fn from_config_with_parser(config: &ThemeConfig, parser: &ColorParser) -> Result<Self> {
        let mut colors = HashMap::new();
        let mut reversed = HashSet::new();
        for (name, value) in config.colors.named() {
            let trimmed = value.trim();
            if trimmed.eq_ignore_ascii_case("reversed") {
                reversed.insert(name.to_string());
                continue;
            }
            if name == "alternate_row_color" && trimmed.eq_ignore_ascii_case("default") {
                continue;
            }
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors, reversed })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Get a color by name, returns None if not found
    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    pub fn is_reversed(&self, name: &str) -> bool {
        self.reversed.contains(name)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config_with_parser(
            &ThemeConfig::default(),
            &ColorParser::with_capabilities(false, true),
        )
        .unwrap_or_else(|_| Self {
            colors: HashMap::new(),
            reversed: HashSet::new(),
        })
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use ratatui::layout::Rect;

pub mod chart_export;
pub mod config;
pub mod dataset;
pub mod detail;
pub mod error;
pub mod error_display;
pub mod filter;
pub mod frequency;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod schema;
pub mod widgets;

pub use chart_export::{chart_title, export_chart, ChartExportFormat, ChartExportOptions};
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dataset::{Dataset, FilteredView, Record};
pub use detail::DetailSelection;
pub use error::{NotFoundError, PipelineError, SchemaError};
pub use filter::{FilterSpec, Predicate, Selection};
pub use frequency::FrequencyRow;
pub use ingest::{load_dataset, IngestError, LoadError};
pub use insectui_cli::{Args, ChartFormat, CompressionFormat, FileFormat};
pub use pipeline::{evaluate, DetailChoice, EmptyState, Session, Snapshot};

use error_display::{
    empty_state_message, user_message_from_export, user_message_from_load,
    user_message_from_pipeline,
};
use render::{app_layout, RenderContext};
use widgets::debug::DebugState;
use widgets::dropdown::DropdownState;
use widgets::records::RecordsState;
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for config directory
pub const APP_NAME: &str = "insectui";

/// How to read the data file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// Forced file format; detected from the extension when `None`.
    pub format: Option<FileFormat>,
    pub compression: Option<CompressionFormat>,
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    /// Excel sheet name or 0-based index.
    pub excel_sheet: Option<String>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn with_excel_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.excel_sheet = Some(sheet.into());
        self
    }

    /// Create OpenOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        Self {
            format: args.format,
            compression: args.compression,
            delimiter: args.delimiter.or(config.file_loading.delimiter),
            has_header: match args.no_header {
                Some(no_header) => Some(!no_header),
                None => config.file_loading.has_header,
            },
            excel_sheet: args
                .excel_sheet
                .clone()
                .or_else(|| config.file_loading.excel_sheet.clone()),
        }
    }
}

impl From<&Args> for OpenOptions {
    fn from(args: &Args) -> Self {
        Self::from_args_and_config(args, &AppConfig::default())
    }
}

/// Filter inputs given on the command line.
pub fn filter_spec_from_args(args: &Args) -> FilterSpec {
    let mut spec = FilterSpec::new().with_show_all(args.show_all);
    if let Some(pest) = &args.pest {
        spec = spec.with_pest(pest.clone());
    }
    if let Some(text) = &args.crop_contains {
        spec = spec.with_crop_contains(text.clone());
    }
    if let Some(text) = &args.insecticide_contains {
        spec = spec.with_insecticide_contains(text.clone());
    }
    spec.with_crop(Selection::from(args.crop.clone()))
        .with_insecticide(Selection::from(args.insecticide.clone()))
}

/// Export settings from config, titled after the pest being searched.
pub fn chart_export_options(config: &AppConfig, spec: &FilterSpec) -> ChartExportOptions {
    ChartExportOptions {
        title: Some(chart_title(spec)),
        size: (config.chart.export_width, config.chart.export_height),
        bar_color: config.chart.bar_rgb(),
    }
}

/// Where Ctrl-E writes the chart: `<source stem>_usage.<ext>` in the working directory.
pub fn default_export_path(source: Option<&Path>, format: ChartExportFormat) -> PathBuf {
    let stem = source
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .map(|s| s.split('.').next().unwrap_or_default().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "insecticide".to_string());
    PathBuf::from(format!("{}_usage.{}", stem, format.extension()))
}

pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf, OpenOptions),
    DoLoad(PathBuf, OpenOptions), // Internal event to actually perform loading after UI update
    /// Inputs changed; re-run the pipeline.
    Refresh,
    Export(PathBuf, ChartExportFormat),
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

/// Focusable fields, in Tab order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    File,
    #[default]
    Pest,
    CropContains,
    InsecticideContains,
    ShowAll,
    Crop,
    Insecticide,
    Results,
    Detail,
}

impl Focus {
    const ORDER: [Focus; 9] = [
        Focus::File,
        Focus::Pest,
        Focus::CropContains,
        Focus::InsecticideContains,
        Focus::ShowAll,
        Focus::Crop,
        Focus::Insecticide,
        Focus::Results,
        Focus::Detail,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// How many times a refresh re-runs when a dropdown loses its selection.
const MAX_SETTLE_PASSES: usize = 3;

pub struct App {
    session: Option<Session>,
    open_options: OpenOptions,
    focus: Focus,
    file_input: TextInput,
    pest_input: TextInput,
    crop_input: TextInput,
    insecticide_input: TextInput,
    show_all: bool,
    crop: DropdownState,
    insecticide: DropdownState,
    detail_choice: DetailChoice,
    snapshot: Option<Snapshot>,
    records: RecordsState,
    status: Option<Status>,
    config: AppConfig,
    ctx: RenderContext,
    debug: DebugState,
}

impl App {
    pub fn new() -> App {
        Self::new_with_config(Theme::default(), AppConfig::default())
    }

    pub fn new_with_config(theme: Theme, config: AppConfig) -> App {
        let ctx = RenderContext::from_theme_and_config(&theme, &config);
        let input = || TextInput::new().with_theme(&theme);
        let mut app = App {
            session: None,
            open_options: OpenOptions::new(),
            focus: Focus::default(),
            file_input: input(),
            pest_input: input(),
            crop_input: input(),
            insecticide_input: input(),
            show_all: false,
            crop: DropdownState::new(),
            insecticide: DropdownState::new(),
            detail_choice: DetailChoice::First,
            snapshot: None,
            records: RecordsState::new(),
            status: None,
            debug: DebugState {
                enabled: config.debug.enabled,
                show_performance: config.debug.show_performance,
                ..DebugState::default()
            },
            config,
            ctx,
        };
        app.set_focus(Focus::default());
        app
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    /// Options used when a path is submitted from the File box.
    pub fn set_open_options(&mut self, options: OpenOptions) {
        self.open_options = options;
    }

    /// Seed the inputs, e.g. from command-line flags. Takes effect on the next refresh.
    pub fn set_filter_inputs(&mut self, spec: &FilterSpec) {
        self.pest_input
            .set_value(spec.pest_substring.clone().unwrap_or_default());
        self.crop_input
            .set_value(spec.crop_substring.clone().unwrap_or_default());
        self.insecticide_input
            .set_value(spec.insecticide_substring.clone().unwrap_or_default());
        self.show_all = spec.show_all;
        self.crop.preset(spec.crop_exact.clone());
        self.insecticide.preset(spec.insecticide_exact.clone());
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn crop_selection(&self) -> &Selection {
        self.crop.selection()
    }

    pub fn insecticide_selection(&self) -> &Selection {
        self.insecticide.selection()
    }

    pub fn records(&self) -> &RecordsState {
        &self.records
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.enabled
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.file_input.set_focused(focus == Focus::File);
        self.pest_input.set_focused(focus == Focus::Pest);
        self.crop_input.set_focused(focus == Focus::CropContains);
        self.insecticide_input
            .set_focused(focus == Focus::InsecticideContains);
    }

    fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(Status::new(kind, message));
    }

    /// The current inputs as a [`FilterSpec`].
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::new()
            .with_show_all(self.show_all)
            .with_pest(self.pest_input.value())
            .with_crop_contains(self.crop_input.value())
            .with_insecticide_contains(self.insecticide_input.value())
            .with_crop(self.crop.selection().clone())
            .with_insecticide(self.insecticide.selection().clone())
    }

    fn load(&mut self, path: &Path, options: &OpenOptions) -> Result<(), LoadError> {
        let dataset = load_dataset(path, options)?;
        info!(path = %path.display(), rows = dataset.height(), "dataset loaded");
        self.session = Some(Session::new(path, dataset));
        self.open_options = options.clone();
        // dropdown choices the new file does not offer are dropped by the next refresh
        self.detail_choice = DetailChoice::First;
        Ok(())
    }

    /// Re-run the pipeline for the current inputs and settle the dropdowns.
    ///
    /// Options are recomputed from the upstream stages, so a selection the new
    /// options no longer offer is reset to "All" and the pipeline runs again.
    pub fn refresh(&mut self) -> Result<(), PipelineError> {
        let Some(session) = &self.session else {
            self.snapshot = None;
            return Ok(());
        };

        let mut snapshot = session.evaluate(&self.filter_spec(), &self.detail_choice)?;
        for _ in 0..MAX_SETTLE_PASSES {
            let crop_dropped = self.crop.set_options(snapshot.staged.crop_options.clone());
            let insecticide_dropped = self
                .insecticide
                .set_options(snapshot.staged.insecticide_options.clone());
            if !crop_dropped && !insecticide_dropped {
                break;
            }
            debug!("dropdown selection no longer offered, reset to All");
            snapshot = session.evaluate(&self.filter_spec(), &self.detail_choice)?;
        }

        if let Some(detail) = snapshot.resolved_detail() {
            self.detail_choice = DetailChoice::Prefer(detail.insecticide.clone());
        }
        self.debug.on_evaluation(snapshot.elapsed);
        debug!(
            rows = snapshot.staged.view.height(),
            elapsed_us = snapshot.elapsed.as_micros() as u64,
            "pipeline evaluated"
        );
        self.records
            .reset(&snapshot.staged.view)
            .map_err(PipelineError::from)?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn refresh_or_report(&mut self) {
        if let Err(e) = self.refresh() {
            warn!(error = %e, "pipeline failed");
            self.set_status(StatusKind::Error, user_message_from_pipeline(&e));
        }
    }

    /// Step the detail selector through the insecticides in the view.
    fn cycle_detail(&mut self, forward: bool) -> Option<AppEvent> {
        let snapshot = self.snapshot.as_ref()?;
        let options = &snapshot.detail_options;
        if options.is_empty() {
            return None;
        }
        let current = snapshot
            .resolved_detail()
            .and_then(|d| options.iter().position(|o| *o == d.insecticide))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        self.detail_choice = DetailChoice::Prefer(options[next].clone());
        Some(AppEvent::Refresh)
    }

    fn scroll_records(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let page = self.records.visible_rows.max(1);
        match event.code {
            KeyCode::Down => self.records.select_next(1),
            KeyCode::Up => self.records.select_prev(1),
            KeyCode::PageDown => self.records.select_next(page),
            KeyCode::PageUp => self.records.select_prev(page),
            KeyCode::Home => self.records.select_first(),
            KeyCode::End => self.records.select_last(),
            _ => return None,
        }
        self.debug.last_action = "scroll_records".to_string();
        self.reload_records();
        None
    }

    fn reload_records(&mut self) {
        let result = match &self.snapshot {
            Some(snapshot) => self.records.reload(&snapshot.staged.view),
            None => Ok(()),
        };
        if let Err(e) = result {
            self.set_status(StatusKind::Error, error_display::user_message_from_polars(&e));
        }
    }

    /// Ctrl-E: export the chart for the current view.
    pub fn export_request(&mut self) -> Option<AppEvent> {
        let snapshot = self.snapshot.as_ref();
        let state = match snapshot {
            None => Some(EmptyState::NoFile),
            Some(s) => s.chart_state(),
        };
        if let Some(state) = state {
            self.set_status(StatusKind::Warning, empty_state_message(state));
            return None;
        }
        let format = self.config.chart.export_format();
        let source = self.session.as_ref().map(|s| s.source.as_path());
        Some(AppEvent::Export(default_export_path(source, format), format))
    }

    fn export(&mut self, path: &Path, format: ChartExportFormat) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let options = chart_export_options(&self.config, &snapshot.spec);
        match export_chart(path, &snapshot.frequencies, format, &options) {
            Ok(()) => {
                info!(path = %path.display(), format = format.as_str(), "chart exported");
                self.set_status(
                    StatusKind::Success,
                    format!("Chart saved to {}", path.display()),
                );
            }
            Err(e) => {
                warn!(error = %e, "chart export failed");
                self.set_status(StatusKind::Error, user_message_from_export(&e, path));
            }
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        match event.code {
            KeyCode::Char('c') if ctrl => return Some(AppEvent::Exit),
            KeyCode::Char('e') if ctrl => return self.export_request(),
            KeyCode::Char('d') if ctrl => {
                self.debug.enabled = !self.debug.enabled;
                return None;
            }
            KeyCode::Esc => return Some(AppEvent::Exit),
            KeyCode::Tab => {
                self.set_focus(self.focus.next());
                self.debug.last_action = "focus_next".to_string();
                return None;
            }
            KeyCode::BackTab => {
                self.set_focus(self.focus.prev());
                self.debug.last_action = "focus_prev".to_string();
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::File => match self.file_input.handle_key(event) {
                TextInputEvent::Submit => {
                    let path = self.file_input.value().trim();
                    if path.is_empty() {
                        return None;
                    }
                    Some(AppEvent::Open(PathBuf::from(path), self.open_options.clone()))
                }
                _ => None,
            },
            Focus::Pest | Focus::CropContains | Focus::InsecticideContains => {
                let input = match self.focus {
                    Focus::Pest => &mut self.pest_input,
                    Focus::CropContains => &mut self.crop_input,
                    _ => &mut self.insecticide_input,
                };
                match input.handle_key(event) {
                    TextInputEvent::Changed | TextInputEvent::Submit => Some(AppEvent::Refresh),
                    _ => None,
                }
            }
            Focus::ShowAll => match event.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    self.show_all = !self.show_all;
                    self.debug.last_action = "toggle_show_all".to_string();
                    Some(AppEvent::Refresh)
                }
                _ => None,
            },
            Focus::Crop | Focus::Insecticide => {
                let dropdown = if self.focus == Focus::Crop {
                    &mut self.crop
                } else {
                    &mut self.insecticide
                };
                match event.code {
                    KeyCode::Right | KeyCode::Down => dropdown.next(),
                    KeyCode::Left | KeyCode::Up => dropdown.prev(),
                    _ => return None,
                }
                Some(AppEvent::Refresh)
            }
            Focus::Results => self.scroll_records(event),
            Focus::Detail => match event.code {
                KeyCode::Right | KeyCode::Down => self.cycle_detail(true),
                KeyCode::Left | KeyCode::Up => self.cycle_detail(false),
                _ => None,
            },
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path, options) => {
                // render the loading status before blocking on the read
                self.set_status(
                    StatusKind::Info,
                    format!("Loading {}...", path.display()),
                );
                Some(AppEvent::DoLoad(path.clone(), options.clone()))
            }
            AppEvent::DoLoad(path, options) => {
                match self.load(path, options) {
                    Ok(()) => {
                        self.file_input.set_value(path.display().to_string());
                        let rows = self.session.as_ref().map(|s| s.dataset.height());
                        self.set_status(
                            StatusKind::Success,
                            format!("Loaded {} records", rows.unwrap_or(0)),
                        );
                        Some(AppEvent::Refresh)
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "load failed");
                        self.set_status(StatusKind::Error, user_message_from_load(&e, path));
                        None
                    }
                }
            }
            AppEvent::Refresh => {
                self.refresh_or_report();
                None
            }
            AppEvent::Export(path, format) => {
                self.export(path, *format);
                None
            }
            AppEvent::Resize(cols, rows) => {
                let layout = app_layout(Rect::new(0, 0, *cols, *rows), self.debug.enabled);
                // borders and header row
                let body = layout.results.height.saturating_sub(3);
                self.records.set_visible_rows(body as usize);
                self.reload_records();
                None
            }
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use insectui::{App, AppEvent, ChartExportFormat, EmptyState, Focus, OpenOptions, StatusKind};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

mod common;

/// Feed `event` and every follow-up event the app returns. Returns true on exit.
fn drive(app: &mut App, event: AppEvent) -> bool {
    let mut next = Some(event);
    while let Some(event) = next.take() {
        if matches!(event, AppEvent::Exit) {
            return true;
        }
        next = app.event(&event);
    }
    false
}

fn press(app: &mut App, code: KeyCode) -> bool {
    drive(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn focus(app: &mut App, target: Focus) {
    while app.focus() != target {
        press(app, KeyCode::Tab);
    }
}

fn view_height(app: &App) -> usize {
    app.snapshot().unwrap().staged.view.height()
}

fn loaded_app() -> (tempfile::TempDir, App) {
    let (dir, path) = common::write_file("usage.csv", common::USAGE_CSV);
    let mut app = App::new();
    drive(&mut app, AppEvent::Open(path, OpenOptions::new()));
    (dir, app)
}

#[test]
fn test_open_file_then_prompt_for_criteria() {
    let (_dir, app) = loaded_app();
    assert_eq!(app.session().unwrap().dataset.height(), 6);
    assert_eq!(app.status().unwrap().kind, StatusKind::Success);
    assert_eq!(
        app.snapshot().unwrap().table_state(),
        Some(EmptyState::NoCriteria)
    );
}

#[test]
fn test_typing_a_pest_filters_as_you_type() {
    let (_dir, mut app) = loaded_app();
    assert_eq!(app.focus(), Focus::Pest);
    type_text(&mut app, "APH");
    assert_eq!(view_height(&app), 3);
    type_text(&mut app, "id z");
    assert_eq!(
        app.snapshot().unwrap().table_state(),
        Some(EmptyState::NoMatches)
    );
    press(&mut app, KeyCode::Backspace);
    press(&mut app, KeyCode::Backspace);
    assert_eq!(view_height(&app), 3);
}

#[test]
fn test_show_all_toggle() {
    let (_dir, mut app) = loaded_app();
    focus(&mut app, Focus::ShowAll);
    press(&mut app, KeyCode::Char(' '));
    assert!(app.show_all());
    assert_eq!(view_height(&app), 6);
    press(&mut app, KeyCode::Char(' '));
    assert!(!app.show_all());
    assert!(app.snapshot().unwrap().staged.view.is_empty());
}

#[test]
fn test_crop_dropdown_narrows_and_resets_when_stale() {
    let (_dir, mut app) = loaded_app();
    type_text(&mut app, "aphid");
    focus(&mut app, Focus::Crop);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.crop_selection().value(), Some("Cotton"));
    assert_eq!(view_height(&app), 1);

    // only Black Aphid (Rice) uses malathion, so Cotton is no longer offered
    focus(&mut app, Focus::InsecticideContains);
    type_text(&mut app, "mal");
    assert!(app.crop_selection().is_all());
    assert_eq!(view_height(&app), 1);
}

#[test]
fn test_detail_selector_cycles_insecticides() {
    let (_dir, mut app) = loaded_app();
    type_text(&mut app, "aphid");
    let first = app.snapshot().unwrap().resolved_detail().unwrap().insecticide.clone();
    assert_eq!(first, "Imidacloprid");

    focus(&mut app, Focus::Detail);
    press(&mut app, KeyCode::Right);
    let detail = app.snapshot().unwrap().resolved_detail().unwrap();
    assert_eq!(detail.insecticide, "Malathion");
    assert_eq!(detail.formulation.as_deref(), Some("EC"));

    // the choice survives an unrelated refresh
    focus(&mut app, Focus::CropContains);
    type_text(&mut app, "r");
    let detail = app.snapshot().unwrap().resolved_detail().unwrap();
    assert_eq!(detail.insecticide, "Malathion");
}

#[test]
fn test_results_scrolling_stays_in_bounds() {
    let (_dir, mut app) = loaded_app();
    focus(&mut app, Focus::ShowAll);
    press(&mut app, KeyCode::Enter);
    focus(&mut app, Focus::Results);
    press(&mut app, KeyCode::End);
    assert_eq!(app.records().selected, 5);
    press(&mut app, KeyCode::Down);
    assert_eq!(app.records().selected, 5);
    press(&mut app, KeyCode::Home);
    assert_eq!(app.records().selected, 0);
}

#[test]
fn test_failed_load_reports_error_and_keeps_running() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new();
    let exited = drive(
        &mut app,
        AppEvent::Open(dir.path().join("missing.csv"), OpenOptions::new()),
    );
    assert!(!exited);
    assert!(app.session().is_none());
    let status = app.status().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.message.contains("not found"), "got: {}", status.message);
}

#[test]
fn test_schema_error_is_reported() {
    let (_dir, path) = common::write_file("bad.csv", "PEST,INSECTICIDE\nAphid,Malathion\n");
    let mut app = App::new();
    drive(&mut app, AppEvent::Open(path, OpenOptions::new()));
    let status = app.status().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.message.contains("Formulation, CROP"), "got: {}", status.message);
}

#[test]
fn test_export_without_data_warns() {
    let mut app = App::new();
    assert!(app.export_request().is_none());
    assert_eq!(app.status().unwrap().kind, StatusKind::Warning);
}

#[test]
fn test_export_writes_chart() {
    let (dir, mut app) = loaded_app();
    type_text(&mut app, "aphid");
    let path = dir.path().join("chart.eps");
    drive(&mut app, AppEvent::Export(path.clone(), ChartExportFormat::Eps));
    assert_eq!(app.status().unwrap().kind, StatusKind::Success);
    assert!(path.exists());
}

#[test]
fn test_failed_export_reports_a_save_error() {
    let (dir, mut app) = loaded_app();
    type_text(&mut app, "aphid");
    let path = dir.path().join("no_such_folder").join("chart.eps");
    drive(&mut app, AppEvent::Export(path.clone(), ChartExportFormat::Eps));

    let status = app.status().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(
        status.message.starts_with("Failed to save chart to"),
        "got: {}",
        status.message
    );
    assert!(!status.message.contains("Failed to load"));
    assert!(!path.exists());
}

#[test]
fn test_escape_exits() {
    let mut app = App::new();
    assert!(press(&mut app, KeyCode::Esc));
}

#[test]
fn test_ctrl_d_toggles_debug() {
    let mut app = App::new();
    let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
    drive(&mut app, AppEvent::Key(ctrl_d));
    assert!(app.debug_enabled());
    drive(&mut app, AppEvent::Key(ctrl_d));
    assert!(!app.debug_enabled());
}

/// Draw the app on a 120x40 test terminal and return the screen text.
fn render_screen(app: &mut App) -> String {
    drive(app, AppEvent::Resize(120, 40));
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal
        .draw(|frame| frame.render_widget(&mut *app, frame.area()))
        .unwrap();
    let buffer = terminal.backend().buffer().clone();
    let mut screen = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            screen.push_str(buffer[(x, y)].symbol());
        }
        screen.push('\n');
    }
    screen
}

#[test]
fn test_show_all_chart_title_ignores_pest_text() {
    let (_dir, mut app) = loaded_app();
    type_text(&mut app, "aphid");
    focus(&mut app, Focus::ShowAll);
    press(&mut app, KeyCode::Char(' '));
    assert!(app.show_all());

    let screen = render_screen(&mut app);
    assert!(screen.contains("Insecticides Used (Pest: All)"));
    assert!(!screen.contains("Pest: aphid"));
}

#[test]
fn test_renders_all_panels() {
    let (_dir, mut app) = loaded_app();
    type_text(&mut app, "aphid");
    let screen = render_screen(&mut app);
    assert!(screen.contains("Insecticide Usage Explorer"));
    assert!(screen.contains("Filtered Results (3 of 6)"));
    assert!(screen.contains("Insecticide Information"));
    assert!(screen.contains("Insecticides Used (Pest: aphid)"));
    assert!(screen.contains("Green Aphid"));
}

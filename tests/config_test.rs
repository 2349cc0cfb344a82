use insectui::config::{AppConfig, ConfigManager};
use insectui::{Args, ChartExportFormat, OpenOptions};

fn manager() -> (tempfile::TempDir, ConfigManager) {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::with_dir(dir.path().join("insectui"));
    (dir, manager)
}

#[test]
fn test_generated_config_loads_as_defaults() {
    let (_dir, manager) = manager();
    let path = manager.write_default_config(false).unwrap();
    assert!(path.exists());

    let loaded = AppConfig::load_from(&manager).unwrap();
    let default = AppConfig::default();
    assert_eq!(loaded.display.max_chart_bars, default.display.max_chart_bars);
    assert_eq!(loaded.chart.export_width, default.chart.export_width);
    assert_eq!(loaded.theme.colors.table_selected, "reversed");
}

#[test]
fn test_existing_config_needs_force() {
    let (_dir, manager) = manager();
    manager.write_default_config(false).unwrap();
    assert!(manager.write_default_config(false).is_err());
    assert!(manager.write_default_config(true).is_ok());
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let (_dir, manager) = manager();
    let loaded = AppConfig::load_from(&manager).unwrap();
    assert_eq!(loaded.chart.export_format(), ChartExportFormat::Png);
}

#[test]
fn test_user_values_override_defaults() {
    let (_dir, manager) = manager();
    manager.ensure_config_dir().unwrap();
    std::fs::write(
        manager.config_path("config.toml"),
        r##"
[file_loading]
delimiter = 59

[display]
max_chart_bars = 10

[chart]
default_format = "eps"
bar_color = "#ff8800"

[theme.colors]
chart_bar = "magenta"
"##,
    )
    .unwrap();

    let loaded = AppConfig::load_from(&manager).unwrap();
    assert_eq!(loaded.file_loading.delimiter, Some(b';'));
    assert_eq!(loaded.display.max_chart_bars, 10);
    assert_eq!(loaded.chart.export_format(), ChartExportFormat::Eps);
    assert_eq!(loaded.chart.bar_rgb(), (0xff, 0x88, 0x00));
    assert_eq!(loaded.theme.colors.chart_bar, "magenta");
    // untouched sections keep defaults
    assert_eq!(loaded.chart.export_height, 768);
}

#[test]
fn test_invalid_values_are_rejected() {
    let (_dir, manager) = manager();
    manager.ensure_config_dir().unwrap();
    std::fs::write(
        manager.config_path("config.toml"),
        "[chart]\ndefault_format = \"gif\"\n",
    )
    .unwrap();
    let err = AppConfig::load_from(&manager).unwrap_err();
    assert!(err.to_string().contains("default_format"), "got: {}", err);

    std::fs::write(
        manager.config_path("config.toml"),
        "[display]\nmax_chart_bars = 0\n",
    )
    .unwrap();
    assert!(AppConfig::load_from(&manager).is_err());
}

#[test]
fn test_cli_overrides_config_file_loading() {
    use clap::Parser;
    let mut config = AppConfig::default();
    config.file_loading.delimiter = Some(b'|');

    let args = Args::parse_from(["insectui", "usage.txt", "--delimiter", "9"]);
    let opts = OpenOptions::from_args_and_config(&args, &config);
    assert_eq!(opts.delimiter, Some(b'\t'));

    let args = Args::parse_from(["insectui", "usage.txt"]);
    let opts = OpenOptions::from_args_and_config(&args, &config);
    assert_eq!(opts.delimiter, Some(b'|'));
}

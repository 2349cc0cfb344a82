use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use insectui::error_display::{
    empty_state_message, user_message_from_load, user_message_from_pipeline,
};
use insectui::logging::{self, LogSink};
use insectui::report::Report;
use insectui::{
    chart_export_options, evaluate, export_chart, filter_spec_from_args, load_dataset, App,
    AppConfig, AppEvent, Args, ChartExportFormat, ConfigManager, DetailChoice, OpenOptions, Theme,
    APP_NAME,
};
use ratatui::DefaultTerminal;
use std::io::Write;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{info, warn};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig, theme: Theme) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let poll_interval = Duration::from_millis(config.display.event_poll_interval_ms);
    let opts = OpenOptions::from_args_and_config(args, &config);

    let mut app = App::new_with_config(theme, config);
    if args.debug {
        app.enable_debug();
    }
    app.set_open_options(opts.clone());
    app.set_filter_inputs(&filter_spec_from_args(args));

    let size = terminal.size()?;
    tx.send(AppEvent::Resize(size.width, size.height))?;
    if let Some(path) = &args.path {
        tx.send(AppEvent::Open(path.clone(), opts))?;
    }
    render(&mut terminal, &mut app)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// `--report` and `--export-chart`: run the pipeline once and exit.
fn run_batch(args: &Args, config: &AppConfig) -> Result<()> {
    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("A data file is required"))?;
    let opts = OpenOptions::from_args_and_config(args, config);
    let dataset = load_dataset(path, &opts).map_err(|e| eyre!(user_message_from_load(&e, path)))?;

    let spec = filter_spec_from_args(args);
    let choice = args
        .detail
        .clone()
        .map(DetailChoice::Exact)
        .unwrap_or_default();
    let snapshot =
        evaluate(&dataset, &spec, &choice).map_err(|e| eyre!(user_message_from_pipeline(&e)))?;
    info!(
        rows = snapshot.staged.view.height(),
        elapsed_us = snapshot.elapsed.as_micros() as u64,
        "pipeline evaluated"
    );

    if args.report {
        let report = Report::new(path.display().to_string(), dataset.height(), &snapshot)?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if args.json {
            report.write_json(&mut out)?;
        } else {
            report.write_text(&mut out)?;
        }
        out.flush()?;
    }

    if let Some(chart_path) = &args.export_chart {
        if let Some(state) = snapshot.chart_state() {
            return Err(eyre!(empty_state_message(state)));
        }
        let format = args
            .chart_format
            .map(ChartExportFormat::from)
            .or_else(|| ChartExportFormat::from_path(chart_path))
            .unwrap_or_else(|| config.chart.export_format());
        let options = chart_export_options(config, &spec);
        export_chart(chart_path, &snapshot.frequencies, format, &options)
            .wrap_err_with(|| format!("Failed to export chart to {}", chart_path.display()))?;
        eprintln!("Chart saved to {}", chart_path.display());
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(manager) => match manager.write_default_config(args.force) {
                Ok(path) => {
                    println!("Wrote default configuration to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    let config = match AppConfig::load(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}. Using default configuration.", e);
            AppConfig::default()
        }
    };

    let interactive = !args.report && args.export_chart.is_none();
    logging::init(
        LogSink::for_mode(interactive, args.log_file.as_deref()),
        args.debug || config.debug.enabled,
    )?;

    if !interactive {
        if let Err(e) = run_batch(&args, &config) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let theme = Theme::from_config(&config.theme).unwrap_or_else(|e| {
        warn!(error = %e, "invalid theme, using defaults");
        Theme::default()
    });
    let terminal = ratatui::init();
    let result = run(terminal, &args, config, theme);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

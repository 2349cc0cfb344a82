//! Tracing subscriber setup.
//!
//! # Priority (highest to lowest)
//!
//! 1. `INSECTUI_LOG` env var (per-target directives, e.g. `insectui=debug,warn`)
//! 2. `RUST_LOG` env var
//! 3. `--debug` → debug
//! 4. Default level: `warn`
//!
//! The interactive view owns the terminal, so it only logs when given a file.
//! Report and export modes log to stderr.

use std::fs::OpenOptions as FileOpenOptions;
use std::path::Path;
use std::sync::Mutex;

use color_eyre::Result;
use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink<'a> {
    /// Discard everything (interactive view without `--log-file`).
    Off,
    Stderr,
    File(&'a Path),
}

impl<'a> LogSink<'a> {
    /// Pick the sink for the mode the binary runs in.
    pub fn for_mode(interactive: bool, log_file: Option<&'a Path>) -> Self {
        match (log_file, interactive) {
            (Some(path), _) => LogSink::File(path),
            (None, true) => LogSink::Off,
            (None, false) => LogSink::Stderr,
        }
    }
}

pub fn default_level(debug: bool) -> Level {
    if debug {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Install the global subscriber. Calling it twice is harmless (the second call is ignored).
pub fn init(sink: LogSink<'_>, debug: bool) -> Result<()> {
    let filter = build_env_filter(debug);
    match sink {
        LogSink::Off => Ok(()),
        LogSink::Stderr => {
            let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(use_ansi)
                .with_target(true)
                .without_time()
                .compact();
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init();
            Ok(())
        }
        LogSink::File(path) => {
            let file = FileOpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::uptime());
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init();
            Ok(())
        }
    }
}

/// `INSECTUI_LOG` > `RUST_LOG` > flag default. Unparseable values fall through.
fn build_env_filter(debug: bool) -> EnvFilter {
    if let Ok(directives) = std::env::var("INSECTUI_LOG") {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = default_level(debug);
    let directive = if debug {
        format!("{},insectui=debug", Level::INFO)
    } else {
        level.to_string()
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

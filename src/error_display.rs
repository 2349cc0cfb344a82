//! User-facing message formatting.
//!
//! Uses typed error matching (PolarsError variants, io::ErrorKind, the crate's
//! own error enums) rather than string parsing, so every failure and every
//! empty data state gets its own sentence.

use polars::prelude::PolarsError;
use std::io;
use std::path::Path;

use crate::error::{NotFoundError, PipelineError, SchemaError};
use crate::ingest::{IngestError, LoadError};
use crate::pipeline::EmptyState;

/// Text shown in place of a panel that has nothing to display.
pub fn empty_state_message(state: EmptyState) -> &'static str {
    match state {
        EmptyState::NoFile => "Open a data file to begin (type a path in File and press Enter).",
        EmptyState::NoCriteria => "Please enter a pest name or enable 'Show All Data'.",
        EmptyState::NoMatches => "No matching pests found.",
        EmptyState::NoMatchesAfterSelection => "No matching records found after filter.",
        EmptyState::NoDetailSelected => "No insecticide selected.",
        EmptyState::NothingToChart => "No insecticide usage to chart.",
    }
}

pub fn user_message_from_schema(err: &SchemaError) -> String {
    match err {
        SchemaError::MissingColumns { missing } => format!(
            "The file is missing required column(s): {}. Expected PEST, INSECTICIDE, Formulation and CROP.",
            missing.join(", ")
        ),
        SchemaError::DuplicateColumn { name } => format!(
            "Column '{}' appears more than once (headers are compared after trimming spaces).",
            name
        ),
        SchemaError::UnsupportedColumnType { column, dtype } => format!(
            "Column '{}' holds {} values, which cannot be compared as text.",
            column, dtype
        ),
        SchemaError::Malformed { reason } => format!("The table could not be read: {}", reason),
    }
}

pub fn user_message_from_not_found(err: &NotFoundError) -> String {
    format!(
        "'{}' does not appear in the filtered rows. Choose one of the listed insecticides.",
        err.insecticide
    )
}

pub fn user_message_from_pipeline(err: &PipelineError) -> String {
    match err {
        PipelineError::Schema(e) => user_message_from_schema(e),
        PipelineError::NotFound(e) => user_message_from_not_found(e),
        PipelineError::Polars(e) => user_message_from_polars(e),
    }
}

pub fn user_message_from_ingest(err: &IngestError) -> String {
    match err {
        IngestError::Io { path, source } => format!(
            "Failed to load {}: {}",
            path.display(),
            user_message_from_io(source, None)
        ),
        IngestError::UnknownFormat { path } => format!(
            "Cannot tell what kind of file {} is. Use an Excel, CSV, TSV, PSV or Parquet extension, or pass --format.",
            path.display()
        ),
        IngestError::Excel(msg) => format!("Could not read the Excel workbook: {}", msg),
        IngestError::NoWorksheets => "The Excel workbook has no worksheets.".to_string(),
        IngestError::SheetNotFound(which) => format!("The Excel workbook has no sheet {}.", which),
        IngestError::Polars(e) => user_message_from_polars(e),
    }
}

pub fn user_message_from_load(err: &LoadError, path: &Path) -> String {
    match err {
        // these already name the path
        LoadError::Ingest(e @ (IngestError::Io { .. } | IngestError::UnknownFormat { .. })) => {
            user_message_from_ingest(e)
        }
        LoadError::Ingest(e) => format!(
            "Failed to load {}: {}",
            path.display(),
            user_message_from_ingest(e)
        ),
        LoadError::Schema(e) => user_message_from_schema(e),
    }
}

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!("Column not found: {}.", msg),
        PE::Duplicate(msg) => format!("Duplicate column: {}", msg),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::OutOfBounds(msg) => format!("Index or row out of bounds: {}", msg),
        PE::ComputeError(msg) => simplify_compute_message(msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("No space left") || msg.contains("space left") {
                return "No space left on device. Free up disk space and try again.".to_string();
            }
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return if context.is_some() {
                format!("I/O error: {}", msg)
            } else {
                msg
            };
        }
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain looking for the crate's errors, then PolarsError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    let with_path = |msg: String| match path {
        Some(p) => format!("Failed to load {}: {}", p.display(), msg),
        None => msg,
    };
    for cause in report.chain() {
        if let Some(e) = cause.downcast_ref::<SchemaError>() {
            return user_message_from_schema(e);
        }
        if let Some(e) = cause.downcast_ref::<NotFoundError>() {
            return user_message_from_not_found(e);
        }
        if let Some(e) = cause.downcast_ref::<IngestError>() {
            return user_message_from_ingest(e);
        }
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return with_path(user_message_from_polars(pe));
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return with_path(user_message_from_io(io_err, None));
        }
    }

    // Fallback: first line of display to avoid long tracebacks
    let display = report.to_string();
    let first_line = display.lines().next().unwrap_or("An error occurred");
    with_path(first_line.trim().to_string())
}

/// Message for a chart that could not be written to `path`.
pub fn user_message_from_export(report: &color_eyre::eyre::Report, path: &Path) -> String {
    let io_cause = report
        .chain()
        .find_map(|cause| cause.downcast_ref::<io::Error>());
    let reason = match io_cause.map(io::Error::kind) {
        Some(io::ErrorKind::NotFound) => "The folder does not exist.".to_string(),
        Some(io::ErrorKind::PermissionDenied) => {
            "Permission denied. Check write access to the folder.".to_string()
        }
        Some(_) => io_cause
            .map(|e| user_message_from_io(e, None))
            .unwrap_or_default(),
        None => user_message_from_report(report, None),
    };
    format!("Failed to save chart to {}: {}", path.display(), reason)
}

/// Light cleanup for ComputeError messages: strip polars-internal phrasing.
fn simplify_compute_message(msg: &str) -> String {
    let msg = msg.trim();
    let msg = msg.strip_prefix("ComputeError:").unwrap_or(msg).trim();
    match msg.find("\n\nResolved plan") {
        Some(idx) => msg[..idx].trim_end().to_string(),
        None => msg.to_string(),
    }
}

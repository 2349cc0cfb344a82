//! Shared CLI definitions for insectui.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// File format for data files (used to bypass extension-based detection).
/// When `--format` is not specified, format is auto-detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FileFormat {
    /// Excel workbook (.xls, .xlsx, .xlsm, .xlsb)
    Excel,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Pipe-separated values
    Psv,
    /// Parquet columnar format
    Parquet,
}

impl FileFormat {
    /// Detect file format from path extension, looking through a compression suffix
    /// (`pests.csv.gz` is Csv). Returns None when the extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        if CompressionFormat::from_extension(path).is_some() {
            let stem = Path::new(path.file_stem()?);
            return stem
                .extension()
                .and_then(|e| e.to_str())
                .and_then(Self::from_extension);
        }
        Self::from_extension(ext)
    }

    /// Parse format from extension string (e.g. "xlsx", "csv").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "xls" | "xlsx" | "xlsm" | "xlsb" => Some(Self::Excel),
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "psv" => Some(Self::Psv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }

    /// Field separator for the delimited text formats.
    pub fn default_delimiter(&self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Psv => Some(b'|'),
            Self::Excel | Self::Parquet => None,
        }
    }
}

/// Compression format for delimited data files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz)
    Gzip,
    /// Zstandard compression (.zst)
    Zstd,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// XZ compression (.xz)
    Xz,
}

impl CompressionFormat {
    /// Compression implied by the last extension (`usage.csv.gz` is Gzip).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "gz" => Some(Self::Gzip),
            "zst" | "zstd" => Some(Self::Zstd),
            "bz2" | "bz" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }
}

/// Image format for `--export-chart`
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChartFormat {
    /// Portable Network Graphics (bitmap)
    Png,
    /// Encapsulated PostScript (vector)
    Eps,
}

/// Command-line arguments for insectui
#[derive(Clone, Parser, Debug)]
#[command(
    name = "insectui",
    version,
    about = "Insecticide usage explorer in the terminal",
    long_about = "Load a table of pests, insecticides, formulations and crops, narrow it \
                  down by pest, crop and insecticide, and see which products are used most.\n\n\
                  The table must contain the columns PEST, INSECTICIDE, Formulation and CROP \
                  (surrounding whitespace in headers is ignored)."
)]
pub struct Args {
    /// Path to the data file (Excel, CSV/TSV/PSV, optionally compressed, or Parquet).
    /// Optional in the interactive view: a file can also be opened from the File box.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Excel sheet to load: 0-based index (e.g. 0) or sheet name (e.g. "Sheet1")
    #[arg(long = "sheet", value_name = "SHEET")]
    pub excel_sheet: Option<String>,

    /// Force file format (excel, csv, tsv, psv, parquet).
    /// By default format is auto-detected from the file extension.
    #[arg(long = "format", value_enum)]
    pub format: Option<FileFormat>,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz)
    /// If not specified, compression is auto-detected from file extension.
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Specify the delimiter to use when reading a delimited text file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Specify that the file has no header
    #[arg(long = "no-header")]
    pub no_header: Option<bool>,

    /// Keep rows whose PEST contains this text (case-insensitive)
    #[arg(long = "pest", value_name = "TEXT")]
    pub pest: Option<String>,

    /// Keep rows whose CROP contains this text (case-insensitive)
    #[arg(long = "crop-contains", value_name = "TEXT")]
    pub crop_contains: Option<String>,

    /// Keep rows whose INSECTICIDE contains this text (case-insensitive)
    #[arg(long = "insecticide-contains", value_name = "TEXT")]
    pub insecticide_contains: Option<String>,

    /// Keep only rows for exactly this crop
    #[arg(long = "crop", value_name = "NAME")]
    pub crop: Option<String>,

    /// Keep only rows for exactly this insecticide
    #[arg(long = "insecticide", value_name = "NAME")]
    pub insecticide: Option<String>,

    /// Show all data regardless of the text filters
    #[arg(long = "show-all", action)]
    pub show_all: bool,

    /// Insecticide to show details for (default: first insecticide in the filtered rows)
    #[arg(long = "detail", value_name = "NAME")]
    pub detail: Option<String>,

    /// Print the filtered rows, insecticide details and usage counts, then exit
    #[arg(long = "report", action, requires = "path")]
    pub report: bool,

    /// With --report, print JSON instead of text
    #[arg(long = "json", action, requires = "report")]
    pub json: bool,

    /// Write the usage bar chart to FILE and exit
    #[arg(long = "export-chart", value_name = "FILE", requires = "path")]
    pub export_chart: Option<PathBuf>,

    /// Chart image format (default: from FILE extension, then config)
    #[arg(long = "chart-format", value_enum)]
    pub chart_format: Option<ChartFormat>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write logs to this file (the interactive view owns the terminal)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Generate default configuration file at ~/.config/insectui/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// `--long <VALUE>` or `[<PATH>]`, as shown in the usage table.
fn option_label(arg: &clap::Arg) -> String {
    let values = arg
        .get_value_names()
        .unwrap_or_default()
        .iter()
        .map(|name| format!("<{}>", name))
        .collect::<Vec<_>>()
        .join(" ");

    if arg.is_positional() {
        return if arg.is_required_set() {
            values
        } else {
            format!("[{}]", values)
        };
    }

    let mut label = [
        arg.get_short().map(|s| format!("-{}", s)),
        arg.get_long().map(|l| format!("--{}", l)),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");
    if arg.get_action().takes_values() && !values.is_empty() {
        label.push(' ');
        label.push_str(&values);
    }
    label
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::new();
    let _ = writeln!(out, "# Command Line Options\n");
    let _ = writeln!(out, "## Usage\n\n```\n{}\n```\n", cmd.render_usage());
    let _ = writeln!(out, "## Options\n");
    let _ = writeln!(out, "| Option | Description |");
    let _ = writeln!(out, "|--------|-------------|");

    for arg in cmd
        .get_arguments()
        .filter(|a| !matches!(a.get_id().as_str(), "help" | "version"))
    {
        // table cells can't hold pipes or line breaks
        let help = arg
            .get_help()
            .map(|h| h.to_string().replace('|', "\\|").replace(['\n', '\r'], " "))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "| `{}` | {} |", option_label(arg), help);
    }

    out
}

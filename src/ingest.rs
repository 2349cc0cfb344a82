//! File ingestion: Excel, delimited text (optionally compressed) and Parquet
//! into a raw polars `DataFrame`. Schema checks happen later in [`crate::schema`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::SchemaError;
use crate::schema::validate;
use crate::{CompressionFormat, FileFormat, OpenOptions};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot tell the file type of {} (use --format)", .path.display())]
    UnknownFormat { path: PathBuf },
    #[error("Excel: {0}")]
    Excel(String),
    #[error("Excel file has no worksheets")]
    NoWorksheets,
    #[error("Excel: no sheet {0}")]
    SheetNotFound(String),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Either stage of opening a file can fail; callers show the two differently.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Read `path` and validate it.
pub fn load_dataset(path: &Path, options: &OpenOptions) -> Result<Dataset, LoadError> {
    let raw = load_table(path, options)?;
    let dataset = validate(raw)?;
    info!(
        path = %path.display(),
        rows = dataset.height(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Read `path` into a raw frame. The format comes from `options.format` or
/// the file extension.
pub fn load_table(path: &Path, options: &OpenOptions) -> Result<DataFrame, IngestError> {
    if !path.exists() {
        return Err(IngestError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }
    let format = options
        .format
        .or_else(|| FileFormat::from_path(path))
        .ok_or_else(|| IngestError::UnknownFormat {
            path: path.to_path_buf(),
        })?;
    debug!(path = %path.display(), ?format, "reading table");

    match format {
        FileFormat::Excel => read_excel(path, options.excel_sheet.as_deref()),
        FileFormat::Parquet => read_parquet(path),
        FileFormat::Csv | FileFormat::Tsv | FileFormat::Psv => {
            let delimiter = options
                .delimiter
                .or(format.default_delimiter())
                .unwrap_or(b',');
            read_delimited(path, delimiter, options)
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> IngestError + '_ {
    move |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_options(delimiter: u8, options: &OpenOptions) -> CsvReadOptions {
    let mut read_options = CsvReadOptions::default();
    if let Some(has_header) = options.has_header {
        read_options.has_header = has_header;
    }
    read_options.map_parse_options(|opts| opts.with_separator(delimiter))
}

fn read_delimited(
    path: &Path,
    delimiter: u8,
    options: &OpenOptions,
) -> Result<DataFrame, IngestError> {
    let compression = options
        .compression
        .or_else(|| CompressionFormat::from_extension(path));
    let read_options = csv_options(delimiter, options);

    match compression {
        // polars decompresses these itself
        None | Some(CompressionFormat::Gzip) | Some(CompressionFormat::Zstd) => Ok(read_options
            .try_into_reader_with_file_path(Some(path.into()))?
            .finish()?),
        Some(CompressionFormat::Bzip2) => {
            let file = File::open(path).map_err(io_error(path))?;
            let decoder = bzip2::read::BzDecoder::new(BufReader::new(file));
            read_decoded(path, decoder, read_options)
        }
        Some(CompressionFormat::Xz) => {
            let file = File::open(path).map_err(io_error(path))?;
            let decoder = xz2::read::XzDecoder::new(BufReader::new(file));
            read_decoded(path, decoder, read_options)
        }
    }
}

fn read_decoded(
    path: &Path,
    mut decoder: impl Read,
    read_options: CsvReadOptions,
) -> Result<DataFrame, IngestError> {
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(io_error(path))?;
    Ok(CsvReader::new(Cursor::new(decompressed))
        .with_options(read_options)
        .finish()?)
}

fn read_parquet(path: &Path) -> Result<DataFrame, IngestError> {
    let file = File::open(path).map_err(io_error(path))?;
    Ok(ParquetReader::new(file).finish()?)
}

/// Sheet is selected by 0-based index or name; the first sheet by default.
fn read_excel(path: &Path, sheet: Option<&str>) -> Result<DataFrame, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Excel(e.to_string()))?;
    if workbook.sheet_names().is_empty() {
        return Err(IngestError::NoWorksheets);
    }
    let range = match sheet {
        Some(sel) => match sel.parse::<usize>() {
            Ok(idx) => workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| IngestError::SheetNotFound(format!("at index {}", idx)))?
                .map_err(|e| IngestError::Excel(e.to_string()))?,
            Err(_) => {
                if !workbook.sheet_names().iter().any(|name| name == sel) {
                    return Err(IngestError::SheetNotFound(format!("named '{}'", sel)));
                }
                workbook
                    .worksheet_range(sel)
                    .map_err(|e| IngestError::Excel(e.to_string()))?
            }
        },
        None => workbook
            .worksheet_range_at(0)
            .ok_or(IngestError::NoWorksheets)?
            .map_err(|e| IngestError::Excel(e.to_string()))?,
    };

    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    Ok(cells_to_frame(&rows)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellColumnType {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

/// Build a frame from spreadsheet rows; row 0 is the header.
fn cells_to_frame(rows: &[Vec<Data>]) -> PolarsResult<DataFrame> {
    let Some((header_row, body)) = rows.split_first() else {
        return DataFrame::new(vec![]);
    };
    let headers = unique_headers(header_row);
    let mut columns = Vec::with_capacity(headers.len());
    for (col_idx, name) in headers.iter().enumerate() {
        let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(col_idx)).collect();
        let series = cells_to_series(name, &cells, infer_cell_type(&cells));
        columns.push(series.into());
    }
    DataFrame::new(columns)
}

/// Header text per column. Blank headers become `column_N`; repeated headers
/// get a `.N` suffix so the frame can be built and the validator can report them.
fn unique_headers(row: &[Data]) -> Vec<String> {
    use calamine::DataType as CalamineTrait;
    let mut counts: HashMap<String, usize> = HashMap::new();
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let text = if CalamineTrait::is_empty(cell) {
                String::new()
            } else {
                CalamineTrait::as_string(cell).unwrap_or_else(|| cell.to_string())
            };
            let base = if text.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                text
            };
            let seen = counts.entry(base.clone()).or_insert(0);
            *seen += 1;
            if *seen == 1 {
                base
            } else {
                format!("{}.{}", base, *seen - 1)
            }
        })
        .collect()
}

fn infer_cell_type(cells: &[Option<&Data>]) -> CellColumnType {
    use calamine::DataType as CalamineTrait;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    for cell in cells.iter().flatten() {
        if CalamineTrait::is_empty(*cell) {
            continue;
        }
        if CalamineTrait::is_int(*cell) {
            has_int = true;
        } else if CalamineTrait::is_float(*cell) {
            has_float = true;
        } else if CalamineTrait::is_bool(*cell) {
            has_bool = true;
        } else {
            return CellColumnType::Utf8;
        }
    }
    match (has_int, has_float, has_bool) {
        (_, _, true) if has_int || has_float => CellColumnType::Utf8,
        (false, false, true) => CellColumnType::Boolean,
        (_, true, _) => {
            let all_whole = cells.iter().flatten().all(|cell| {
                cell.as_f64()
                    .is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
            });
            if all_whole {
                CellColumnType::Int64
            } else {
                CellColumnType::Float64
            }
        }
        (true, false, false) => CellColumnType::Int64,
        _ => CellColumnType::Utf8,
    }
}

fn cells_to_series<'a>(name: &str, cells: &[Option<&'a Data>], col_type: CellColumnType) -> Series {
    use calamine::DataType as CalamineTrait;
    let present = |c: &Option<&'a Data>| -> Option<&'a Data> { c.filter(|cell| !CalamineTrait::is_empty(*cell)) };
    match col_type {
        CellColumnType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| present(c).and_then(|cell| cell.as_i64()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColumnType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| present(c).and_then(|cell| cell.as_f64()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColumnType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| present(c).and_then(|cell| cell.get_bool()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColumnType::Utf8 => {
            let v: Vec<Option<String>> = cells
                .iter()
                .map(|c| {
                    present(c).map(|cell| {
                        CalamineTrait::as_string(cell).unwrap_or_else(|| cell.to_string())
                    })
                })
                .collect();
            Series::new(name.into(), v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_cells_to_frame_uses_first_row_as_header() {
        let rows = vec![
            vec![s(" PEST"), s("INSECTICIDE"), s("Formulation"), s("CROP")],
            vec![s("Aphid"), s("Imidacloprid"), s("SC"), s("Cotton")],
            vec![s("Mite"), Data::Empty, s("EC"), s("Rice")],
        ];
        let df = cells_to_frame(&rows).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.get_column_names()[0].as_str(), " PEST");
        let insecticides = df.column("INSECTICIDE").unwrap().str().unwrap();
        assert_eq!(insecticides.get(1), None);
    }

    #[test]
    fn test_unique_headers_fills_blanks_and_repeats() {
        let headers = unique_headers(&[s("PEST"), Data::Empty, s("PEST")]);
        assert_eq!(headers, vec!["PEST", "column_2", "PEST.1"]);
    }

    #[test]
    fn test_infer_whole_floats_as_int() {
        let a = Data::Float(10.0);
        let b = Data::Float(20.0);
        let cells = vec![Some(&a), None, Some(&b)];
        assert_eq!(infer_cell_type(&cells), CellColumnType::Int64);
        let c = Data::Float(2.5);
        assert_eq!(infer_cell_type(&[Some(&c)]), CellColumnType::Float64);
    }

    #[test]
    fn test_mixed_cells_become_text() {
        let a = Data::Int(1);
        let b = s("WP");
        assert_eq!(infer_cell_type(&[Some(&a), Some(&b)]), CellColumnType::Utf8);
        let series = cells_to_series("Formulation", &[Some(&a), Some(&b)], CellColumnType::Utf8);
        let values = series.str().unwrap();
        assert_eq!(values.get(0), Some("1"));
        assert_eq!(values.get(1), Some("WP"));
    }

    #[test]
    fn test_empty_sheet_gives_empty_frame() {
        assert_eq!(cells_to_frame(&[]).unwrap().width(), 0);
    }
}

//! Schema validation: turns an arbitrary ingested frame into a [`Dataset`].

use std::collections::HashSet;

use polars::prelude::*;

use crate::dataset::{Dataset, REQUIRED_COLUMNS};
use crate::error::SchemaError;

/// Validate a raw table and normalize it into a [`Dataset`].
///
/// Header names are trimmed of surrounding whitespace (case is kept). The four
/// required columns are cast to strings so spreadsheet numbers compare as
/// text; other columns pass through unchanged. Validating an already
/// validated frame yields the same dataset.
pub fn validate(raw: DataFrame) -> Result<Dataset, SchemaError> {
    let trimmed: Vec<String> = raw
        .get_column_names()
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !trimmed.iter().any(|name| name == *required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { missing });
    }

    // only the required names must be unique; extra columns are renamed instead
    for required in REQUIRED_COLUMNS {
        if trimmed.iter().filter(|name| *name == required).count() > 1 {
            return Err(SchemaError::DuplicateColumn {
                name: required.to_string(),
            });
        }
    }

    let mut used: HashSet<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut columns = Vec::with_capacity(trimmed.len());
    for (column, name) in raw.get_columns().iter().zip(&trimmed) {
        if REQUIRED_COLUMNS.contains(&name.as_str()) {
            columns.push(as_text(column.clone().with_name(name.as_str().into()))?);
            continue;
        }
        let name = passthrough_name(name, column.name().as_str(), &used);
        used.insert(name.clone());
        columns.push(column.clone().with_name(name.as_str().into()));
    }

    let df = DataFrame::new(columns).map_err(|e| SchemaError::Malformed {
        reason: e.to_string(),
    })?;
    Ok(Dataset::from_validated(df))
}

/// Name for an extra column: the trimmed header, else the header as written,
/// else the trimmed header with a `.N` suffix.
fn passthrough_name(trimmed: &str, original: &str, used: &HashSet<String>) -> String {
    if !used.contains(trimmed) {
        return trimmed.to_string();
    }
    if !used.contains(original) {
        return original.to_string();
    }
    (1..)
        .map(|n| format!("{}.{}", trimmed, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| original.to_string())
}

fn as_text(column: Column) -> Result<Column, SchemaError> {
    match column.dtype() {
        DataType::String => Ok(column),
        DataType::List(_) => Err(SchemaError::UnsupportedColumnType {
            column: column.name().to_string(),
            dtype: column.dtype().to_string(),
        }),
        dtype => column
            .cast(&DataType::String)
            .map_err(|_| SchemaError::UnsupportedColumnType {
                column: column.name().to_string(),
                dtype: dtype.to_string(),
            }),
    }
}

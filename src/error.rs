//! Typed errors raised by the filter-and-aggregate pipeline.

use polars::prelude::PolarsError;
use thiserror::Error;

/// The loaded table cannot be used as a pest/insecticide dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Required columns absent after trimming header whitespace.
    #[error("missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("column '{name}' appears more than once after trimming header whitespace")]
    DuplicateColumn { name: String },
    #[error("column '{column}' has type {dtype}, which cannot be read as text")]
    UnsupportedColumnType { column: String, dtype: String },
    #[error("table could not be assembled: {reason}")]
    Malformed { reason: String },
}

impl SchemaError {
    /// Missing column names, empty for the other variants.
    pub fn missing_columns(&self) -> &[String] {
        match self {
            SchemaError::MissingColumns { missing } => missing,
            _ => &[],
        }
    }
}

/// An insecticide was asked for that the current view does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("insecticide '{insecticide}' is not present in the filtered rows")]
pub struct NotFoundError {
    pub insecticide: String,
}

/// Failure of one whole pipeline call. No partial results accompany it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("data engine error: {0}")]
    Polars(#[from] PolarsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_names_each_column() {
        let err = SchemaError::MissingColumns {
            missing: vec!["Formulation".to_string(), "CROP".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required column(s): Formulation, CROP"
        );
        assert_eq!(err.missing_columns().len(), 2);
    }

    #[test]
    fn test_not_found_converts_to_pipeline_error() {
        let err: PipelineError = NotFoundError {
            insecticide: "DDT".to_string(),
        }
        .into();
        assert!(matches!(err, PipelineError::NotFound(_)));
        assert!(err.to_string().contains("DDT"));
    }
}

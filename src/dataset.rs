//! Validated tables and the views the filter chain produces from them.

use polars::prelude::*;
use serde::Serialize;

pub const PEST: &str = "PEST";
pub const INSECTICIDE: &str = "INSECTICIDE";
pub const FORMULATION: &str = "Formulation";
pub const CROP: &str = "CROP";

/// Required column names, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 4] = [PEST, INSECTICIDE, FORMULATION, CROP];

/// Column order used by the results table and text report.
pub const DISPLAY_COLUMNS: [&str; 4] = [CROP, PEST, INSECTICIDE, FORMULATION];

/// One row of the source table, reduced to the four fields the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub pest: Option<String>,
    pub insecticide: Option<String>,
    pub formulation: Option<String>,
    pub crop: Option<String>,
}

impl Record {
    /// Field value by column name, for the table widgets.
    pub fn field(&self, column: &str) -> Option<&str> {
        match column {
            PEST => self.pest.as_deref(),
            INSECTICIDE => self.insecticide.as_deref(),
            FORMULATION => self.formulation.as_deref(),
            CROP => self.crop.as_deref(),
            _ => None,
        }
    }
}

/// A table that has passed schema validation.
///
/// Only [`crate::schema::validate`] constructs one, so the four required
/// columns are always present and typed as strings. Extra columns ride along
/// untouched.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    pub(crate) fn from_validated(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// The whole dataset as a view (what "show all" produces).
    pub fn as_view(&self) -> FilteredView {
        FilteredView::new(self.df.clone())
    }

    /// A zero-row view with this dataset's schema.
    pub fn empty_view(&self) -> FilteredView {
        FilteredView::new(self.df.clear())
    }

    pub fn records(&self) -> PolarsResult<Vec<Record>> {
        records_in(&self.df, 0, self.df.height())
    }
}

/// Rows of a [`Dataset`] that survived the filter chain, in source order.
#[derive(Debug, Clone)]
pub struct FilteredView {
    df: DataFrame,
}

impl FilteredView {
    pub(crate) fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn records(&self) -> PolarsResult<Vec<Record>> {
        records_in(&self.df, 0, self.df.height())
    }

    /// Records `offset..offset + len`, clamped to the view. Used for paging the table.
    pub fn records_range(&self, offset: usize, len: usize) -> PolarsResult<Vec<Record>> {
        records_in(&self.df, offset, len)
    }

    /// Distinct non-null values of `column`, sorted ascending.
    pub fn distinct_sorted(&self, column: &str) -> PolarsResult<Vec<String>> {
        let values = self.df.column(column)?.str()?;
        let set: std::collections::BTreeSet<&str> = values.into_iter().flatten().collect();
        Ok(set.into_iter().map(str::to_string).collect())
    }
}

fn records_in(df: &DataFrame, offset: usize, len: usize) -> PolarsResult<Vec<Record>> {
    let end = offset.saturating_add(len).min(df.height());
    if offset >= end {
        return Ok(Vec::new());
    }
    let pests = df.column(PEST)?.str()?;
    let insecticides = df.column(INSECTICIDE)?.str()?;
    let formulations = df.column(FORMULATION)?.str()?;
    let crops = df.column(CROP)?.str()?;

    let owned = |v: Option<&str>| v.map(str::to_string);
    Ok((offset..end)
        .map(|i| Record {
            pest: owned(pests.get(i)),
            insecticide: owned(insecticides.get(i)),
            formulation: owned(formulations.get(i)),
            crop: owned(crops.get(i)),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;

    fn sample() -> Dataset {
        let df = df!(
            PEST => [Some("Aphid"), Some("Thrips"), None],
            INSECTICIDE => [Some("Imidacloprid"), Some("Spinosad"), Some("Imidacloprid")],
            FORMULATION => [Some("SC"), None, Some("SC")],
            CROP => [Some("Cotton"), Some("Rice"), Some("Cotton")],
            "Dose" => [1.5, 2.0, 3.0]
        )
        .unwrap();
        validate(df).unwrap()
    }

    #[test]
    fn test_records_preserve_nulls_and_order() {
        let records = sample().records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].pest.as_deref(), Some("Aphid"));
        assert_eq!(records[1].formulation, None);
        assert_eq!(records[2].pest, None);
    }

    #[test]
    fn test_records_range_clamps() {
        let view = sample().as_view();
        assert_eq!(view.records_range(1, 10).unwrap().len(), 2);
        assert!(view.records_range(5, 2).unwrap().is_empty());
    }

    #[test]
    fn test_distinct_sorted_skips_nulls() {
        let view = sample().as_view();
        assert_eq!(
            view.distinct_sorted(CROP).unwrap(),
            vec!["Cotton".to_string(), "Rice".to_string()]
        );
        assert_eq!(view.distinct_sorted(PEST).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_view_keeps_schema() {
        let dataset = sample();
        let empty = dataset.empty_view();
        assert!(empty.is_empty());
        assert_eq!(empty.frame().width(), dataset.frame().width());
    }

    #[test]
    fn test_record_field_lookup() {
        let record = &sample().records().unwrap()[0];
        assert_eq!(record.field(CROP), Some("Cotton"));
        assert_eq!(record.field("Dose"), None);
    }
}

//! Usage counts per (insecticide, formulation) pair, ordered for a bar chart.

use polars::prelude::*;
use serde::Serialize;

use crate::dataset::{FilteredView, FORMULATION, INSECTICIDE};
use crate::error::PipelineError;

const COUNT: &str = "count";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRow {
    pub insecticide: String,
    pub formulation: String,
    pub label: String,
    pub count: u64,
}

impl FrequencyRow {
    pub fn new(insecticide: impl Into<String>, formulation: impl Into<String>, count: u64) -> Self {
        let insecticide = insecticide.into();
        let formulation = formulation.into();
        Self {
            label: frequency_label(&insecticide, &formulation),
            insecticide,
            formulation,
            count,
        }
    }
}

/// Display label, e.g. `Imidacloprid (SC)`.
pub fn frequency_label(insecticide: &str, formulation: &str) -> String {
    format!("{} ({})", insecticide, formulation)
}

/// Group `view` by (insecticide, formulation) and count rows.
///
/// Rows with a null key are skipped. Groups come out in first-encounter order
/// and are then stably sorted ascending by count, so ties keep that order.
pub fn aggregate(view: &FilteredView) -> Result<Vec<FrequencyRow>, PipelineError> {
    let counts = view
        .frame()
        .clone()
        .lazy()
        .filter(
            col(INSECTICIDE)
                .is_not_null()
                .and(col(FORMULATION).is_not_null()),
        )
        .group_by_stable([col(INSECTICIDE), col(FORMULATION)])
        .agg([len().alias(COUNT)])
        .sort_by_exprs(
            vec![col(COUNT)],
            SortMultipleOptions {
                maintain_order: true,
                ..Default::default()
            },
        )
        .collect()?;

    let insecticides = counts.column(INSECTICIDE)?.str()?;
    let formulations = counts.column(FORMULATION)?.str()?;
    let count_col = counts.column(COUNT)?.cast(&DataType::UInt64)?;
    let count_values = count_col.u64()?;

    let mut rows = Vec::with_capacity(counts.height());
    for i in 0..counts.height() {
        if let (Some(insecticide), Some(formulation), Some(count)) = (
            insecticides.get(i),
            formulations.get(i),
            count_values.get(i),
        ) {
            rows.push(FrequencyRow::new(insecticide, formulation, count));
        }
    }
    Ok(rows)
}

//! Detail resolution for a single insecticide within a filtered view.

use std::collections::{BTreeSet, HashSet};

use polars::prelude::*;
use serde::Serialize;

use crate::dataset::{FilteredView, FORMULATION, INSECTICIDE, PEST};
use crate::error::{NotFoundError, PipelineError};
use crate::filter::Predicate;

/// Formulation and target pests of one insecticide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailSelection {
    pub insecticide: String,
    /// Formulation of the first matching row in view order. If an insecticide
    /// appears with several formulations only that first one is reported.
    pub formulation: Option<String>,
    pub pests: BTreeSet<String>,
}

impl DetailSelection {
    pub fn pests_joined(&self) -> String {
        self.pests.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Resolve the details of `insecticide` (exact match) within `view`.
pub fn resolve_detail(
    view: &FilteredView,
    insecticide: &str,
) -> Result<DetailSelection, PipelineError> {
    let matches = view
        .frame()
        .clone()
        .lazy()
        .filter(Predicate::equals(INSECTICIDE, insecticide).expr())
        .collect()?;
    if matches.height() == 0 {
        return Err(NotFoundError {
            insecticide: insecticide.to_string(),
        }
        .into());
    }

    let formulation = matches
        .column(FORMULATION)?
        .str()?
        .get(0)
        .map(str::to_string);
    let pests = matches
        .column(PEST)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    Ok(DetailSelection {
        insecticide: insecticide.to_string(),
        formulation,
        pests,
    })
}

/// Distinct non-null insecticides in `view`, in order of first appearance.
pub fn detail_options(view: &FilteredView) -> Result<Vec<String>, PipelineError> {
    let insecticides = view.frame().column(INSECTICIDE)?.str()?;
    let mut seen = HashSet::new();
    Ok(insecticides
        .into_iter()
        .flatten()
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect())
}

//! One call per interaction: filter, then detail and frequency, plus the
//! classification of what to show when something comes out empty.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::dataset::Dataset;
use crate::detail::{detail_options, resolve_detail, DetailSelection};
use crate::error::{NotFoundError, PipelineError};
use crate::filter::{apply_staged, FilterSpec, StagedView};
use crate::frequency::{aggregate, FrequencyRow};

/// Which insecticide the detail panel should describe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailChoice {
    /// The first insecticide in the view.
    #[default]
    First,
    /// This one if the view still has it, otherwise the first.
    Prefer(String),
    /// Exactly this one; absence is reported as [`NotFoundError`].
    Exact(String),
}

/// Data states that are not errors but leave a panel with nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoFile,
    NoCriteria,
    NoMatches,
    NoMatchesAfterSelection,
    NoDetailSelected,
    NothingToChart,
}

/// Everything the presentation layer renders for one set of inputs.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub spec: FilterSpec,
    pub staged: StagedView,
    pub detail_options: Vec<String>,
    /// `None` when the view has no insecticides to describe.
    pub detail: Option<Result<DetailSelection, NotFoundError>>,
    pub frequencies: Vec<FrequencyRow>,
    pub elapsed: Duration,
}

impl Snapshot {
    /// Why the results table is empty, if it is.
    pub fn table_state(&self) -> Option<EmptyState> {
        if !self.spec.has_criteria() {
            Some(EmptyState::NoCriteria)
        } else if self.staged.matched.is_empty() {
            Some(EmptyState::NoMatches)
        } else if self.staged.view.is_empty() {
            Some(EmptyState::NoMatchesAfterSelection)
        } else {
            None
        }
    }

    pub fn detail_state(&self) -> Option<EmptyState> {
        self.table_state().or(match self.detail {
            None => Some(EmptyState::NoDetailSelected),
            Some(_) => None,
        })
    }

    pub fn chart_state(&self) -> Option<EmptyState> {
        self.table_state().or(if self.frequencies.is_empty() {
            Some(EmptyState::NothingToChart)
        } else {
            None
        })
    }

    pub fn resolved_detail(&self) -> Option<&DetailSelection> {
        self.detail.as_ref().and_then(|d| d.as_ref().ok())
    }
}

/// A loaded dataset and where it came from. Replaced wholesale on the next load.
#[derive(Debug, Clone)]
pub struct Session {
    pub source: PathBuf,
    pub dataset: Dataset,
}

impl Session {
    pub fn new(source: impl Into<PathBuf>, dataset: Dataset) -> Self {
        Self {
            source: source.into(),
            dataset,
        }
    }

    pub fn evaluate(
        &self,
        spec: &FilterSpec,
        choice: &DetailChoice,
    ) -> Result<Snapshot, PipelineError> {
        evaluate(&self.dataset, spec, choice)
    }

    /// File name for titles, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Run the whole pipeline for `spec` against `dataset`.
pub fn evaluate(
    dataset: &Dataset,
    spec: &FilterSpec,
    choice: &DetailChoice,
) -> Result<Snapshot, PipelineError> {
    let started = Instant::now();
    let staged = apply_staged(dataset, spec)?;
    let options = detail_options(&staged.view)?;

    let identity = match choice {
        DetailChoice::First => options.first().cloned(),
        DetailChoice::Prefer(name) => options
            .iter()
            .find(|o| *o == name)
            .or(options.first())
            .cloned(),
        DetailChoice::Exact(name) => Some(name.clone()),
    };
    let detail = match identity {
        Some(name) => match resolve_detail(&staged.view, &name) {
            Ok(d) => Some(Ok(d)),
            Err(PipelineError::NotFound(e)) => Some(Err(e)),
            Err(other) => return Err(other),
        },
        None => None,
    };

    let frequencies = aggregate(&staged.view)?;
    Ok(Snapshot {
        spec: spec.clone(),
        staged,
        detail_options: options,
        detail,
        frequencies,
        elapsed: started.elapsed(),
    })
}

//! The predicate filter chain.
//!
//! A [`FilterSpec`] is turned into an ordered list of [`Predicate`]s that are
//! AND-ed together and run through a polars lazy filter. Text predicates match
//! case-insensitively on a contiguous substring; dropdown predicates match
//! exactly. Null fields never satisfy either.

use std::fmt;

use polars::prelude::*;

use crate::dataset::{Dataset, FilteredView, CROP, INSECTICIDE, PEST};
use crate::error::PipelineError;

/// A dropdown selection. `All` disables the predicate, so a crop actually
/// named "All" stays selectable as `Only("All")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(value.into())
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// This selection if `options` still offers it, otherwise `All`.
    pub fn retain_in(&self, options: &[String]) -> Selection {
        match self {
            Selection::Only(v) if options.iter().any(|o| o == v) => self.clone(),
            _ => Selection::All,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "All"),
            Selection::Only(v) => write!(f, "{}", v),
        }
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        value.map(Selection::Only).unwrap_or_default()
    }
}

/// User criteria for one interaction. Rebuilt from the inputs every time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub show_all: bool,
    pub pest_substring: Option<String>,
    pub crop_substring: Option<String>,
    pub insecticide_substring: Option<String>,
    pub crop_exact: Selection,
    pub insecticide_exact: Selection,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    pub fn with_pest(mut self, text: impl Into<String>) -> Self {
        self.pest_substring = Some(text.into());
        self
    }

    pub fn with_crop_contains(mut self, text: impl Into<String>) -> Self {
        self.crop_substring = Some(text.into());
        self
    }

    pub fn with_insecticide_contains(mut self, text: impl Into<String>) -> Self {
        self.insecticide_substring = Some(text.into());
        self
    }

    pub fn with_crop(mut self, selection: Selection) -> Self {
        self.crop_exact = selection;
        self
    }

    pub fn with_insecticide(mut self, selection: Selection) -> Self {
        self.insecticide_exact = selection;
        self
    }

    /// Active substring predicates in chain order. Empty text counts as absent.
    pub fn text_predicates(&self) -> Vec<Predicate> {
        [
            (PEST, &self.pest_substring),
            (CROP, &self.crop_substring),
            (INSECTICIDE, &self.insecticide_substring),
        ]
        .into_iter()
        .filter_map(|(column, text)| {
            text.as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| Predicate::contains(column, t))
        })
        .collect()
    }

    pub fn crop_predicate(&self) -> Option<Predicate> {
        self.crop_exact.value().map(|v| Predicate::equals(CROP, v))
    }

    pub fn insecticide_predicate(&self) -> Option<Predicate> {
        self.insecticide_exact
            .value()
            .map(|v| Predicate::equals(INSECTICIDE, v))
    }

    /// The full chain (excluding the show-all bypass) in application order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut chain = self.text_predicates();
        chain.extend(self.crop_predicate());
        chain.extend(self.insecticide_predicate());
        chain
    }

    /// True when the text stage can produce rows at all.
    pub fn has_criteria(&self) -> bool {
        self.show_all || !self.text_predicates().is_empty()
    }
}

/// One named row predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Contains { column: &'static str, needle: String },
    Equals { column: &'static str, value: String },
}

impl Predicate {
    pub fn contains(column: &'static str, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            column,
            needle: needle.into(),
        }
    }

    pub fn equals(column: &'static str, value: impl Into<String>) -> Self {
        Predicate::Equals {
            column,
            value: value.into(),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Predicate::Contains { column, .. } | Predicate::Equals { column, .. } => column,
        }
    }

    /// Polars expression for this predicate. Null cells evaluate to null,
    /// which the filter treats as false.
    pub fn expr(&self) -> Expr {
        match self {
            Predicate::Contains { column, needle } => col(*column)
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(needle.to_lowercase())),
            Predicate::Equals { column, value } => col(*column).eq(lit(value.clone())),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Contains { column, needle } => write!(f, "{} contains '{}'", column, needle),
            Predicate::Equals { column, value } => write!(f, "{} = '{}'", column, value),
        }
    }
}

/// Run `predicates` AND-ed together over `df`. An empty chain keeps every row.
fn run_chain(df: &DataFrame, predicates: &[Predicate]) -> PolarsResult<DataFrame> {
    let Some(combined) = predicates
        .iter()
        .map(Predicate::expr)
        .reduce(|acc, expr| acc.and(expr))
    else {
        return Ok(df.clone());
    };
    df.clone().lazy().filter(combined).collect()
}

/// Narrow `dataset` by `spec`.
///
/// Show-all returns the whole dataset and ignores every other field. Without
/// show-all and without any text criteria the view is empty.
pub fn apply(dataset: &Dataset, spec: &FilterSpec) -> Result<FilteredView, PipelineError> {
    if spec.show_all {
        return Ok(dataset.as_view());
    }
    if !spec.has_criteria() {
        return Ok(dataset.empty_view());
    }
    let df = run_chain(dataset.frame(), &spec.predicates())?;
    Ok(FilteredView::new(df))
}

/// Result of [`apply_staged`]: the final view plus what each dropdown may offer.
#[derive(Debug, Clone)]
pub struct StagedView {
    /// Rows after the show-all / text stage.
    pub matched: FilteredView,
    /// Crop values present in `matched`.
    pub crop_options: Vec<String>,
    /// Insecticide values present after the crop selection.
    pub insecticide_options: Vec<String>,
    /// Same rows as [`apply`] returns for the same `FilterSpec`.
    pub view: FilteredView,
}

/// Like [`apply`], but also exposes the stages the dropdowns are built from.
pub fn apply_staged(dataset: &Dataset, spec: &FilterSpec) -> Result<StagedView, PipelineError> {
    let matched = if spec.show_all {
        dataset.as_view()
    } else if spec.has_criteria() {
        FilteredView::new(run_chain(dataset.frame(), &spec.text_predicates())?)
    } else {
        dataset.empty_view()
    };
    let crop_options = crop_options(&matched)?;

    if spec.show_all {
        let insecticide_options = insecticide_options(&matched)?;
        return Ok(StagedView {
            view: matched.clone(),
            matched,
            crop_options,
            insecticide_options,
        });
    }

    let cropped = match spec.crop_predicate() {
        Some(p) => FilteredView::new(run_chain(matched.frame(), &[p])?),
        None => matched.clone(),
    };
    let insecticide_options = insecticide_options(&cropped)?;
    let view = match spec.insecticide_predicate() {
        Some(p) => FilteredView::new(run_chain(cropped.frame(), &[p])?),
        None => cropped,
    };

    Ok(StagedView {
        matched,
        crop_options,
        insecticide_options,
        view,
    })
}

/// Distinct non-null crops in `view`, sorted ascending.
pub fn crop_options(view: &FilteredView) -> Result<Vec<String>, PipelineError> {
    Ok(view.distinct_sorted(CROP)?)
}

/// Distinct non-null insecticides in `view`, sorted ascending.
pub fn insecticide_options(view: &FilteredView) -> Result<Vec<String>, PipelineError> {
    Ok(view.distinct_sorted(INSECTICIDE)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FORMULATION;
    use crate::schema::validate;

    fn sample() -> Dataset {
        let df = df!(
            PEST => [Some("Green Aphid"), Some("Thrips"), Some("aphid"), None, Some("Mite")],
            INSECTICIDE => [Some("Imidacloprid"), Some("Spinosad"), Some("Malathion"), Some("Imidacloprid"), Some("Abamectin")],
            FORMULATION => [Some("SC"), Some("SC"), Some("EC"), Some("SC"), Some("EC")],
            CROP => [Some("Cotton"), Some("Rice"), Some("All"), Some("Cotton"), None]
        )
        .unwrap();
        validate(df).unwrap()
    }

    fn pests(view: &FilteredView) -> Vec<Option<String>> {
        view.records().unwrap().into_iter().map(|r| r.pest).collect()
    }

    #[test]
    fn test_empty_substring_counts_as_absent() {
        let spec = FilterSpec::new().with_pest("");
        assert!(!spec.has_criteria());
        assert!(spec.predicates().is_empty());
        assert!(apply(&sample(), &spec).unwrap().is_empty());
    }

    #[test]
    fn test_pest_substring_is_case_insensitive() {
        let view = apply(&sample(), &FilterSpec::new().with_pest("APHID")).unwrap();
        assert_eq!(
            pests(&view),
            vec![Some("Green Aphid".to_string()), Some("aphid".to_string())]
        );
    }

    #[test]
    fn test_null_never_matches() {
        let view = apply(&sample(), &FilterSpec::new().with_crop_contains("o")).unwrap();
        // Cotton twice (one with a null pest); the null crop row is dropped.
        assert_eq!(view.height(), 2);
    }

    #[test]
    fn test_exact_crop_named_all_is_selectable() {
        let spec = FilterSpec::new()
            .with_pest("a")
            .with_crop(Selection::only("All"));
        let view = apply(&sample(), &spec).unwrap();
        assert_eq!(pests(&view), vec![Some("aphid".to_string())]);
    }

    #[test]
    fn test_show_all_ignores_other_fields() {
        let spec = FilterSpec::new()
            .with_show_all(true)
            .with_pest("zzz")
            .with_crop(Selection::only("Rice"));
        assert_eq!(apply(&sample(), &spec).unwrap().height(), 5);
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let spec = FilterSpec::new()
            .with_pest("i")
            .with_insecticide(Selection::only("imidacloprid"));
        assert!(apply(&sample(), &spec).unwrap().is_empty());
    }

    #[test]
    fn test_staged_options_follow_stages() {
        let spec = FilterSpec::new()
            .with_pest("i")
            .with_crop(Selection::only("Cotton"));
        let staged = apply_staged(&sample(), &spec).unwrap();
        // "i" matches Green Aphid, Thrips, aphid, Mite
        assert_eq!(staged.matched.height(), 4);
        assert_eq!(
            staged.crop_options,
            vec!["All".to_string(), "Cotton".to_string(), "Rice".to_string()]
        );
        assert_eq!(staged.insecticide_options, vec!["Imidacloprid".to_string()]);
        assert_eq!(staged.view.height(), 1);
        assert_eq!(
            staged.view.height(),
            apply(&sample(), &spec).unwrap().height()
        );
    }

    #[test]
    fn test_selection_retain_in() {
        let options = vec!["Cotton".to_string()];
        assert_eq!(
            Selection::only("Cotton").retain_in(&options),
            Selection::only("Cotton")
        );
        assert_eq!(Selection::only("Rice").retain_in(&options), Selection::All);
        assert_eq!(Selection::All.to_string(), "All");
    }

    #[test]
    fn test_predicate_chain_order_and_names() {
        let spec = FilterSpec::new()
            .with_insecticide_contains("cid")
            .with_pest("aph")
            .with_insecticide(Selection::only("Imidacloprid"))
            .with_crop(Selection::only("Cotton"));
        let names: Vec<String> = spec.predicates().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "PEST contains 'aph'",
                "INSECTICIDE contains 'cid'",
                "CROP = 'Cotton'",
                "INSECTICIDE = 'Imidacloprid'",
            ]
        );
    }
}

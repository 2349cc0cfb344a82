use insectui::dataset::{CROP, FORMULATION, INSECTICIDE, PEST};
use insectui::detail::resolve_detail;
use insectui::filter::apply;
use insectui::frequency::aggregate;
use insectui::schema::validate;
use insectui::{evaluate, DetailChoice, EmptyState, FilterSpec, SchemaError, Selection};
use polars::prelude::*;

mod common;

#[test]
fn test_validate_is_idempotent_on_clean_tables() {
    let dataset = common::usage_dataset();
    let again = validate(dataset.frame().clone()).unwrap();
    assert_eq!(again.height(), dataset.height());
    assert!(again.frame().equals_missing(dataset.frame()));
}

#[test]
fn test_header_whitespace_is_trimmed() {
    let df = df!(
        " PEST " => ["Aphid"],
        "INSECTICIDE" => ["Imidacloprid"],
        "Formulation" => ["SC"],
        "CROP" => ["Cotton"]
    )
    .unwrap();
    let dataset = validate(df).unwrap();
    assert!(dataset.column_names().iter().any(|c| c == PEST));
}

#[test]
fn test_missing_crop_is_named_exactly() {
    let df = df!(
        "PEST" => ["Aphid"],
        "INSECTICIDE" => ["Imidacloprid"],
        "Formulation" => ["SC"]
    )
    .unwrap();
    let err = validate(df).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingColumns {
            missing: vec![CROP.to_string()]
        }
    );
}

#[test]
fn test_exact_predicates_never_grow_the_view() {
    let dataset = common::usage_dataset();
    let bases = [
        FilterSpec::new().with_pest("aphid"),
        FilterSpec::new().with_crop_contains("o"),
        FilterSpec::new().with_insecticide_contains("i"),
    ];
    for base in bases {
        let before = apply(&dataset, &base).unwrap().height();
        for crop in ["Cotton", "Rice", "Tomato", "Wheat"] {
            let narrowed = base.clone().with_crop(Selection::only(crop));
            assert!(apply(&dataset, &narrowed).unwrap().height() <= before);
        }
        for insecticide in ["Imidacloprid", "Malathion", "Unknown"] {
            let narrowed = base.clone().with_insecticide(Selection::only(insecticide));
            assert!(apply(&dataset, &narrowed).unwrap().height() <= before);
        }
    }
}

#[test]
fn test_show_all_dominates_every_other_field() {
    let dataset = common::usage_dataset();
    let spec = FilterSpec::new()
        .with_show_all(true)
        .with_pest("no such pest")
        .with_crop_contains("zzz")
        .with_crop(Selection::only("Rice"))
        .with_insecticide(Selection::only("Malathion"));
    let view = apply(&dataset, &spec).unwrap();
    assert!(view.frame().equals_missing(dataset.frame()));
}

#[test]
fn test_no_criteria_gives_empty_view() {
    let dataset = common::usage_dataset();
    let view = apply(&dataset, &FilterSpec::new()).unwrap();
    assert!(view.is_empty());

    // dropdowns alone are not criteria
    let spec = FilterSpec::new().with_crop(Selection::only("Cotton"));
    assert!(apply(&dataset, &spec).unwrap().is_empty());
}

#[test]
fn test_substring_match_ignores_case() {
    let dataset = common::usage_dataset();
    let lower = apply(&dataset, &FilterSpec::new().with_pest("aph")).unwrap();
    let upper = apply(&dataset, &FilterSpec::new().with_pest("APH")).unwrap();
    assert_eq!(lower.height(), 3);
    assert!(lower.frame().equals_missing(upper.frame()));
}

#[test]
fn test_aggregation_literal_example() {
    let df = df!(
        PEST => ["Aphid", "Aphid", "Aphid"],
        INSECTICIDE => ["Imidacloprid", "Imidacloprid", "Malathion"],
        FORMULATION => ["SC", "SC", "EC"],
        CROP => ["Cotton", "Cotton", "Cotton"]
    )
    .unwrap();
    let dataset = validate(df).unwrap();
    let rows = aggregate(&dataset.as_view()).unwrap();
    let got: Vec<(&str, u64)> = rows.iter().map(|r| (r.label.as_str(), r.count)).collect();
    assert_eq!(got, vec![("Malathion (EC)", 1), ("Imidacloprid (SC)", 2)]);
}

#[test]
fn test_detail_uses_first_row_in_source_order() {
    let df = df!(
        PEST => ["Aphid", "Mite", "Aphid"],
        INSECTICIDE => ["Imidacloprid", "Abamectin", "Imidacloprid"],
        FORMULATION => ["WG", "EC", "SC"],
        CROP => ["Rice", "Cotton", "Cotton"]
    )
    .unwrap();
    let dataset = validate(df).unwrap();
    let view = apply(&dataset, &FilterSpec::new().with_pest("aphid")).unwrap();
    let detail = resolve_detail(&view, "Imidacloprid").unwrap();
    assert_eq!(detail.formulation.as_deref(), Some("WG"));
    assert_eq!(detail.pests.len(), 1);
}

#[test]
fn test_aggregation_skips_null_keys() {
    let df = df!(
        PEST => [Some("Aphid"), Some("Aphid"), Some("Aphid")],
        INSECTICIDE => [Some("Imidacloprid"), None, Some("Malathion")],
        FORMULATION => [Some("SC"), Some("EC"), None],
        CROP => [Some("Cotton"), Some("Cotton"), Some("Cotton")]
    )
    .unwrap();
    let dataset = validate(df).unwrap();
    let rows = aggregate(&dataset.as_view()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "Imidacloprid (SC)");
    assert!(rows.iter().all(|r| !r.label.contains("NaN") && !r.label.contains("null")));
}

#[test]
fn test_evaluate_reports_empty_states_in_order() {
    let dataset = common::usage_dataset();
    let snap = evaluate(&dataset, &FilterSpec::new(), &DetailChoice::First).unwrap();
    assert_eq!(snap.table_state(), Some(EmptyState::NoCriteria));

    let spec = FilterSpec::new().with_pest("locust");
    let snap = evaluate(&dataset, &spec, &DetailChoice::First).unwrap();
    assert_eq!(snap.table_state(), Some(EmptyState::NoMatches));

    let spec = FilterSpec::new()
        .with_pest("mite")
        .with_crop(Selection::only("Rice"));
    let snap = evaluate(&dataset, &spec, &DetailChoice::First).unwrap();
    assert_eq!(snap.table_state(), Some(EmptyState::NoMatchesAfterSelection));
    assert_eq!(snap.chart_state(), Some(EmptyState::NoMatchesAfterSelection));
}

#[test]
fn test_dropdown_options_follow_upstream_stages() {
    let dataset = common::usage_dataset();
    let spec = FilterSpec::new()
        .with_pest("aphid")
        .with_crop(Selection::only("Rice"));
    let snap = evaluate(&dataset, &spec, &DetailChoice::First).unwrap();
    assert_eq!(snap.staged.crop_options, vec!["Cotton", "Rice"]);
    assert_eq!(snap.staged.insecticide_options, vec!["Imidacloprid", "Malathion"]);
    assert_eq!(snap.staged.view.height(), 2);
}

#[test]
fn test_exact_detail_choice_reports_not_found() {
    let dataset = common::usage_dataset();
    let spec = FilterSpec::new().with_pest("aphid");
    let snap = evaluate(
        &dataset,
        &spec,
        &DetailChoice::Exact("Spinosad".to_string()),
    )
    .unwrap();
    let err = snap.detail.unwrap().unwrap_err();
    assert_eq!(err.insecticide, "Spinosad");
}

#[test]
fn test_rows_without_formulation_leave_nothing_to_chart() {
    let dataset = common::sparse_dataset();
    let snapshot = evaluate(
        &dataset,
        &FilterSpec::new().with_pest("green"),
        &DetailChoice::First,
    )
    .unwrap();
    assert_eq!(snapshot.table_state(), None);
    assert_eq!(snapshot.detail_state(), None);
    assert!(snapshot.frequencies.is_empty());
    assert_eq!(snapshot.chart_state(), Some(EmptyState::NothingToChart));
}

#[test]
fn test_rows_without_insecticide_leave_no_detail() {
    let dataset = common::sparse_dataset();
    let snapshot = evaluate(
        &dataset,
        &FilterSpec::new().with_pest("mite"),
        &DetailChoice::First,
    )
    .unwrap();
    assert_eq!(snapshot.staged.view.height(), 1);
    assert_eq!(snapshot.table_state(), None);
    assert!(snapshot.detail_options.is_empty());
    assert_eq!(snapshot.detail_state(), Some(EmptyState::NoDetailSelected));
    assert_eq!(snapshot.chart_state(), Some(EmptyState::NothingToChart));
}

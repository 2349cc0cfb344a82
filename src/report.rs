//! Non-interactive rendering of a [`Snapshot`] as plain text or JSON.

use std::io::Write;

use color_eyre::Result;
use serde::Serialize;

use crate::dataset::{Record, DISPLAY_COLUMNS};
use crate::detail::DetailSelection;
use crate::error_display::{empty_state_message, user_message_from_not_found};
use crate::frequency::FrequencyRow;
use crate::pipeline::Snapshot;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub source: String,
    pub criteria: Vec<String>,
    pub show_all: bool,
    pub total_records: usize,
    pub matched_records: usize,
    /// Set when the results table is empty, with the reason shown to users.
    pub message: Option<&'static str>,
    /// Why there is no insecticide to describe, if there is none.
    pub detail_message: Option<&'static str>,
    /// Why the usage chart is empty, if it is.
    pub chart_message: Option<&'static str>,
    pub records: Vec<Record>,
    pub detail: Option<&'a DetailSelection>,
    pub detail_error: Option<String>,
    pub frequencies: &'a [FrequencyRow],
}

impl<'a> Report<'a> {
    pub fn new(source: impl Into<String>, total_records: usize, snapshot: &'a Snapshot) -> Result<Self> {
        let records = snapshot.staged.view.records()?;
        Ok(Self {
            source: source.into(),
            criteria: snapshot
                .spec
                .predicates()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            show_all: snapshot.spec.show_all,
            total_records,
            matched_records: records.len(),
            message: snapshot.table_state().map(empty_state_message),
            detail_message: snapshot.detail_state().map(empty_state_message),
            chart_message: snapshot.chart_state().map(empty_state_message),
            records,
            detail: snapshot.resolved_detail(),
            detail_error: snapshot
                .detail
                .as_ref()
                .and_then(|d| d.as_ref().err())
                .map(user_message_from_not_found),
            frequencies: &snapshot.frequencies,
        })
    }

    pub fn write_json(&self, out: &mut impl Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }

    pub fn write_text(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "Source: {}", self.source)?;
        if self.show_all {
            writeln!(out, "Criteria: show all data")?;
        } else if self.criteria.is_empty() {
            writeln!(out, "Criteria: none")?;
        } else {
            writeln!(out, "Criteria: {}", self.criteria.join(" AND "))?;
        }
        writeln!(out)?;

        if let Some(message) = self.message {
            writeln!(out, "{}", message)?;
            return Ok(());
        }

        writeln!(
            out,
            "Filtered Results ({} of {} records)",
            self.matched_records, self.total_records
        )?;
        write_records_table(out, &self.records)?;
        writeln!(out)?;

        writeln!(out, "Insecticide Information")?;
        match (self.detail, &self.detail_error) {
            (Some(detail), _) => {
                writeln!(out, "  Insecticide: {}", detail.insecticide)?;
                writeln!(
                    out,
                    "  Formulation: {}",
                    detail.formulation.as_deref().unwrap_or("-")
                )?;
                writeln!(out, "  Used against: {}", detail.pests_joined())?;
            }
            (None, Some(err)) => writeln!(out, "  {}", err)?,
            (None, None) => writeln!(out, "  {}", self.detail_message.unwrap_or("-"))?,
        }
        writeln!(out)?;

        writeln!(out, "Insecticide Usage")?;
        if let Some(message) = self.chart_message {
            writeln!(out, "  {}", message)?;
            return Ok(());
        }
        let width = self
            .frequencies
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);
        // most used first, like the chart reads top to bottom
        for row in self.frequencies.iter().rev() {
            writeln!(out, "  {:<width$}  {}", row.label, row.count, width = width)?;
        }
        Ok(())
    }
}

fn write_records_table(out: &mut impl Write, records: &[Record]) -> Result<()> {
    let cell = |r: &Record, c: &str| r.field(c).unwrap_or("").to_string();
    let widths: Vec<usize> = DISPLAY_COLUMNS
        .iter()
        .map(|c| {
            records
                .iter()
                .map(|r| cell(r, c).chars().count())
                .max()
                .unwrap_or(0)
                .max(c.len())
        })
        .collect();

    let header: Vec<String> = DISPLAY_COLUMNS
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c, w = *w))
        .collect();
    writeln!(out, "  {}", header.join("  ").trim_end())?;
    for record in records {
        let line: Vec<String> = DISPLAY_COLUMNS
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", cell(record, c), w = *w))
            .collect();
        writeln!(out, "  {}", line.join("  ").trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CROP, FORMULATION, INSECTICIDE, PEST};
    use crate::filter::FilterSpec;
    use crate::pipeline::{evaluate, DetailChoice};
    use crate::schema::validate;
    use polars::prelude::*;

    fn snapshot(spec: &FilterSpec) -> (usize, Snapshot) {
        let df = df!(
            PEST => ["Aphid", "Aphid", "Mite"],
            INSECTICIDE => ["Imidacloprid", "Imidacloprid", "Abamectin"],
            FORMULATION => ["SC", "SC", "EC"],
            CROP => ["Cotton", "Rice", "Cotton"]
        )
        .unwrap();
        let dataset = validate(df).unwrap();
        let snap = evaluate(&dataset, spec, &DetailChoice::First).unwrap();
        (dataset.height(), snap)
    }

    #[test]
    fn test_text_report_sections() {
        let (total, snap) = snapshot(&FilterSpec::new().with_pest("aphid"));
        let report = Report::new("usage.csv", total, &snap).unwrap();
        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Criteria: PEST contains 'aphid'"));
        assert!(text.contains("Filtered Results (2 of 3 records)"));
        assert!(text.contains("Formulation: SC"));
        assert!(text.contains("Imidacloprid (SC)  2"));
    }

    #[test]
    fn test_text_report_empty_state() {
        let (total, snap) = snapshot(&FilterSpec::new());
        let report = Report::new("usage.csv", total, &snap).unwrap();
        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Please enter a pest name or enable 'Show All Data'."));
        assert!(!text.contains("Filtered Results"));
    }

    #[test]
    fn test_json_report_shape() {
        let (total, snap) = snapshot(&FilterSpec::new().with_show_all(true));
        let report = Report::new("usage.csv", total, &snap).unwrap();
        let mut out = Vec::new();
        report.write_json(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["matched_records"], 3);
        assert_eq!(value["frequencies"][0]["label"], "Abamectin (EC)");
        assert_eq!(value["frequencies"][1]["count"], 2);
        assert_eq!(value["detail"]["insecticide"], "Imidacloprid");
    }
}

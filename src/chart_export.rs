//! Usage chart export to PNG (plotters bitmap) and EPS (minimal PostScript, no deps).
//!
//! Both draw the same horizontal bar chart the terminal view shows: one bar
//! per (insecticide, formulation), rows in the order given, so with the
//! aggregator's ascending order the most used product ends up on top.

use color_eyre::Result;
use std::fmt::Write;
use std::path::Path;

use crate::filter::FilterSpec;
use crate::frequency::FrequencyRow;
use crate::ChartFormat;

/// Escape a string for PostScript ( and ) and \.
fn ps_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Whole-number ticks from 0 up to the first tick at or above `max`, using
/// the smallest 1-2-5 step that needs at most `max_ticks` intervals.
fn count_ticks(max: u64, max_ticks: u64) -> Vec<u64> {
    let max = max.max(1);
    let step = (0..19)
        .flat_map(|exp| [1, 2, 5].map(|m| m * 10u64.pow(exp)))
        .find(|step| max.div_ceil(*step) <= max_ticks.max(1))
        .unwrap_or(max);
    (0..=max.div_ceil(step)).map(|i| i * step).collect()
}

fn format_tick(v: f64) -> String {
    format!("{}", v.round() as i64)
}

/// Export format for the chart: PNG or EPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFormat {
    Png,
    Eps,
}

impl ChartExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Eps];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Eps => "eps",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Eps => "EPS",
        }
    }

    /// Parse a config value or file extension ("png", "EPS", ...).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(s.trim()))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|e| e.to_str()).and_then(Self::parse)
    }
}

impl From<ChartFormat> for ChartExportFormat {
    fn from(format: ChartFormat) -> Self {
        match format {
            ChartFormat::Png => Self::Png,
            ChartFormat::Eps => Self::Eps,
        }
    }
}

/// Title, size and bar color for an exported chart.
#[derive(Debug, Clone)]
pub struct ChartExportOptions {
    pub title: Option<String>,
    /// Pixel size for PNG. EPS uses a fixed point size scaled from the row count.
    pub size: (u32, u32),
    pub bar_color: (u8, u8, u8),
}

impl Default for ChartExportOptions {
    fn default() -> Self {
        Self {
            title: None,
            size: (1024, 768),
            bar_color: (31, 119, 180),
        }
    }
}

/// Pest-aware chart title, e.g. `Insecticides Used (Pest: aphid)`.
/// Show all covers every pest, whatever is typed in the pest box.
pub fn chart_title(spec: &FilterSpec) -> String {
    if spec.show_all {
        return "Insecticides Used (Pest: All)".to_string();
    }
    match spec.pest_substring.as_deref().filter(|p| !p.is_empty()) {
        Some(p) => format!("Insecticides Used (Pest: {})", p),
        None => "Insecticides Used".to_string(),
    }
}

/// Write `rows` to `path` in `format`.
pub fn export_chart(
    path: &Path,
    rows: &[FrequencyRow],
    format: ChartExportFormat,
    options: &ChartExportOptions,
) -> Result<()> {
    match format {
        ChartExportFormat::Png => write_chart_png(path, rows, options),
        ChartExportFormat::Eps => write_chart_eps(path, rows, options),
    }
}

fn max_count(rows: &[FrequencyRow]) -> u64 {
    rows.iter().map(|r| r.count).max().unwrap_or(0)
}

/// Write the chart to EPS (Encapsulated PostScript). No external dependencies.
pub fn write_chart_eps(path: &Path, rows: &[FrequencyRow], options: &ChartExportOptions) -> Result<()> {
    if rows.is_empty() {
        return Err(color_eyre::eyre::eyre!("No data to export"));
    }

    const CHAR_W: f64 = 5.0;
    const ROW_H: f64 = 18.0;
    const MARGIN_BOTTOM: f64 = 40.0;
    const MARGIN_TOP: f64 = 30.0;
    const MARGIN_RIGHT: f64 = 30.0;
    const PLOT_W: f64 = 320.0;

    let longest = rows.iter().map(|r| r.label.len()).max().unwrap_or(0) as f64;
    let margin_left = (longest * CHAR_W + 12.0).max(50.0);
    let plot_h = ROW_H * rows.len() as f64;
    let w = margin_left + PLOT_W + MARGIN_RIGHT;
    let h = MARGIN_BOTTOM + plot_h + MARGIN_TOP;

    const MAX_TICKS: u64 = 8;
    let ticks = count_ticks(max_count(rows), MAX_TICKS);
    // the axis ends on the last tick
    let x_max = ticks.last().copied().unwrap_or(1).max(1) as f64;
    let to_x = |x: f64| margin_left + x / x_max * PLOT_W;
    // row 0 at the bottom
    let row_y = |i: usize| MARGIN_BOTTOM + i as f64 * ROW_H;

    let mut ps = String::new();
    writeln!(ps, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(
        ps,
        "%%BoundingBox: 0 0 {} {}",
        w.ceil() as i32,
        h.ceil() as i32
    )?;
    writeln!(ps, "%%Creator: insectui")?;
    writeln!(ps, "%%EndComments")?;
    writeln!(ps, "gsave")?;
    writeln!(ps, "1 setlinewidth")?;

    if let Some(title) = options.title.as_ref().filter(|t| !t.is_empty()) {
        writeln!(ps, "/Helvetica findfont 12 scalefont setfont")?;
        let title_w = title.len() as f64 * 6.0;
        let tx = (w / 2.0 - title_w / 2.0).max(4.0);
        writeln!(ps, "{} {} moveto ({}) show", tx, h - 18.0, ps_escape(title))?;
    }

    writeln!(ps, "0.9 setgray")?;
    writeln!(ps, "0.5 setlinewidth")?;
    for &v in &ticks {
        writeln!(
            ps,
            "{} {} moveto 0 {} rlineto stroke",
            to_x(v as f64),
            MARGIN_BOTTOM,
            plot_h
        )?;
    }

    let (r, g, b) = options.bar_color;
    writeln!(
        ps,
        "{} {} {} setrgbcolor",
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0
    )?;
    for (i, row) in rows.iter().enumerate() {
        let y0 = row_y(i) + ROW_H * 0.15;
        let bar_w = to_x(row.count as f64) - margin_left;
        writeln!(
            ps,
            "{} {} {} {} rectfill",
            margin_left,
            y0,
            bar_w,
            ROW_H * 0.7
        )?;
    }

    writeln!(ps, "0 setgray")?;
    writeln!(ps, "1 setlinewidth")?;
    writeln!(ps, "{} {} moveto", margin_left, MARGIN_BOTTOM)?;
    writeln!(ps, "{} 0 rlineto", PLOT_W)?;
    writeln!(ps, "0 {} rlineto", plot_h)?;
    writeln!(ps, "{} 0 rlineto", -PLOT_W)?;
    writeln!(ps, "closepath stroke")?;

    writeln!(ps, "/Helvetica findfont 9 scalefont setfont")?;
    for &v in &ticks {
        let label = v.to_string();
        let tx = to_x(v as f64) - label.len() as f64 * CHAR_W / 2.0;
        writeln!(
            ps,
            "{} {} moveto ({}) show",
            tx,
            MARGIN_BOTTOM - 12.0,
            ps_escape(&label)
        )?;
    }
    for (i, row) in rows.iter().enumerate() {
        let tx = (margin_left - row.label.len() as f64 * CHAR_W - 6.0).max(2.0);
        writeln!(
            ps,
            "{} {} moveto ({}) show",
            tx,
            row_y(i) + ROW_H / 2.0 - 3.0,
            ps_escape(&row.label)
        )?;
    }

    writeln!(ps, "/Helvetica findfont 10 scalefont setfont")?;
    let axis = "Count";
    writeln!(
        ps,
        "{} {} moveto ({}) show",
        margin_left + PLOT_W / 2.0 - axis.len() as f64 * CHAR_W / 2.0,
        MARGIN_BOTTOM - 28.0,
        axis
    )?;

    writeln!(ps, "grestore")?;
    writeln!(ps, "showpage")?;
    writeln!(ps, "%%EOF")?;
    std::fs::write(path, ps)?;
    Ok(())
}

/// Write the chart to PNG using the plotters bitmap backend.
pub fn write_chart_png(path: &Path, rows: &[FrequencyRow], options: &ChartExportOptions) -> Result<()> {
    use plotters::prelude::*;

    if rows.is_empty() {
        return Err(color_eyre::eyre::eyre!("No data to export"));
    }

    let (width, height) = options.size;
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let longest = rows.iter().map(|r| r.label.len()).max().unwrap_or(0) as u32;
    let y_min = -0.5;
    let y_max = rows.len() as f64 - 0.5;
    let x_max = max_count(rows).max(1) as f64 * 1.05;

    let mut binding = ChartBuilder::on(&root);
    let builder = binding.margin(30);
    let builder = if let Some(t) = options.title.as_ref().filter(|s| !s.is_empty()) {
        builder.caption(t.as_str(), ("sans-serif", 20))
    } else {
        builder
    };
    let mut chart = builder
        .x_label_area_size(40)
        .y_label_area_size((longest * 7 + 10).min(width / 2).max(60))
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(labels.len())
        .x_desc("Count")
        .x_label_formatter(&|v: &f64| format_tick(*v))
        .y_label_formatter(&move |v: &f64| {
            let idx = v.round();
            if (v - idx).abs() < 0.25 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .draw()?;

    let (r, g, b) = options.bar_color;
    let color = RGBColor(r, g, b);
    chart.draw_series(rows.iter().enumerate().map(|(i, row)| {
        let y = i as f64;
        Rectangle::new([(0.0, y - 0.35), (row.count as f64, y + 0.35)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}

//! Automated exploratory report over a table: overview, per-variable
//! statistics, correlations, missingness and sample rows.
//!
//! The report is a plain data structure ([`ProfileReport`]) that the UI draws
//! natively and that renders to a standalone HTML document (with the same
//! data embedded as JSON) for saving.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use serde::Serialize;

use super::error::{TableError, TableResult};
use super::model::{CellValue, Column, ColumnType, Table};
use super::summary::{self, NumericSummary};

/// Knobs for report generation.
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    pub histogram_bins: usize,
    pub sample_rows: usize,
    pub top_values: usize,
    /// CSS colour for histogram bars, e.g. `#3b82f6`.
    pub accent: String,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            histogram_bins: 10,
            sample_rows: 10,
            top_values: 5,
            accent: "#4c8bf5".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub missing_pct: f64,
    pub duplicate_rows: usize,
    pub duplicate_pct: f64,
    pub numeric_columns: usize,
    pub text_columns: usize,
    pub other_columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariableDetails {
    Numeric {
        stats: NumericSummary,
        zeros: usize,
        histogram: Option<Histogram>,
    },
    Text {
        top: Vec<(String, usize)>,
        min_length: usize,
        max_length: usize,
        mean_length: f64,
    },
    Other {
        top: Vec<(String, usize)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableProfile {
    pub name: String,
    pub kind: ColumnType,
    pub distinct: usize,
    pub missing: usize,
    pub missing_pct: f64,
    pub details: VariableDetails,
}

/// Pearson correlations between numeric columns over pairwise-complete rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    pub overview: Overview,
    pub variables: Vec<VariableProfile>,
    pub correlations: Option<CorrelationMatrix>,
    pub missing: Vec<(String, usize)>,
    pub head: SampleRows,
    pub tail: SampleRows,
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

impl ProfileReport {
    pub fn build(table: &Table, options: &ProfileOptions) -> Self {
        let rows = table.len();
        let missing_cells: usize = table.columns().iter().map(Column::missing_count).sum();
        let duplicate_rows = table.duplicate_mask().iter().filter(|d| **d).count();
        let count_kind =
            |kind: ColumnType| table.columns().iter().filter(|c| c.kind() == kind).count();

        let overview = Overview {
            rows,
            columns: table.width(),
            missing_cells,
            missing_pct: pct(missing_cells, rows * table.width()),
            duplicate_rows,
            duplicate_pct: pct(duplicate_rows, rows),
            numeric_columns: count_kind(ColumnType::Numeric),
            text_columns: count_kind(ColumnType::Text),
            other_columns: count_kind(ColumnType::Other),
        };

        let variables = table
            .columns()
            .iter()
            .map(|c| variable_profile(c, options))
            .collect();

        ProfileReport {
            overview,
            variables,
            correlations: correlations(table),
            missing: table
                .columns()
                .iter()
                .map(|c| (c.name.clone(), c.missing_count()))
                .collect(),
            head: sample_rows(&table.head(options.sample_rows)),
            tail: sample_rows(&table.tail(options.sample_rows)),
        }
    }

    pub fn to_json(&self) -> TableResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TableError::Report(e.to_string()))
    }
}

fn variable_profile(column: &Column, options: &ProfileOptions) -> VariableProfile {
    let missing = column.missing_count();
    let counts = summary::value_counts(column);
    let top: Vec<(String, usize)> = counts
        .iter()
        .take(options.top_values)
        .map(|(v, n)| (v.to_string(), *n))
        .collect();

    let details = match column.kind() {
        ColumnType::Numeric => {
            let values = column.numbers();
            VariableDetails::Numeric {
                stats: summary::numeric_summary(column),
                zeros: values.iter().filter(|v| **v == 0.0).count(),
                histogram: histogram(&values, options.histogram_bins),
            }
        }
        ColumnType::Text => {
            let lengths: Vec<usize> = column
                .values
                .iter()
                .filter_map(CellValue::as_text)
                .map(|s| s.chars().count())
                .collect();
            VariableDetails::Text {
                top,
                min_length: lengths.iter().copied().min().unwrap_or(0),
                max_length: lengths.iter().copied().max().unwrap_or(0),
                mean_length: if lengths.is_empty() {
                    0.0
                } else {
                    lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
                },
            }
        }
        ColumnType::Other => VariableDetails::Other { top },
    };

    VariableProfile {
        name: column.name.clone(),
        kind: column.kind(),
        distinct: counts.len(),
        missing,
        missing_pct: pct(missing, column.values.len()),
        details,
    }
}

/// Equal-width histogram. A constant column puts everything in one bin.
fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return None;
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 {
        return Some(Histogram {
            edges: vec![min, max],
            counts: vec![finite.len()],
        });
    }

    let width = range / bins as f64;
    let edges = (0..=bins).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0; bins];
    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some(Histogram { edges, counts })
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

fn correlations(table: &Table) -> Option<CorrelationMatrix> {
    let numeric: Vec<(&str, Vec<Option<f64>>)> = table
        .numeric_columns()
        .map(|c| (c.name.as_str(), c.values.iter().map(CellValue::as_f64).collect()))
        .collect();
    if numeric.len() < 2 {
        return None;
    }
    let values: Vec<Vec<Option<f64>>> = numeric
        .iter()
        .map(|(_, xs)| numeric.iter().map(|(_, ys)| pearson(xs, ys)).collect())
        .collect();
    Some(CorrelationMatrix {
        columns: numeric.iter().map(|(n, _)| n.to_string()).collect(),
        values,
    })
}

fn sample_rows(table: &Table) -> SampleRows {
    SampleRows {
        columns: table.column_names(),
        rows: (0..table.len())
            .map(|r| table.row(r).iter().map(|v| v.to_string()).collect())
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "–".to_string(), |v| format!("{v:.4}"))
}

const STYLE: &str = "body{font-family:sans-serif;margin:1.5em;color:#222}\
table{border-collapse:collapse;margin:.5em 0}\
td,th{border:1px solid #ddd;padding:3px 8px;text-align:right}\
th{background:#f4f4f4}\
section.var{border-top:1px solid #ccc;padding-top:.5em}\
.muted{color:#777}";

impl ProfileReport {
    /// Standalone HTML document with inline CSS, SVG histograms and the
    /// report embedded as JSON.
    pub fn to_html(&self, title: &str, options: &ProfileOptions) -> TableResult<String> {
        let json = serde_json::to_string(self)
            .map_err(|e| TableError::Report(e.to_string()))?
            .replace("</", "<\\/");
        self.write_html(title, options, &json)
            .map_err(|e| TableError::Report(e.to_string()))
    }

    fn write_html(
        &self,
        title: &str,
        options: &ProfileOptions,
        json: &str,
    ) -> Result<String, std::fmt::Error> {
        let mut h = String::new();
        let o = &self.overview;
        writeln!(
            h,
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
             <style>{STYLE}</style></head><body>",
            escape(title)
        )?;
        writeln!(h, "<h1>Profile report: {}</h1>", escape(title))?;

        writeln!(h, "<h2>Overview</h2><table>")?;
        for (label, value) in [
            ("Rows", o.rows.to_string()),
            ("Columns", o.columns.to_string()),
            ("Missing cells", format!("{} ({:.1}%)", o.missing_cells, o.missing_pct)),
            ("Duplicate rows", format!("{} ({:.1}%)", o.duplicate_rows, o.duplicate_pct)),
            ("Numeric columns", o.numeric_columns.to_string()),
            ("Text columns", o.text_columns.to_string()),
            ("Other columns", o.other_columns.to_string()),
        ] {
            writeln!(h, "<tr><th>{label}</th><td>{value}</td></tr>")?;
        }
        writeln!(h, "</table>")?;

        writeln!(h, "<h2>Variables</h2>")?;
        for var in &self.variables {
            writeln!(
                h,
                "<section class=\"var\"><h3>{} <span class=\"muted\">({})</span></h3>\
                 <p>Distinct: {} &middot; Missing: {} ({:.1}%)</p>",
                escape(&var.name),
                var.kind,
                var.distinct,
                var.missing,
                var.missing_pct
            )?;
            match &var.details {
                VariableDetails::Numeric {
                    stats,
                    zeros,
                    histogram,
                } => {
                    writeln!(h, "<table><tr>")?;
                    for head in [
                        "count", "mean", "std", "min", "25%", "50%", "75%", "max", "zeros",
                    ] {
                        write!(h, "<th>{head}</th>")?;
                    }
                    writeln!(
                        h,
                        "</tr><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                         <td>{}</td><td>{}</td><td>{}</td><td>{zeros}</td></tr></table>",
                        stats.count,
                        fmt_opt(stats.mean),
                        fmt_opt(stats.std),
                        fmt_opt(stats.min),
                        fmt_opt(stats.q25),
                        fmt_opt(stats.median),
                        fmt_opt(stats.q75),
                        fmt_opt(stats.max),
                    )?;
                    if let Some(hist) = histogram {
                        write_histogram_svg(&mut h, hist, &options.accent)?;
                    }
                }
                VariableDetails::Text {
                    top,
                    min_length,
                    max_length,
                    mean_length,
                } => {
                    writeln!(
                        h,
                        "<p>Length: min {min_length}, max {max_length}, mean {mean_length:.1}</p>"
                    )?;
                    write_top_values(&mut h, top)?;
                }
                VariableDetails::Other { top } => write_top_values(&mut h, top)?,
            }
            writeln!(h, "</section>")?;
        }

        if let Some(corr) = &self.correlations {
            writeln!(h, "<h2>Correlations (Pearson)</h2><table><tr><th></th>")?;
            for name in &corr.columns {
                write!(h, "<th>{}</th>", escape(name))?;
            }
            writeln!(h, "</tr>")?;
            for (name, row) in corr.columns.iter().zip(&corr.values) {
                write!(h, "<tr><th>{}</th>", escape(name))?;
                for v in row {
                    write!(h, "<td>{}</td>", fmt_opt(*v))?;
                }
                writeln!(h, "</tr>")?;
            }
            writeln!(h, "</table>")?;
        }

        writeln!(h, "<h2>Missing values</h2><table>")?;
        for (name, n) in &self.missing {
            writeln!(h, "<tr><th>{}</th><td>{n}</td></tr>", escape(name))?;
        }
        writeln!(h, "</table>")?;

        for (heading, sample) in [("First rows", &self.head), ("Last rows", &self.tail)] {
            writeln!(h, "<h2>{heading}</h2><table><tr>")?;
            for name in &sample.columns {
                write!(h, "<th>{}</th>", escape(name))?;
            }
            writeln!(h, "</tr>")?;
            for row in &sample.rows {
                write!(h, "<tr>")?;
                for cell in row {
                    write!(h, "<td>{}</td>", escape(cell))?;
                }
                writeln!(h, "</tr>")?;
            }
            writeln!(h, "</table>")?;
        }

        writeln!(
            h,
            "<script type=\"application/json\" id=\"profile-data\">{json}</script></body></html>"
        )?;
        Ok(h)
    }
}

fn write_top_values(h: &mut String, top: &[(String, usize)]) -> std::fmt::Result {
    writeln!(h, "<table><tr><th>value</th><th>count</th></tr>")?;
    for (value, n) in top {
        writeln!(h, "<tr><td>{}</td><td>{n}</td></tr>", escape(value))?;
    }
    writeln!(h, "</table>")
}

fn write_histogram_svg(h: &mut String, hist: &Histogram, color: &str) -> std::fmt::Result {
    const W: f64 = 320.0;
    const H: f64 = 100.0;
    let peak = hist.counts.iter().copied().max().unwrap_or(0).max(1) as f64;
    let bar_w = W / hist.counts.len() as f64;
    writeln!(h, "<svg width=\"{W}\" height=\"{H}\" role=\"img\">")?;
    for (i, count) in hist.counts.iter().enumerate() {
        let bar_h = *count as f64 / peak * H;
        writeln!(
            h,
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\">\
             <title>{}</title></rect>",
            i as f64 * bar_w,
            H - bar_h,
            (bar_w - 1.0).max(1.0),
            bar_h,
            escape(color),
            count
        )?;
    }
    writeln!(h, "</svg>")
}

// ---------------------------------------------------------------------------
// Rendering through a scoped temporary file
// ---------------------------------------------------------------------------

/// Write the HTML report to a temporary file and read it back.
/// The file is removed when this returns, on success and on error.
pub fn render_report(
    report: &ProfileReport,
    title: &str,
    options: &ProfileOptions,
) -> TableResult<String> {
    render_report_in(&std::env::temp_dir(), report, title, options)
}

pub fn render_report_in(
    dir: &Path,
    report: &ProfileReport,
    title: &str,
    options: &ProfileOptions,
) -> TableResult<String> {
    let html = report.to_html(title, options)?;

    let mut tmp = tempfile::Builder::new()
        .prefix("profile-")
        .suffix(".html")
        .tempfile_in(dir)?;
    log::debug!("Writing report to {}", tmp.path().display());
    tmp.write_all(html.as_bytes())?;
    tmp.flush()?;

    let content = std::fs::read_to_string(tmp.path())?;
    tmp.close()?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    fn table() -> Table {
        read_csv(
            b"name,x,y,flag\n\
              a,1,2,true\n\
              b,2,4,false\n\
              a,1,2,true\n\
              <c>,3,,true\n\
              ,4,8,\n",
        )
        .unwrap()
    }

    #[test]
    fn overview_counts_missing_duplicates_and_types() {
        let report = ProfileReport::build(&table(), &ProfileOptions::default());
        let o = &report.overview;
        assert_eq!((o.rows, o.columns), (5, 4));
        assert_eq!(o.missing_cells, 3);
        assert_eq!(o.duplicate_rows, 1);
        assert_eq!(
            (o.numeric_columns, o.text_columns, o.other_columns),
            (2, 1, 1)
        );
    }

    #[test]
    fn numeric_variables_carry_histograms() {
        let report = ProfileReport::build(&table(), &ProfileOptions::default());
        let x = &report.variables[1];
        match &x.details {
            VariableDetails::Numeric { histogram, .. } => {
                let hist = histogram.as_ref().unwrap();
                assert_eq!(hist.counts.len(), 10);
                assert_eq!(hist.edges.len(), 11);
                assert_eq!(hist.counts.iter().sum::<usize>(), 5);
                assert_eq!(hist.counts[9], 1);
            }
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn constant_column_fills_one_bin() {
        let hist = histogram(&[2.0, 2.0, 2.0], 10).unwrap();
        assert_eq!(hist.counts, vec![3]);
    }

    #[test]
    fn correlations_use_pairwise_complete_rows() {
        let report = ProfileReport::build(&table(), &ProfileOptions::default());
        let corr = report.correlations.unwrap();
        assert_eq!(corr.columns, vec!["x", "y"]);
        let xy = corr.values[0][1].unwrap();
        assert!((xy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn html_escapes_cells_and_embeds_json() {
        let options = ProfileOptions::default();
        let report = ProfileReport::build(&table(), &options);
        let html = report.to_html("people.csv", &options).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;c&gt;"));
        assert!(html.contains("id=\"profile-data\""));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn json_export_parses_back() {
        let report = ProfileReport::build(&table(), &ProfileOptions::default());
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["overview"]["rows"], 5);
        assert_eq!(value["variables"][0]["details"]["type"], "text");
    }

    #[test]
    fn temporary_report_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let options = ProfileOptions::default();
        let report = ProfileReport::build(&table(), &options);
        let html = render_report_in(dir.path(), &report, "people.csv", &options).unwrap();
        assert!(html.contains("Profile report: people.csv"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_table_still_profiles() {
        let t = read_csv(b"a,b\n").unwrap();
        let report = ProfileReport::build(&t, &ProfileOptions::default());
        assert_eq!(report.overview.missing_pct, 0.0);
        assert!(report.correlations.is_none());
        assert!(report.head.rows.is_empty());
    }
}

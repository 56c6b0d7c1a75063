use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::series_colors;
use crate::data::profile::{ProfileReport, SampleRows, VariableDetails};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Inline profiling report
// ---------------------------------------------------------------------------

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "–".to_string(), |v| format!("{v:.4}"))
}

/// Draw the report inside a fixed-height scrolling viewport.
pub fn profile_view(ui: &mut Ui, id: &str, report: &ProfileReport, height: f32) {
    let accent = series_colors(1).first().copied().unwrap_or(Color32::LIGHT_BLUE);

    ScrollArea::vertical()
        .id_salt((id, "report"))
        .max_height(height)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            let o = &report.overview;
            ui.heading("Overview");
            egui::Grid::new((id, "overview"))
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for (label, value) in [
                        ("Rows", o.rows.to_string()),
                        ("Columns", o.columns.to_string()),
                        (
                            "Missing cells",
                            format!("{} ({:.1}%)", o.missing_cells, o.missing_pct),
                        ),
                        (
                            "Duplicate rows",
                            format!("{} ({:.1}%)", o.duplicate_rows, o.duplicate_pct),
                        ),
                        ("Numeric columns", o.numeric_columns.to_string()),
                        ("Text columns", o.text_columns.to_string()),
                        ("Other columns", o.other_columns.to_string()),
                    ] {
                        ui.strong(label);
                        ui.label(value);
                        ui.end_row();
                    }
                });

            ui.separator();
            ui.heading("Variables");
            for var in &report.variables {
                let header = format!(
                    "{}  ({}, {} distinct, {} missing)",
                    var.name, var.kind, var.distinct, var.missing
                );
                egui::CollapsingHeader::new(RichText::new(header).strong())
                    .id_salt((id, "var", &var.name))
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| match &var.details {
                        VariableDetails::Numeric {
                            stats,
                            zeros,
                            histogram,
                        } => {
                            ui.label(format!(
                                "mean {}  ·  std {}  ·  min {}  ·  median {}  ·  max {}  \
                                 ·  zeros {zeros}",
                                fmt_opt(stats.mean),
                                fmt_opt(stats.std),
                                fmt_opt(stats.min),
                                fmt_opt(stats.median),
                                fmt_opt(stats.max),
                            ));
                            if let Some(hist) = histogram {
                                plot::histogram(ui, (id, "hist", &var.name), hist, accent);
                            }
                        }
                        VariableDetails::Text {
                            top,
                            min_length,
                            max_length,
                            mean_length,
                        } => {
                            ui.label(format!(
                                "length: min {min_length}, max {max_length}, mean {mean_length:.1}"
                            ));
                            top_values(ui, (id, "top", &var.name), top);
                        }
                        VariableDetails::Other { top } => {
                            top_values(ui, (id, "top", &var.name), top);
                        }
                    });
            }

            if let Some(corr) = &report.correlations {
                ui.separator();
                ui.heading("Correlations (Pearson)");
                egui::Grid::new((id, "corr"))
                    .striped(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.label("");
                        for name in &corr.columns {
                            ui.strong(name);
                        }
                        ui.end_row();
                        for (name, row) in corr.columns.iter().zip(&corr.values) {
                            ui.strong(name);
                            for v in row {
                                ui.label(fmt_opt(*v));
                            }
                            ui.end_row();
                        }
                    });
            }

            ui.separator();
            ui.heading("Missing values");
            egui::Grid::new((id, "missing"))
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for (name, n) in &report.missing {
                        ui.label(name);
                        ui.label(n.to_string());
                        ui.end_row();
                    }
                });

            ui.separator();
            ui.heading("First rows");
            sample_grid(ui, (id, "head"), &report.head);
            ui.heading("Last rows");
            sample_grid(ui, (id, "tail"), &report.tail);
        });
}

fn top_values(ui: &mut Ui, id: impl std::hash::Hash, top: &[(String, usize)]) {
    egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        for (value, n) in top {
            ui.label(value);
            ui.label(n.to_string());
            ui.end_row();
        }
    });
}

fn sample_grid(ui: &mut Ui, id: impl std::hash::Hash, sample: &SampleRows) {
    ScrollArea::horizontal()
        .id_salt((&id, "scroll"))
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
                for name in &sample.columns {
                    ui.strong(name);
                }
                ui.end_row();
                for row in &sample.rows {
                    for cell in row {
                        ui.label(cell);
                    }
                    ui.end_row();
                }
            });
        });
}

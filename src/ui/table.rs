use std::hash::Hash;

use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};

use crate::data::model::{CellValue, Table};
use crate::data::summary::{NumericSummary, SummaryReport};

// ---------------------------------------------------------------------------
// Data grid (preview)
// ---------------------------------------------------------------------------

fn cell_text(value: &CellValue) -> RichText {
    match value {
        CellValue::Null => RichText::new("None").weak().italics(),
        other => RichText::new(other.to_string()),
    }
}

/// Render every row of `table` as a striped grid.
pub fn data_grid(ui: &mut Ui, id: impl Hash, table: &Table) {
    if table.width() == 0 {
        ui.label("(no columns)");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(GridColumn::auto().at_least(32.0))
                .columns(
                    GridColumn::auto().at_least(56.0).resizable(true),
                    table.width(),
                )
                .header(20.0, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.label("");
                    });
                    for column in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&column.name)
                                .on_hover_text(column.kind().to_string());
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.len(), |mut row| {
                        let r = row.index();
                        row.col(|ui: &mut Ui| {
                            ui.label(RichText::new(r.to_string()).weak());
                        });
                        for c in 0..table.width() {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell_text(table.cell(r, c)));
                            });
                        }
                    });
                });
        });
    });
}

// ---------------------------------------------------------------------------
// Summary tables
// ---------------------------------------------------------------------------

fn fmt_stat(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |v| format!("{v:.4}"))
}

/// `describe()` layout: one row per statistic, one column per numeric column,
/// followed by non-numeric frequencies and the missing-value counts.
pub fn summary_grid(ui: &mut Ui, id: impl Hash + Copy, summary: &SummaryReport) {
    if summary.numeric.is_empty() {
        ui.label("No numeric columns.");
    } else {
        egui::ScrollArea::horizontal()
            .id_salt((id, "describe_scroll"))
            .show(ui, |ui: &mut Ui| {
                egui::Grid::new((id, "describe"))
                    .striped(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.label("");
                        for s in &summary.numeric {
                            ui.strong(&s.column);
                        }
                        ui.end_row();

                        let rows: [(&str, fn(&NumericSummary) -> String); 8] = [
                            ("count", |s| s.count.to_string()),
                            ("mean", |s| fmt_stat(s.mean)),
                            ("std", |s| fmt_stat(s.std)),
                            ("min", |s| fmt_stat(s.min)),
                            ("25%", |s| fmt_stat(s.q25)),
                            ("50%", |s| fmt_stat(s.median)),
                            ("75%", |s| fmt_stat(s.q75)),
                            ("max", |s| fmt_stat(s.max)),
                        ];
                        for (label, value) in rows {
                            ui.strong(label);
                            for s in &summary.numeric {
                                ui.label(value(s));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    if !summary.categorical.is_empty() {
        ui.add_space(6.0);
        egui::Grid::new((id, "categorical"))
            .striped(true)
            .show(ui, |ui: &mut Ui| {
                for head in ["column", "count", "unique", "top", "freq"] {
                    ui.strong(head);
                }
                ui.end_row();
                for c in &summary.categorical {
                    ui.label(&c.column);
                    ui.label(c.count.to_string());
                    ui.label(c.unique.to_string());
                    ui.label(c.top.as_ref().map_or_else(String::new, |v| v.to_string()));
                    ui.label(c.freq.to_string());
                    ui.end_row();
                }
            });
    }

    ui.add_space(6.0);
    ui.strong("Missing Values Count:");
    egui::Grid::new((id, "missing"))
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (name, n) in &summary.missing {
                ui.label(name);
                ui.label(n.to_string());
                ui.end_row();
            }
        });
}

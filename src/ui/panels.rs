use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::Settings;
use crate::data::session::Outcome;
use crate::data::upload::FileFormat;
use crate::state::{AppState, FilePanel};
use crate::ui::{dialogs, plot, report, table};

const SUCCESS: Color32 = Color32::from_rgb(46, 160, 67);
const WARNING: Color32 = Color32::from_rgb(210, 153, 34);

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload…").clicked() {
                dialogs::open_upload_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.panels.is_empty(), egui::Button::new("Close all"))
                .clicked()
            {
                state.panels.clear();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("{} file(s) loaded", state.panels.len()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central area: one section per uploaded file
// ---------------------------------------------------------------------------

pub fn file_list(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data Sweeper");
    ui.label("Transform your data: clean, visualize, and convert CSV and Excel files.");
    ui.add_space(6.0);

    if state.panels.is_empty() && state.rejected.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload a CSV or Excel file  (File → Upload…, or drop it here)");
        });
        return;
    }

    if !state.rejected.is_empty() {
        for (name, error) in &state.rejected {
            ui.label(RichText::new(format!("❌ {name}: {error}")).color(Color32::RED));
        }
        if ui.small_button("Dismiss").clicked() {
            state.clear_rejected();
        }
        ui.separator();
    }

    let AppState {
        settings,
        panels,
        status_message,
        ..
    } = state;

    let mut close = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (index, panel) in panels.iter_mut().enumerate() {
                let id = format!("{index}:{}", panel.name());
                egui::CollapsingHeader::new(RichText::new(panel.name()).heading())
                    .id_salt(&id)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Close").clicked() {
                            close = Some(index);
                        }
                        file_panel(ui, &id, panel, settings, status_message);
                    });
                ui.separator();
            }
            if !panels.is_empty() {
                ui.label(RichText::new("🎉 All files processed!").color(SUCCESS));
            }
        });

    if let Some(index) = close {
        state.close_panel(index);
    }
}

fn notice_label(ui: &mut Ui, notice: &Outcome) {
    match notice {
        Outcome::Success(msg) => ui.label(RichText::new(format!("✅ {msg}")).color(SUCCESS)),
        Outcome::Warning(w) => ui.label(RichText::new(format!("⚠ {w}")).color(WARNING)),
    };
}

fn file_panel(
    ui: &mut Ui,
    id: &str,
    panel: &mut FilePanel,
    settings: &Settings,
    status_message: &mut Option<String>,
) {
    // ---- File info + preview ----
    let upload = panel.session.upload();
    ui.label(format!("File Name: {}", upload.name));
    ui.label(format!("File Size: {}", upload.size_label()));
    ui.label(format!(
        "{} rows × {} columns",
        panel.session.table().len(),
        panel.session.table().width()
    ));

    ui.strong(format!("Data Preview (First {} Rows):", settings.preview_rows));
    table::data_grid(ui, (id, "preview"), &panel.session.preview(settings.preview_rows));

    // ---- Summary ----
    ui.add_space(8.0);
    ui.heading("Data Summary");
    ui.checkbox(&mut panel.show_summary, "Show summary");
    if panel.show_summary {
        table::summary_grid(ui, (id, "summary"), panel.summary());
    }

    // ---- Cleaning ----
    ui.add_space(8.0);
    ui.checkbox(&mut panel.show_clean, "Clean & transform data");
    if panel.show_clean {
        ui.columns(2, |cols: &mut [Ui]| {
            if cols[0].button("Remove duplicates").clicked() {
                panel.notice = Some(panel.session.remove_duplicates());
            }
            if cols[0].button("Convert text columns to lowercase").clicked() {
                panel.notice = Some(panel.session.lowercase_text());
            }
            if cols[1].button("Fill missing values").clicked() {
                panel.notice = Some(panel.session.fill_missing());
            }
            if cols[1].button("Remove special characters").clicked() {
                panel.notice = Some(panel.session.strip_special_chars());
            }
        });
    }
    if let Some(notice) = &panel.notice {
        notice_label(ui, notice);
    }

    // ---- Filter ----
    ui.add_space(8.0);
    ui.heading("Filter Data");
    filter_section(ui, id, panel);

    // ---- Report ----
    ui.add_space(8.0);
    ui.heading("Data Report");
    report_section(ui, id, panel, settings, status_message);

    // ---- Visualization ----
    ui.add_space(8.0);
    ui.heading("Data Visualizations");
    ui.checkbox(&mut panel.show_chart, "Show visualization");
    if panel.show_chart {
        match panel.chart() {
            Ok(data) => plot::numeric_bar_chart(ui, (id, "chart"), data, settings.chart_height),
            Err(warning) => {
                ui.label(RichText::new(format!("⚠ {warning}")).color(WARNING));
            }
        }
    }

    // ---- Convert & download ----
    ui.add_space(8.0);
    ui.heading("Convert & Download");
    convert_section(ui, panel, status_message);

    // ---- History ----
    if !panel.session.history().is_empty() {
        egui::CollapsingHeader::new("History")
            .id_salt((id, "history"))
            .show(ui, |ui: &mut Ui| {
                for (i, op) in panel.session.history().iter().enumerate() {
                    ui.label(format!("{}. {op}", i + 1));
                }
            });
    }
}

fn filter_section(ui: &mut Ui, id: &str, panel: &mut FilePanel) {
    let columns = panel.session.table().column_names();
    let Some(current) = panel.selection().map(|s| s.column.clone()) else {
        ui.label("No columns to filter.");
        return;
    };

    let mut chosen = current.clone();
    egui::ComboBox::from_id_salt((id, "filter_column"))
        .selected_text(&chosen)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                ui.selectable_value(&mut chosen, col.clone(), col);
            }
        });
    if chosen != current {
        panel.select_filter_column(&chosen);
    }

    let values = panel
        .session
        .table()
        .column(&chosen)
        .map(|c| c.distinct_values())
        .unwrap_or_default();
    let n_selected = panel.selection().map_or(0, |s| s.selected.len());

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Values of {chosen}  ({n_selected}/{})", values.len()));
        if ui.small_button("All").clicked() {
            panel.select_all();
        }
        if ui.small_button("None").clicked() {
            panel.select_none();
        }
    });

    ScrollArea::vertical()
        .id_salt((id, "filter_values"))
        .max_height(160.0)
        .show(ui, |ui: &mut Ui| {
            for value in &values {
                let mut checked = panel.selection().is_some_and(|s| s.contains(value));
                let label = if value.is_null() {
                    RichText::new("None").italics()
                } else {
                    RichText::new(value.to_string())
                };
                if ui.checkbox(&mut checked, label).changed() {
                    panel.toggle_filter_value(value);
                }
            }
        });

    if ui.button("Apply filter").clicked() {
        panel.apply_filter();
    }
    if let Some(err) = &panel.filter_error {
        ui.label(RichText::new(err).color(Color32::RED));
    }
}

fn report_section(
    ui: &mut Ui,
    id: &str,
    panel: &mut FilePanel,
    settings: &Settings,
    status_message: &mut Option<String>,
) {
    let was_shown = panel.show_report;
    ui.checkbox(&mut panel.show_report, "Generate report");
    if !panel.show_report {
        return;
    }
    if !was_shown && panel.report.is_none() {
        panel.generate_report(settings);
    }

    if panel.report_is_stale() {
        ui.horizontal(|ui: &mut Ui| {
            let note = "The table changed since this report was generated.";
            ui.label(RichText::new(note).color(WARNING));
            if ui.button("Regenerate").clicked() {
                panel.generate_report(settings);
            }
        });
    }
    if let Some(err) = &panel.report_error {
        ui.label(RichText::new(format!("Report failed: {err}")).color(Color32::RED));
    }

    let Some(rendered) = &panel.report else {
        return;
    };
    let base = panel.session.upload().base_name().to_string();
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Save HTML…").clicked() {
            let name = format!("{base}_report.html");
            save(&name, "HTML", rendered.html.as_bytes(), status_message);
        }
        if ui.button("Save JSON…").clicked() {
            match rendered.report.to_json() {
                Ok(json) => {
                    let name = format!("{base}_report.json");
                    save(&name, "JSON", json.as_bytes(), status_message);
                }
                Err(e) => *status_message = Some(format!("Error: {e}")),
            }
        }
    });
    report::profile_view(ui, id, &rendered.report, settings.report_height);
}

fn convert_section(ui: &mut Ui, panel: &mut FilePanel, status_message: &mut Option<String>) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Convert {} to:", panel.name()));
        for format in FileFormat::ALL {
            ui.radio_value(&mut panel.export_format, format, format.to_string());
        }
    });

    if ui.button("Convert").clicked() {
        panel.convert();
    }
    if let Some(err) = &panel.export_error {
        ui.label(RichText::new(err).color(Color32::RED));
    }
    if let Some(file) = &panel.export {
        let label = format!("⬇ Download {}", file.file_name);
        if ui.button(label).on_hover_text(file.mime_type()).clicked() {
            save(&file.file_name, &file.format.to_string(), &file.bytes, status_message);
        }
    }
}

fn save(name: &str, filter: &str, bytes: &[u8], status_message: &mut Option<String>) {
    match dialogs::save_bytes(name, filter, bytes) {
        Ok(Some(path)) => *status_message = Some(format!("Saved {}", path.display())),
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to save {name}: {e:#}");
            *status_message = Some(format!("Error: {e:#}"));
        }
    }
}

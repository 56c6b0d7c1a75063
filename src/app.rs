use eframe::egui;

use crate::config::Settings;
use crate::state::AppState;
use crate::ui::{dialogs, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataSweeperApp {
    pub state: AppState,
}

impl DataSweeperApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for DataSweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Drag & drop uploads ----
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            dialogs::upload_dropped(&mut self.state, dropped);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: one section per file ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::file_list(ui, &mut self.state);
        });
    }
}

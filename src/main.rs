mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::DataSweeperApp;
use config::Settings;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::default();
    let [w, h] = settings.window_size;
    let [min_w, min_h] = settings.min_window_size;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w, h])
            .with_min_inner_size([min_w, min_h])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    log::info!("Starting Data Sweeper");
    eframe::run_native(
        "Data Sweeper",
        options,
        Box::new(|_cc| Ok(Box::new(DataSweeperApp::new(settings)))),
    )
}

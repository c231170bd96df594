//! Civis labeler entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod message;
mod state;
mod ui;
mod util;
mod viewer;
mod views;

use app::LabelerApp;
use civis_io::{resolve_config_path, LabelerConfig};
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config_path = resolve_config_path(None);
    let config = match LabelerConfig::load(&config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("{e}; session names cannot be resolved until a config is present");
            None
        }
    };

    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Civis Labeler",
        opts,
        Box::new(|cc| {
            ui::theme::configure_style(&cc.egui_ctx);
            Ok(Box::new(LabelerApp::new(config)))
        }),
    )
}

mod analysis;
mod app;
mod chart;
mod chat;
mod color;
mod data;
mod error;
mod session;
mod ui;

use app::CompressorLabApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Compressor Lab – Performance Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CompressorLabApp::default()))),
    )
}

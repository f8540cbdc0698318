mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::OildashApp;
use data::loader;
use data::model::Dataset;
use eframe::egui;
use state::AppState;

/// Fixed source workbook path.  Loaded exactly once per process; a changed
/// file on disk is not reflected mid-session.
const SOURCE_PATH: &str = "data/orders.xlsx";

/// Optional logo asset; absence degrades to a warning, not a failure.
pub const LOGO_PATH: &str = "assets/logo.png";

fn main() -> eframe::Result {
    env_logger::init();

    let (dataset, status_message) = match loader::load(Path::new(SOURCE_PATH)) {
        Ok(dataset) => {
            log::info!(
                "loaded {} orders from {SOURCE_PATH} ({:?})",
                dataset.len(),
                dataset.schema
            );
            (dataset, None)
        }
        Err(err) => {
            // Recoverable: the dashboard runs with nothing to display.
            log::error!("{err}");
            (Dataset::empty(), Some(err.to_string()))
        }
    };

    if !Path::new(LOGO_PATH).exists() {
        log::warn!("logo file '{LOGO_PATH}' not found");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Oildash – Operational Intelligence",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the logo from disk.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(OildashApp::new(AppState::new(
                dataset,
                status_message,
            ))))
        }),
    )
}

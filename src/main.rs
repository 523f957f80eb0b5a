mod app;
mod state;
mod ui;

use app::CohortViewApp;
use cohort_view::config::ViewerConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::from_env().unwrap_or_else(|e| {
        log::error!("Ignoring viewer config: {e:#}");
        ViewerConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cohort View – Selection Diagnostics",
        options,
        Box::new(|_cc| Ok(Box::new(CohortViewApp::new(config)))),
    )
}

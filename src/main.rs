mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use anyhow::{Result, anyhow};
use app::CuratorApp;
use config::CuratorConfig;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    let mut config = CuratorConfig::discover()?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.data_path = Some(path.into());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "BSRN Curator – outlier censoring",
        options,
        Box::new(|_cc| Ok(Box::new(CuratorApp::new(config)))),
    )
    .map_err(|e| anyhow!("running UI: {e}"))
}

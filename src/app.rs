use eframe::egui;

use crate::config::CuratorConfig;
use crate::state::{AppState, ViewMode};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CuratorApp {
    pub state: AppState,
}

impl CuratorApp {
    /// Build the app, opening the configured data file if there is one.
    pub fn new(config: CuratorConfig) -> Self {
        let data_path = config.data_path.clone();
        let mut state = AppState::new(config);
        if let Some(path) = data_path {
            state.open_file(&path);
        }
        Self { state }
    }
}

impl eframe::App for CuratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.state.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: windows, group, variables ----
        egui::SidePanel::left("selection_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart or censored table ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.mode {
            ViewMode::Chart => plot::series_plot(ui, &self.state),
            ViewMode::Table => table::censored_preview(ui, &mut self.state),
        });
    }
}

use eframe::egui::{self, Color32, ScrollArea, Ui};

use crate::data::export::TIMESTAMP_FORMAT;
use crate::state::AppState;
use crate::ui::panels::export_file_dialog;

const PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Censored table preview (central panel, table mode)
// ---------------------------------------------------------------------------

/// Show the first rows of the censored view and the export button.
pub fn censored_preview(ui: &mut Ui, state: &mut AppState) {
    let Some(censored) = &state.censored else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view data  (File → Open…)");
        });
        return;
    };

    ui.heading("Data with censoring applied");

    match &state.selection {
        Ok(selection) => {
            ScrollArea::both().max_height(400.0).show(ui, |ui: &mut Ui| {
                egui::Grid::new("censored_preview")
                    .striped(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.strong(censored.timestamp_column.as_str());
                        for name in &selection.present {
                            ui.strong(name.as_str());
                        }
                        ui.end_row();

                        for (i, ts) in censored.timestamps.iter().take(PREVIEW_ROWS).enumerate() {
                            ui.label(ts.format(TIMESTAMP_FORMAT).to_string());
                            for name in &selection.present {
                                let cell = censored
                                    .column(name)
                                    .map(|values| values[i])
                                    .filter(|v| !v.is_nan())
                                    .map(|v| v.to_string())
                                    .unwrap_or_default();
                                ui.label(cell);
                            }
                            ui.end_row();
                        }
                    });
            });
        }
        Err(e) => {
            ui.colored_label(Color32::YELLOW, e.to_string());
        }
    }

    ui.add_space(8.0);
    ui.label(format!(
        "{} rows will be exported as '{}'",
        censored.len(),
        state.file_name
    ));
    if ui.button("Download censored data as CSV").clicked() {
        export_file_dialog(state);
    }
}

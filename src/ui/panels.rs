use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export::write_export;
use crate::state::{AppState, DateTimeInput, ViewMode, WindowInput};

// ---------------------------------------------------------------------------
// Left side panel – selection and censoring widgets
// ---------------------------------------------------------------------------

/// Render the left panel: view window, censor window, group and variables.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selection & censoring");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= window_picker(ui, "view_window", "View window", &mut state.view_window);
            ui.separator();
            changed |= window_picker(ui, "censor_window", "Censor window", &mut state.censor_window);
            ui.separator();

            // ---- Group selector ----
            ui.strong("Group");
            let names: Vec<String> = state.groups.iter().map(|g| g.name.clone()).collect();
            let mut picked: Option<String> = None;
            egui::ComboBox::from_id_salt("group")
                .selected_text(state.selected_group.as_str())
                .show_ui(ui, |ui: &mut Ui| {
                    for name in &names {
                        if ui
                            .selectable_label(state.selected_group == *name, name)
                            .clicked()
                        {
                            picked = Some(name.clone());
                        }
                    }
                });
            if let Some(group) = picked {
                state.select_group(&group);
            }
            ui.separator();

            // ---- Variables of the group ----
            let options = state.groups.columns(&state.selected_group).to_vec();
            ui.strong(format!(
                "Variables  ({}/{})",
                state.selected_vars.len(),
                options.len()
            ));
            if state.group_is_editable() {
                let mut toggled: Option<String> = None;
                for var in &options {
                    let mut checked = state.selected_vars.contains(var);
                    let text = RichText::new(var).color(state.color_map.color_for(var));
                    if ui.checkbox(&mut checked, text).changed() {
                        toggled = Some(var.clone());
                    }
                }
                if let Some(var) = toggled {
                    state.toggle_variable(&var);
                }
            } else {
                ui.label("Every column is selected.");
            }

            match &state.selection {
                Ok(sel) if !sel.missing.is_empty() => {
                    ui.weak(format!("Not in data: {}", sel.missing.join(", ")));
                }
                Ok(_) => {}
                Err(e) => {
                    ui.colored_label(Color32::YELLOW, e.to_string());
                }
            }
            ui.separator();

            ui.strong("Export file name");
            ui.text_edit_singleline(&mut state.file_name);
        });

    if changed {
        state.recompute();
    }
}

fn window_picker(ui: &mut Ui, id: &str, title: &str, window: &mut WindowInput) -> bool {
    let mut changed = false;
    ui.strong(title);
    egui::Grid::new(id).num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Start");
        changed |= datetime_input(ui, &format!("{id}_start"), &mut window.start);
        ui.end_row();
        ui.label("End");
        changed |= datetime_input(ui, &format!("{id}_end"), &mut window.end);
        ui.end_row();
    });
    changed
}

fn datetime_input(ui: &mut Ui, id: &str, input: &mut DateTimeInput) -> bool {
    ui.horizontal(|ui: &mut Ui| {
        let mut changed = ui
            .add(DatePickerButton::new(&mut input.date).id_salt(id))
            .changed();
        changed |= ui
            .add(DragValue::new(&mut input.hour).range(0..=23))
            .changed();
        ui.label(":");
        changed |= ui
            .add(DragValue::new(&mut input.minute).range(0..=59))
            .changed();
        changed
    })
    .inner
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.censored.is_some(), egui::Button::new("Export…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!("{} rows loaded, {} in view", ds.len(), view.len()));
        }

        ui.separator();

        let toggle_label = match state.mode {
            ViewMode::Chart => "Show table / export",
            ViewMode::Table => "Show chart",
        };
        if ui.button(toggle_label).clicked() {
            state.toggle_mode();
        }

        let theme_label = if state.dark_mode { "Light mode" } else { "Dark mode" };
        if ui.button(theme_label).clicked() {
            state.dark_mode = !state.dark_mode;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open observation data")
        .add_filter("Delimited text", &["csv", "dat", "txt"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}

/// Ask where to save the censored view and write it there.
pub fn export_file_dialog(state: &mut AppState) {
    let bytes = match state.export_bytes() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return,
        Err(e) => {
            log::error!("Failed to serialize export: {e}");
            state.status_message = Some(format!("Error: {e}"));
            return;
        }
    };

    let file = rfd::FileDialog::new()
        .set_title("Export censored data")
        .set_file_name(&state.file_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match write_export(&path, &bytes) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to write export: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

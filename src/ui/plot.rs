use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, VLine};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Time axis
// ---------------------------------------------------------------------------

/// Plot x coordinate: seconds since the Unix epoch.
pub fn to_plot_x(ts: &NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

pub fn format_plot_x(x: f64) -> String {
    DateTime::from_timestamp(x.round() as i64, 0)
        .map(|dt| dt.naive_utc().format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Split a series into runs of present values; a missing value breaks the line.
pub fn segments(timestamps: &[NaiveDateTime], values: &[f64]) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (ts, &v) in timestamps.iter().zip(values) {
        if v.is_nan() {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            current.push([to_plot_x(ts), v]);
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

// ---------------------------------------------------------------------------
// Multi-line chart (central panel)
// ---------------------------------------------------------------------------

/// Render the selected variables over the view window. The censor window is
/// marked with two vertical lines.
pub fn series_plot(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view data  (File → Open…)");
        });
        return;
    };

    let selection = match &state.selection {
        Ok(sel) => sel,
        Err(e) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.colored_label(Color32::YELLOW, e.to_string());
            });
            return;
        }
    };

    if view.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No rows inside the view window");
        });
        return;
    }

    let censor = state.censor_window.window();

    Plot::new("series_plot")
        .legend(Legend::default())
        .x_axis_label("Time")
        .x_axis_formatter(|mark, _range| format_plot_x(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for name in &selection.present {
                let Some(values) = view.column(name) else {
                    continue;
                };
                let color = state.color_map.color_for(name);

                for run in segments(&view.timestamps, values) {
                    let line = Line::new(PlotPoints::from(run))
                        .name(name)
                        .color(color)
                        .width(1.5);
                    plot_ui.line(line);
                }
            }

            if !censor.is_inverted() {
                for edge in [censor.start, censor.end] {
                    plot_ui.vline(
                        VLine::new(to_plot_x(&edge))
                            .name("Censor window")
                            .color(Color32::RED),
                    );
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn missing_values_split_lines() {
        let ts = vec![at(0), at(1), at(2), at(3), at(4)];
        let runs = segments(&ts, &[1.0, f64::NAN, 2.0, 3.0, f64::NAN]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![[to_plot_x(&at(0)), 1.0]]);
        assert_eq!(runs[1].len(), 2);
        assert!(segments(&ts, &[f64::NAN; 5]).is_empty());
    }

    #[test]
    fn axis_labels_round_trip_epoch_seconds() {
        assert_eq!(format_plot_x(to_plot_x(&at(13))), "01-01 13:00");
    }
}

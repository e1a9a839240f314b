use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::color::ColorMap;
use crate::config::CuratorConfig;
use crate::data::export::export_csv;
use crate::data::filter::{Selection, censor, filter_by_time, resolve_selection};
use crate::data::groups::{ALL_VARIABLES_GROUP, VariableGroups, compute_groups};
use crate::data::loader::load_file;
use crate::data::model::{ObservationTable, TimeWindow};
use crate::error::{ExportError, SelectionError};

// ---------------------------------------------------------------------------
// Window inputs
// ---------------------------------------------------------------------------

/// A date plus hour and minute, as edited in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeInput {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
}

impl DateTimeInput {
    fn at_second(&self, second: u32) -> NaiveDateTime {
        self.date
            .and_hms_opt(self.hour.min(23), self.minute.min(59), second)
            .unwrap_or_else(|| self.date.and_time(chrono::NaiveTime::MIN))
    }
}

/// Start and end pickers for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInput {
    pub start: DateTimeInput,
    pub end: DateTimeInput,
}

impl WindowInput {
    /// Whole days from `first` to `last`, 00:00 through 23:59.
    pub fn spanning(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: DateTimeInput { date: first, hour: 0, minute: 0 },
            end: DateTimeInput { date: last, hour: 23, minute: 59 },
        }
    }

    /// The end minute is inclusive up to its last second.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start.at_second(0), self.end.at_second(59))
    }

    /// Keep both dates inside the loaded data's range.
    pub fn clamp_dates(&mut self, first: NaiveDate, last: NaiveDate) {
        self.start.date = self.start.date.clamp(first, last);
        self.end.date = self.end.date.clamp(first, last);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Chart,
    Table,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: CuratorConfig,

    /// Loaded table (None until a file is opened). Never modified after load.
    pub dataset: Option<Arc<ObservationTable>>,
    pub source_path: Option<PathBuf>,
    /// Groups computed for `dataset`.
    pub groups: VariableGroups,

    pub view_window: WindowInput,
    pub censor_window: WindowInput,
    pub selected_group: String,
    /// Variables the analyst picked; starts as the group's members.
    pub selected_vars: Vec<String>,
    /// Suggested name for the exported file.
    pub file_name: String,

    pub mode: ViewMode,
    pub dark_mode: bool,

    /// Rows inside the view window (cached).
    pub view: Option<ObservationTable>,
    /// `view` with the censor window blanked (cached).
    pub censored: Option<ObservationTable>,
    /// Selection checked against `view` (cached).
    pub selection: Result<Selection, SelectionError>,

    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: CuratorConfig) -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            file_name: config.export_file_name.clone(),
            config,
            dataset: None,
            source_path: None,
            groups: VariableGroups::default(),
            view_window: WindowInput::spanning(today, today),
            censor_window: WindowInput::spanning(today, today),
            selected_group: String::new(),
            selected_vars: Vec::new(),
            mode: ViewMode::Chart,
            dark_mode: true,
            view: None,
            censored: None,
            selection: Err(SelectionError::EmptySelection),
            color_map: ColorMap::default(),
            status_message: None,
        }
    }

    /// Load `path` with the configured options. On failure the current
    /// dataset stays in place and the error goes to the status bar.
    pub fn open_file(&mut self, path: &Path) {
        match load_file(path, &self.config.load_options()) {
            Ok(table) => {
                self.set_dataset(table);
                self.source_path = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded table: groups, full-range windows, first group.
    pub fn set_dataset(&mut self, table: ObservationTable) {
        self.groups = compute_groups(&table, &self.config.groups, &self.config.average_suffix);
        self.color_map = ColorMap::new(&table.variable_names());

        if let Some((min, max)) = table.time_bounds() {
            self.view_window = WindowInput::spanning(min.date(), max.date());
            self.censor_window = self.view_window;
        }

        self.dataset = Some(Arc::new(table));
        self.status_message = None;

        let first = self.groups.names().first().map(|g| g.to_string());
        match first {
            Some(group) => self.select_group(&group),
            None => self.recompute(),
        }
    }

    /// Date range of the loaded data, for the pickers.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (min, max) = self.dataset.as_ref()?.time_bounds()?;
        Some((min.date(), max.date()))
    }

    /// Switch group and preselect all of its members.
    pub fn select_group(&mut self, name: &str) {
        self.selected_group = name.to_string();
        self.selected_vars = self.groups.columns(name).to_vec();
        self.recompute();
    }

    /// `All variables` always uses every column; other groups are editable.
    pub fn group_is_editable(&self) -> bool {
        self.selected_group != ALL_VARIABLES_GROUP
    }

    pub fn toggle_variable(&mut self, name: &str) {
        if let Some(pos) = self.selected_vars.iter().position(|v| v == name) {
            self.selected_vars.remove(pos);
        } else {
            // Keep the group's order rather than click order.
            let order = self.groups.columns(&self.selected_group);
            self.selected_vars.push(name.to_string());
            self.selected_vars
                .sort_by_key(|v| order.iter().position(|c| c == v).unwrap_or(usize::MAX));
        }
        self.recompute();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ViewMode::Chart => ViewMode::Table,
            ViewMode::Table => ViewMode::Chart,
        };
    }

    /// Recompute view, selection and censored copy from the base table.
    pub fn recompute(&mut self) {
        let Some(base) = &self.dataset else {
            return;
        };
        if let Some((first, last)) = self.date_bounds() {
            self.view_window.clamp_dates(first, last);
            self.censor_window.clamp_dates(first, last);
        }

        let view = filter_by_time(base, &self.view_window.window());
        self.selection = resolve_selection(&view, &self.selected_vars);
        let present: &[String] = match &self.selection {
            Ok(sel) => &sel.present,
            Err(_) => &[],
        };
        self.censored = Some(censor(&view, &self.censor_window.window(), present));
        self.view = Some(view);
    }

    /// Serialized censored view, every column included.
    pub fn export_bytes(&self) -> Result<Option<Vec<u8>>, ExportError> {
        let Some(censored) = &self.censored else {
            return Ok(None);
        };
        export_csv(censored, &censored.variable_names(), &self.config.export_options()).map(Some)
    }
}

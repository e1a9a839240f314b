use super::model::{ObservationTable, TimeWindow};
use crate::error::SelectionError;

// ---------------------------------------------------------------------------
// Time filtering
// ---------------------------------------------------------------------------

/// Return indices of rows whose timestamp lies in `window`.
///
/// Rows are scanned in table order; nothing assumes they are sorted.
pub fn time_indices(table: &ObservationTable, window: &TimeWindow) -> Vec<usize> {
    if window.is_inverted() {
        return Vec::new();
    }
    table
        .timestamps
        .iter()
        .enumerate()
        .filter(|(_, ts)| window.contains(ts))
        .map(|(i, _)| i)
        .collect()
}

/// The rows of `table` inside `window`, as a new table.
pub fn filter_by_time(table: &ObservationTable, window: &TimeWindow) -> ObservationTable {
    table.select_rows(&time_indices(table, window))
}

// ---------------------------------------------------------------------------
// Censoring
// ---------------------------------------------------------------------------

/// Copy of `table` where every listed variable is blanked on the rows inside
/// `window`.
///
/// Names not in the table are ignored, so a stale selection from another
/// group never fails. Re-censoring already blank cells changes nothing.
pub fn censor(table: &ObservationTable, window: &TimeWindow, variables: &[String]) -> ObservationTable {
    let mut out = table.clone();
    let rows = time_indices(table, window);
    if rows.is_empty() {
        return out;
    }

    for name in variables {
        match out.column_mut(name) {
            Some(values) => {
                for &i in &rows {
                    values[i] = f64::NAN;
                }
            }
            None => log::debug!("Censor: ignoring unknown column {name}"),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Selection validation
// ---------------------------------------------------------------------------

/// A variable selection checked against a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    /// Requested names present in the table, in request order.
    pub present: Vec<String>,
    /// Requested names the table does not have.
    pub missing: Vec<String>,
}

/// Split `requested` into present and missing columns.
///
/// Missing names are dropped quietly; only a selection left with nothing
/// valid is reported, as [`SelectionError::EmptySelection`].
pub fn resolve_selection(
    table: &ObservationTable,
    requested: &[String],
) -> Result<Selection, SelectionError> {
    let mut selection = Selection::default();
    for name in requested {
        if table.has_column(name) {
            if !selection.present.contains(name) {
                selection.present.push(name.clone());
            }
        } else {
            selection.missing.push(name.clone());
        }
    }

    if !selection.missing.is_empty() {
        log::debug!("Selection: dropping absent columns {:?}", selection.missing);
    }
    if selection.present.is_empty() {
        return Err(SelectionError::EmptySelection);
    }
    Ok(selection)
}

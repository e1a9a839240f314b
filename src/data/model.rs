use std::collections::BTreeSet;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// TimeWindow – inclusive timestamp range
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range of timestamps.
///
/// Nothing prevents `start > end`; such a window simply contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.start <= *ts && *ts <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

// ---------------------------------------------------------------------------
// Column – one named numeric series
// ---------------------------------------------------------------------------

/// A numeric column. Missing values are `NaN`, never zero.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// ObservationTable – the loaded dataset
// ---------------------------------------------------------------------------

/// Time-indexed sensor table, stored column-major.
///
/// Rows keep the order they were read in. Timestamps may repeat.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    /// Header name of the timestamp column (used again on export).
    pub timestamp_column: String,
    pub timestamps: Vec<NaiveDateTime>,
    /// Numeric columns in file order, derived columns appended last.
    pub columns: Vec<Column>,
    /// Columns already holding Kelvin, converted on load or marked so in the file.
    pub kelvin: BTreeSet<String>,
}

impl ObservationTable {
    /// An empty table with only the timestamp axis filled in.
    pub fn new(timestamp_column: impl Into<String>, timestamps: Vec<NaiveDateTime>) -> Self {
        Self {
            timestamp_column: timestamp_column.into(),
            timestamps,
            columns: Vec::new(),
            kelvin: BTreeSet::new(),
        }
    }

    /// Add a column, or replace the values of an existing one with the same name.
    ///
    /// `values` must have one entry per row.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.timestamps.len());
        let name = name.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.values = values,
            None => self.columns.push(Column { name, values }),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.values)
    }

    /// Names of all non-timestamp columns, in table order.
    pub fn variable_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Earliest and latest timestamp, used to bound the window pickers.
    ///
    /// Rows are not guaranteed sorted, so this scans every row.
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.timestamps.iter().min()?;
        let max = self.timestamps.iter().max()?;
        Some((*min, *max))
    }

    /// Copy of the table restricted to the given row indices, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let timestamps = indices.iter().map(|&i| self.timestamps[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i]).collect(),
            })
            .collect();
        Self {
            timestamp_column: self.timestamp_column.clone(),
            timestamps,
            columns,
            kelvin: self.kelvin.clone(),
        }
    }
}

/// Cell-wise equality where two missing values compare equal.
impl PartialEq for ObservationTable {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp_column == other.timestamp_column
            && self.timestamps == other.timestamps
            && self.kelvin == other.kelvin
            && self.columns.len() == other.columns.len()
            && self.columns.iter().zip(&other.columns).all(|(a, b)| {
                a.name == b.name
                    && a.values.len() == b.values.len()
                    && a.values
                        .iter()
                        .zip(&b.values)
                        .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
            })
    }
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
    fn window_is_inclusive_and_inverted_contains_nothing() {
        let w = TimeWindow::new(at(6), at(12));
        assert!(w.contains(&at(6)));
        assert!(w.contains(&at(12)));
        assert!(!w.contains(&at(18)));

        let inverted = TimeWindow::new(at(12), at(6));
        assert!(inverted.is_inverted());
        assert!(!inverted.contains(&at(6)));
        assert!(!inverted.contains(&at(9)));
    }

    #[test]
    fn time_bounds_scans_unsorted_rows() {
        let t = ObservationTable::new("TIMESTAMP", vec![at(12), at(0), at(18), at(6)]);
        assert_eq!(t.time_bounds(), Some((at(0), at(18))));
        assert_eq!(ObservationTable::new("TIMESTAMP", vec![]).time_bounds(), None);
    }

    #[test]
    fn set_column_replaces_existing() {
        let mut t = ObservationTable::new("TIMESTAMP", vec![at(0), at(1)]);
        t.set_column("A", vec![1.0, 2.0]);
        t.set_column("A", vec![3.0, 4.0]);
        assert_eq!(t.columns.len(), 1);
        assert_eq!(t.column("A"), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn equality_treats_missing_as_equal() {
        let mut a = ObservationTable::new("TIMESTAMP", vec![at(0)]);
        a.set_column("A", vec![f64::NAN]);
        let b = a.clone();
        assert_eq!(a, b);

        let mut c = a.clone();
        c.set_column("A", vec![0.0]);
        assert_ne!(a, c);
    }
}

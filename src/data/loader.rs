use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use super::derive;
use super::model::ObservationTable;
use crate::error::LoadError;

/// Timestamp layouts tried in order. Logger exports use the first one.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// How to read an observation file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Header of the column holding the timestamps.
    pub timestamp_column: String,
    /// Field separator.
    pub delimiter: u8,
    /// Celsius columns converted to Kelvin after reading.
    pub kelvin_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timestamp_column: "TIMESTAMP".to_string(),
            delimiter: b',',
            kelvin_columns: derive::DEFAULT_KELVIN_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an observation table from a delimited file.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<ObservationTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_reader(file, options)?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

/// Parse delimited text into an [`ObservationTable`], then apply the unit
/// conversions and derived columns.
///
/// Cells that are blank or not numbers become NaN. Only structural problems
/// (unreadable input, no timestamp column, unparseable timestamp) fail.
pub fn load_reader<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<ObservationTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let ts_idx = headers
        .iter()
        .position(|h| *h == options.timestamp_column)
        .ok_or_else(|| LoadError::MissingTimestampColumn(options.timestamp_column.clone()))?;

    let (names, kelvin) = column_names(&headers, ts_idx);
    let value_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .map(|(i, _)| i)
        .filter(|i| *i != ts_idx)
        .zip(names)
        .collect();

    let mut timestamps = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); value_cols.len()];

    for result in reader.records() {
        let record = result?;
        let raw_ts = record.get(ts_idx).unwrap_or("");
        let ts = parse_timestamp(raw_ts).ok_or_else(|| LoadError::BadTimestamp {
            line: record.position().map(|p| p.line()).unwrap_or(0),
            value: raw_ts.to_string(),
        })?;
        timestamps.push(ts);

        for (column, (idx, _)) in values.iter_mut().zip(&value_cols) {
            column.push(parse_cell(record.get(*idx).unwrap_or("")));
        }
    }

    let mut table = ObservationTable::new(options.timestamp_column.clone(), timestamps);
    for ((_, name), column) in value_cols.into_iter().zip(values) {
        table.set_column(name, column);
    }
    table.kelvin = kelvin;

    derive::convert_to_kelvin(&mut table, &options.kelvin_columns);
    derive::add_derived_columns(&mut table);

    Ok(table)
}

// -- Header handling --

/// Names for the non-timestamp headers, in order, plus those marked as Kelvin.
///
/// A trailing [`derive::KELVIN_MARKER`] is stripped. A repeated name gets a
/// `.1`, `.2`, ... suffix so no column is lost.
fn column_names(headers: &[String], ts_idx: usize) -> (Vec<String>, BTreeSet<String>) {
    let mut used: HashSet<String> = HashSet::new();
    used.insert(headers[ts_idx].clone());

    let mut names = Vec::with_capacity(headers.len().saturating_sub(1));
    let mut kelvin = BTreeSet::new();

    for (i, header) in headers.iter().enumerate() {
        if i == ts_idx {
            continue;
        }
        let (base, is_kelvin) = match header.strip_suffix(derive::KELVIN_MARKER) {
            Some(stripped) => (stripped.trim_end(), true),
            None => (header.as_str(), false),
        };

        let mut name = base.to_string();
        let mut n = 1;
        while used.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        if name != base {
            log::warn!("Duplicate column {base} renamed to {name}");
        }

        used.insert(name.clone());
        if is_kelvin {
            kelvin.insert(name.clone());
        }
        names.push(name);
    }
    (names, kelvin)
}

// -- Cell parsing --

/// Parse a timestamp cell against the accepted layouts.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Numeric cell, coerced to NaN when blank, unparseable or infinite.
fn parse_cell(s: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn plain() -> LoadOptions {
        LoadOptions {
            kelvin_columns: Vec::new(),
            ..LoadOptions::default()
        }
    }

    #[test]
    fn coerces_bad_cells_to_missing() {
        let csv = "TIMESTAMP,A,B\n\
                   2023-01-01 00:00:00,1.5,NAN\n\
                   2023-01-01 00:01:00,,abc\n\
                   2023-01-01 00:02:00,3\n";
        let t = load_reader(csv.as_bytes(), &plain()).unwrap();

        assert_eq!(t.len(), 3);
        assert_eq!(t.variable_names(), vec!["A", "B"]);
        let a = t.column("A").unwrap();
        assert_eq!(a[0], 1.5);
        assert!(a[1].is_nan());
        assert_eq!(a[2], 3.0);
        assert!(t.column("B").unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn infinities_become_missing() {
        let csv = "TIMESTAMP,A\n2023-01-01 00:00:00,inf\n2023-01-01 00:01:00,-Infinity\n";
        let t = load_reader(csv.as_bytes(), &plain()).unwrap();
        assert!(t.column("A").unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn repeated_headers_keep_every_column() {
        let csv = "TIMESTAMP,A,A,B,A\n2023-01-01 00:00:00,1,2,3,4\n";
        let t = load_reader(csv.as_bytes(), &plain()).unwrap();
        assert_eq!(t.variable_names(), vec!["A", "A.1", "B", "A.2"]);
        assert_eq!(t.column("A").unwrap()[0], 1.0);
        assert_eq!(t.column("A.1").unwrap()[0], 2.0);
        assert_eq!(t.column("A.2").unwrap()[0], 4.0);
    }

    #[test]
    fn kelvin_marked_headers_are_not_converted_again() {
        let csv = "TIMESTAMP,CRPTemp_Avg[K],UVTEMP_Avg\n2023-01-01 00:00:00,293.15,25\n";
        let t = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(t.variable_names(), vec!["CRPTemp_Avg", "UVTEMP_Avg"]);
        assert_eq!(t.column("CRPTemp_Avg").unwrap()[0], 293.15);
        assert!((t.column("UVTEMP_Avg").unwrap()[0] - 298.15).abs() < 1e-9);
        assert!(t.kelvin.contains("CRPTemp_Avg"));
        assert!(t.kelvin.contains("UVTEMP_Avg"));
    }

    #[test]
    fn keeps_row_order_and_duplicates() {
        let csv = "TIMESTAMP,A\n\
                   2023-01-01 12:00:00,1\n\
                   2023-01-01 06:00:00,2\n\
                   2023-01-01 06:00:00,3\n";
        let t = load_reader(csv.as_bytes(), &plain()).unwrap();
        let hours: Vec<String> = t
            .timestamps
            .iter()
            .map(|ts| ts.format("%H").to_string())
            .collect();
        assert_eq!(hours, vec!["12", "06", "06"]);
    }

    #[test]
    fn timestamp_column_may_sit_anywhere() {
        let csv = "A,TIMESTAMP\n7,2023-01-01T00:00:00\n";
        let t = load_reader(csv.as_bytes(), &plain()).unwrap();
        assert_eq!(t.variable_names(), vec!["A"]);
        assert_eq!(t.column("A").unwrap()[0], 7.0);
    }

    #[test]
    fn missing_timestamp_column_fails() {
        let csv = "TIME,A\n2023-01-01 00:00:00,1\n";
        let err = load_reader(csv.as_bytes(), &plain()).unwrap_err();
        assert!(matches!(err, LoadError::MissingTimestampColumn(ref c) if c == "TIMESTAMP"));
    }

    #[test]
    fn unparseable_timestamp_reports_line() {
        let csv = "TIMESTAMP,A\n2023-01-01 00:00:00,1\nyesterday,2\n";
        let err = load_reader(csv.as_bytes(), &plain()).unwrap_err();
        match err {
            LoadError::BadTimestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn accepts_common_timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 31)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        for raw in [
            "2023-01-31 13:45:00",
            "2023-01-31T13:45:00",
            "2023-01-31 13:45",
            "2023/01/31 13:45:00",
            "31/01/2023 13:45",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(
            parse_timestamp("2023-01-31"),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn applies_kelvin_and_derived_columns() {
        let csv = "TIMESTAMP,CRPTemp_Avg,GLOBAL_Avg,GH_CALC_Avg\n\
                   2023-01-01 12:00:00,20,500,510\n";
        let t = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert!((t.column("CRPTemp_Avg").unwrap()[0] - 293.15).abs() < 1e-9);
        assert_eq!(t.column("dif_GH_CALC_GLOBAL").unwrap()[0], 10.0);
        assert!(t.column("sum_SW").is_none());
    }

    #[test]
    fn semicolon_delimiter() {
        let csv = "TIMESTAMP;A\n2023-01-01 00:00:00;4.25\n";
        let opts = LoadOptions {
            delimiter: b';',
            ..plain()
        };
        let t = load_reader(csv.as_bytes(), &opts).unwrap();
        assert_eq!(t.column("A").unwrap()[0], 4.25);
    }

    #[test]
    fn load_file_reads_from_disk_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "TIMESTAMP,A").unwrap();
        writeln!(f, "2023-01-01 00:00:00,1").unwrap();
        drop(f);

        let t = load_file(&path, &plain()).unwrap();
        assert_eq!(t.len(), 1);

        let err = load_file(&dir.path().join("absent.csv"), &plain()).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }
}

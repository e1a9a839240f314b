use std::io::Write;
use std::path::Path;

use super::derive::KELVIN_MARKER;
use super::model::ObservationTable;
use crate::error::ExportError;

/// Layout used for the timestamp column. Sub-second digits only when present.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// How numbers and fields are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// `None` writes the shortest text that reads back to the identical
    /// `f64`; `Some(n)` rounds to `n` decimals.
    pub decimals: Option<usize>,
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            decimals: None,
            delimiter: b',',
        }
    }
}

/// Serialize `table` as delimited text: the timestamp column, then `columns`
/// in the given order. Unknown column names are left out. Missing and
/// non-finite values become empty fields. Kelvin columns carry
/// [`KELVIN_MARKER`] in their header so a reload does not convert them again.
///
/// Output is a pure function of its inputs, byte for byte.
pub fn export_csv(
    table: &ObservationTable,
    columns: &[String],
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let selected: Vec<(&str, &[f64])> = columns
        .iter()
        .filter_map(|name| match table.column(name) {
            Some(values) => Some((name.as_str(), values)),
            None => {
                log::debug!("Export: skipping unknown column {name}");
                None
            }
        })
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(Vec::new());

    let mut header = Vec::with_capacity(selected.len() + 1);
    header.push(table.timestamp_column.clone());
    header.extend(selected.iter().map(|(name, _)| {
        if table.kelvin.contains(*name) {
            format!("{name}{KELVIN_MARKER}")
        } else {
            name.to_string()
        }
    }));
    writer.write_record(&header)?;

    let mut row: Vec<String> = Vec::with_capacity(selected.len() + 1);
    for (i, ts) in table.timestamps.iter().enumerate() {
        row.clear();
        row.push(ts.format(TIMESTAMP_FORMAT).to_string());
        row.extend(
            selected
                .iter()
                .map(|(_, values)| format_value(values[i], options.decimals)),
        );
        writer.write_record(&row)?;
    }

    writer.flush().map_err(ExportError::Flush)?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(std::io::Error::other(e.to_string())))
}

/// Write exported bytes to `path`, replacing any existing file.
pub fn write_export(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let to_err = |source: std::io::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(to_err)?;
    file.write_all(bytes).map_err(to_err)?;
    log::info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn format_value(v: f64, decimals: Option<usize>) -> String {
    if !v.is_finite() {
        return String::new();
    }
    match decimals {
        Some(n) => format!("{v:.n$}"),
        None => v.to_string(),
    }
}

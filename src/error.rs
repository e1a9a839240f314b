use std::path::PathBuf;

use thiserror::Error;

/// Structural failures while reading an observation file.
///
/// Bad numeric cells never end up here: they are coerced to NaN.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing timestamp column '{0}'")]
    MissingTimestampColumn(String),

    #[error("line {line}: cannot parse timestamp '{value}'")]
    BadTimestamp { line: u64, value: String },
}

/// Nothing left to show once a selection is checked against the table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("none of the selected variables are present in the data")]
    EmptySelection,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("serializing export: {0}")]
    Csv(#[from] csv::Error),

    #[error("flushing export buffer: {0}")]
    Flush(std::io::Error),

    #[error("writing export to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

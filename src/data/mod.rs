/// Data layer: loading, grouping, filtering, censoring and export.
///
/// Architecture:
/// ```text
///   .csv (logger export)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ObservationTable, coerce cells to f64/NaN
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  °C → K, GH_CALC vs GLOBAL checks, shortwave sum
///   └──────────┘
///        │
///        ├──────────────► groups   column names → VariableGroups
///        ▼
///   ┌──────────┐
///   │  filter   │  view window → rows, censor window × variables → NaN
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  ObservationTable → delimited bytes
///   └──────────┘
/// ```
///
/// The loaded table is never modified after `loader` returns; every step
/// after it produces a new table.

pub mod derive;
pub mod export;
pub mod filter;
pub mod groups;
pub mod loader;
pub mod model;

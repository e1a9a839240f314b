use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::data::derive::DEFAULT_KELVIN_COLUMNS;
use crate::data::export::ExportOptions;
use crate::data::groups::{DEFAULT_AVERAGE_SUFFIX, GroupDefinition, default_group_definitions};
use crate::data::loader::LoadOptions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BSRN_CURATOR_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "curator.json";

// ---------------------------------------------------------------------------
// CuratorConfig
// ---------------------------------------------------------------------------

/// Settings read from `curator.json`. Every field is optional in the file.
///
/// ```json
/// {
///   "data_path": "BSRN_2023_ene.csv",
///   "delimiter": ";",
///   "export_decimals": 3,
///   "groups": [{ "name": "Radiation", "prefixes": ["GLOBAL", "DIFFUSE"] }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    /// File opened at startup.
    pub data_path: Option<PathBuf>,
    pub timestamp_column: String,
    /// Single-character field separator for both input and export.
    pub delimiter: char,
    pub average_suffix: String,
    pub kelvin_columns: Vec<String>,
    pub groups: Vec<GroupDefinition>,
    /// Suggested name in the export dialog.
    pub export_file_name: String,
    /// Fixed decimals on export; shortest exact form when absent.
    pub export_decimals: Option<usize>,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            timestamp_column: "TIMESTAMP".to_string(),
            delimiter: ',',
            average_suffix: DEFAULT_AVERAGE_SUFFIX.to_string(),
            kelvin_columns: DEFAULT_KELVIN_COLUMNS.iter().map(|c| c.to_string()).collect(),
            groups: default_group_definitions(),
            export_file_name: "censored_data.csv".to_string(),
            export_decimals: None,
        }
    }
}

impl CuratorConfig {
    /// Read and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// `$BSRN_CURATOR_CONFIG`, else `./curator.json` if it exists, else defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            bail!("delimiter {:?} clashes with CSV quoting or line endings", self.delimiter);
        }
        if self.timestamp_column.trim().is_empty() {
            bail!("timestamp_column must not be empty");
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            timestamp_column: self.timestamp_column.clone(),
            delimiter: self.delimiter as u8,
            kelvin_columns: self.kelvin_columns.clone(),
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            decimals: self.export_decimals,
            delimiter: self.delimiter as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curator.json");
        std::fs::write(&path, r#"{ "delimiter": ";", "export_decimals": 3 }"#).unwrap();

        let config = CuratorConfig::from_file(&path).unwrap();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.export_decimals, Some(3));
        assert_eq!(config.timestamp_column, "TIMESTAMP");
        assert_eq!(config.groups, default_group_definitions());

        assert_eq!(config.load_options().delimiter, b';');
        assert_eq!(config.export_options().decimals, Some(3));
    }

    #[test]
    fn custom_groups_replace_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curator.json");
        std::fs::write(
            &path,
            r#"{ "groups": [{ "name": "Radiation", "prefixes": ["GLOBAL", "DIFFUSE"] }] }"#,
        )
        .unwrap();

        let config = CuratorConfig::from_file(&path).unwrap();
        assert_eq!(config.groups, vec![GroupDefinition::new("Radiation", &["GLOBAL", "DIFFUSE"])]);
    }

    #[test]
    fn rejects_quote_and_line_break_delimiters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curator.json");

        for bad in [r#""\"""#, r#""\n""#, r#""\r""#] {
            std::fs::write(&path, format!(r#"{{ "delimiter": {bad} }}"#)).unwrap();
            let err = CuratorConfig::from_file(&path).unwrap_err();
            assert!(err.to_string().contains("delimiter"), "{bad}: {err:#}");
        }

        std::fs::write(&path, r#"{ "delimiter": "\t" }"#).unwrap();
        assert_eq!(CuratorConfig::from_file(&path).unwrap().delimiter, '\t');
    }

    #[test]
    fn rejects_non_ascii_delimiter_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curator.json");

        std::fs::write(&path, r#"{ "delimiter": "§" }"#).unwrap();
        assert!(CuratorConfig::from_file(&path).is_err());

        std::fs::write(&path, "{ not json").unwrap();
        let err = CuratorConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::derive::{DIF_GH_CALC_GLOBAL, RATIO_GH_CALC_GLOBAL, SUM_SW};
use super::model::ObservationTable;

/// Catch-all group for columns no fixed group claims.
pub const OTHER_GROUP: &str = "Other";
/// Every non-timestamp column.
pub const ALL_VARIABLES_GROUP: &str = "All variables";

/// Suffix the logger appends to averaged channels.
pub const DEFAULT_AVERAGE_SUFFIX: &str = "_Avg";

// ---------------------------------------------------------------------------
// Group definitions (configuration side)
// ---------------------------------------------------------------------------

/// A fixed group as configured: a name and the semantic prefixes it offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    pub prefixes: Vec<String>,
}

impl GroupDefinition {
    pub fn new(name: &str, prefixes: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// The station's standard groupings.
pub fn default_group_definitions() -> Vec<GroupDefinition> {
    vec![
        GroupDefinition::new("Basic parameters", &["GLOBAL", "DIRECT", "DIFFUSE", "GH_CALC"]),
        GroupDefinition::new("Shortwave balance", &["GLOBAL", "UPWARD_SW"]),
        GroupDefinition::new(
            "Longwave balance",
            &["DOWNWARD", "UPWARD_LW", "DWIRTEMP", "UWIRTEMP", "CRPTemp"],
        ),
        GroupDefinition::new(
            "Meteorology",
            &["CRPTemp", "RELATIVE_HUMIDITY", "PRESSURE", "DEW_POINT"],
        ),
        GroupDefinition::new("Ultraviolet", &["UVB", "UVTEMP", "UVSIGNAL"]),
        GroupDefinition::new("Dispersion", &[DIF_GH_CALC_GLOBAL, RATIO_GH_CALC_GLOBAL, SUM_SW]),
    ]
}

// ---------------------------------------------------------------------------
// Resolved groups (data side)
// ---------------------------------------------------------------------------

/// A named, ordered list of columns that actually exist in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableGroup {
    pub name: String,
    pub columns: Vec<String>,
}

/// All groups for one loaded table, in menu order:
/// fixed groups, then `Other`, then `All variables`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableGroups {
    groups: Vec<VariableGroup>,
}

impl VariableGroups {
    pub fn iter(&self) -> impl Iterator<Item = &VariableGroup> {
        self.groups.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Columns of the named group. Unknown names give an empty slice.
    pub fn columns(&self, name: &str) -> &[String] {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.columns.as_slice())
            .unwrap_or(&[])
    }
}

/// Map a semantic prefix onto a real column name.
///
/// `<prefix><suffix>` wins when present, then the bare prefix; otherwise `None`.
pub fn resolve_prefix(prefix: &str, suffix: &str, available: &HashSet<&str>) -> Option<String> {
    let averaged = format!("{prefix}{suffix}");
    if available.contains(averaged.as_str()) {
        Some(averaged)
    } else if available.contains(prefix) {
        Some(prefix.to_string())
    } else {
        None
    }
}

/// Resolve the configured groups against the table's columns and add the
/// derived `Other` and `All variables` groups.
pub fn compute_groups(
    table: &ObservationTable,
    definitions: &[GroupDefinition],
    suffix: &str,
) -> VariableGroups {
    let all: Vec<String> = table.variable_names();
    let available: HashSet<&str> = all.iter().map(String::as_str).collect();

    let mut claimed: HashSet<String> = HashSet::new();
    let mut groups = Vec::with_capacity(definitions.len() + 2);

    for def in definitions {
        let mut columns: Vec<String> = Vec::new();
        for prefix in &def.prefixes {
            match resolve_prefix(prefix, suffix, &available) {
                Some(col) if !columns.contains(&col) => columns.push(col),
                Some(_) => {}
                None => log::debug!("Group {}: no column for prefix {prefix}", def.name),
            }
        }
        claimed.extend(columns.iter().cloned());
        groups.push(VariableGroup {
            name: def.name.clone(),
            columns,
        });
    }

    let other = all.iter().filter(|c| !claimed.contains(*c)).cloned().collect();
    groups.push(VariableGroup {
        name: OTHER_GROUP.to_string(),
        columns: other,
    });
    groups.push(VariableGroup {
        name: ALL_VARIABLES_GROUP.to_string(),
        columns: all,
    });

    VariableGroups { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table_with(columns: &[&str]) -> ObservationTable {
        let ts = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut t = ObservationTable::new("TIMESTAMP", vec![ts]);
        for c in columns {
            t.set_column(*c, vec![1.0]);
        }
        t
    }

    #[test]
    fn averaged_column_preferred_then_bare_then_omitted() {
        let t = table_with(&["GLOBAL_Avg", "GLOBAL", "DIRECT", "BattV"]);
        let defs = vec![GroupDefinition::new("Basic", &["GLOBAL", "DIRECT", "DIFFUSE"])];
        let groups = compute_groups(&t, &defs, DEFAULT_AVERAGE_SUFFIX);

        assert_eq!(groups.columns("Basic"), &["GLOBAL_Avg", "DIRECT"]);
        assert_eq!(groups.columns(OTHER_GROUP), &["GLOBAL", "BattV"]);
        assert_eq!(
            groups.columns(ALL_VARIABLES_GROUP),
            &["GLOBAL_Avg", "GLOBAL", "DIRECT", "BattV"]
        );
    }

    #[test]
    fn menu_order_is_fixed_then_other_then_all() {
        let t = table_with(&["GLOBAL_Avg"]);
        let groups = compute_groups(&t, &default_group_definitions(), DEFAULT_AVERAGE_SUFFIX);
        let names = groups.names();
        assert_eq!(names.first(), Some(&"Basic parameters"));
        assert_eq!(&names[names.len() - 2..], &[OTHER_GROUP, ALL_VARIABLES_GROUP]);
    }

    #[test]
    fn other_is_empty_when_everything_is_claimed() {
        let t = table_with(&["GLOBAL_Avg", "DIRECT_Avg", "DIFFUSE_Avg", "GH_CALC_Avg"]);
        let groups = compute_groups(&t, &default_group_definitions(), DEFAULT_AVERAGE_SUFFIX);
        assert!(groups.columns(OTHER_GROUP).is_empty());
        assert!(groups.columns("Otros").is_empty());
    }

    #[test]
    fn all_variables_is_union_of_fixed_groups_and_other() {
        let t = table_with(&[
            "GLOBAL_Avg",
            "CRPTemp_Avg",
            "PRESSURE",
            "UVB_Avg",
            "BattV_Min",
            "PTemp_C",
            SUM_SW,
        ]);
        let groups = compute_groups(&t, &default_group_definitions(), DEFAULT_AVERAGE_SUFFIX);

        let all: HashSet<&String> = groups.columns(ALL_VARIABLES_GROUP).iter().collect();
        let union: HashSet<&String> = groups
            .iter()
            .filter(|g| g.name != ALL_VARIABLES_GROUP)
            .flat_map(|g| g.columns.iter())
            .collect();
        assert_eq!(all, union);

        // CRPTemp belongs to two fixed groups by design, never to Other.
        assert!(groups.columns("Longwave balance").contains(&"CRPTemp_Avg".to_string()));
        assert!(groups.columns("Meteorology").contains(&"CRPTemp_Avg".to_string()));
        assert_eq!(groups.columns(OTHER_GROUP), &["BattV_Min", "PTemp_C"]);
    }

    #[test]
    fn computing_twice_is_identical() {
        let t = table_with(&["B", "GLOBAL_Avg", "A", "UPWARD_SW_Avg"]);
        let defs = default_group_definitions();
        assert_eq!(
            compute_groups(&t, &defs, DEFAULT_AVERAGE_SUFFIX),
            compute_groups(&t, &defs, DEFAULT_AVERAGE_SUFFIX)
        );
    }
}

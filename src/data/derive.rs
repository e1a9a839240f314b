use super::model::ObservationTable;

pub const KELVIN_OFFSET: f64 = 273.15;

/// Header suffix written on exported Kelvin columns, e.g. `CRPTemp_Avg[K]`.
/// The loader strips it and does not convert that column again.
pub const KELVIN_MARKER: &str = "[K]";

/// Temperature channels logged in °C.
pub const DEFAULT_KELVIN_COLUMNS: &[&str] = &["CRPTemp_Avg", "UVTEMP_Avg", "DEW_POINT_Avg"];

pub const DIF_GH_CALC_GLOBAL: &str = "dif_GH_CALC_GLOBAL";
pub const RATIO_GH_CALC_GLOBAL: &str = "ratio_GH_CALC_GLOBAL";
pub const SUM_SW: &str = "sum_SW";

const GH_CALC: &str = "GH_CALC_Avg";
const GLOBAL: &str = "GLOBAL_Avg";
const DIFFUSE: &str = "DIFFUSE_Avg";
const DIRECT: &str = "DIRECT_Avg";
const ZENITH: &str = "ZenDeg";

/// Shift the listed Celsius columns to Kelvin in place and record them in
/// `table.kelvin`. Absent columns and columns already in Kelvin are skipped.
pub fn convert_to_kelvin(table: &mut ObservationTable, columns: &[String]) {
    for name in columns {
        if table.kelvin.contains(name) {
            log::debug!("Kelvin conversion skipped: {name} is already in Kelvin");
            continue;
        }
        match table.column_mut(name) {
            Some(values) => {
                values.iter_mut().for_each(|v| *v += KELVIN_OFFSET);
                table.kelvin.insert(name.clone());
            }
            None => log::warn!("Kelvin conversion skipped: column {name} not found"),
        }
    }
}

/// Append the quality-control columns computed from the radiation channels.
///
/// * `dif_GH_CALC_GLOBAL` = calculated global − measured global
/// * `ratio_GH_CALC_GLOBAL` = calculated global / measured global
/// * `sum_SW` = diffuse + direct · cos(zenith)
///
/// A derived column whose inputs are missing is not created. One the file
/// already carries (a reloaded export) is kept as read, censored cells included.
pub fn add_derived_columns(table: &mut ObservationTable) {
    if let Some(values) = combine(table, DIF_GH_CALC_GLOBAL, &[GH_CALC, GLOBAL], |v| v[0] - v[1]) {
        table.set_column(DIF_GH_CALC_GLOBAL, values);
    }

    if let Some(values) = combine(table, RATIO_GH_CALC_GLOBAL, &[GH_CALC, GLOBAL], |v| {
        let r = v[0] / v[1];
        if r.is_finite() { r } else { f64::NAN }
    }) {
        table.set_column(RATIO_GH_CALC_GLOBAL, values);
    }

    if let Some(values) = combine(table, SUM_SW, &[DIFFUSE, DIRECT, ZENITH], |v| {
        v[0] + v[1] * v[2].to_radians().cos()
    }) {
        table.set_column(SUM_SW, values);
    }
}

/// Evaluate `f` row by row over the named inputs, or `None` if any input is absent.
/// NaN in any input propagates to the output.
fn combine<F>(table: &ObservationTable, target: &str, inputs: &[&str], f: F) -> Option<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if table.has_column(target) {
        log::debug!("Derived column {target} already present, keeping file values");
        return None;
    }

    let mut columns = Vec::with_capacity(inputs.len());
    for name in inputs {
        match table.column(name) {
            Some(values) => columns.push(values),
            None => {
                log::warn!("Derived column {target} skipped: input {name} not found");
                return None;
            }
        }
    }

    let mut row = vec![0.0; columns.len()];
    let values = (0..table.len())
        .map(|i| {
            for (slot, col) in row.iter_mut().zip(&columns) {
                *slot = col[i];
            }
            f(&row)
        })
        .collect();
    Some(values)
}

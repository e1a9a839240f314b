//! Writes a synthetic BSRN logger export (one row per minute) for trying the
//! dashboard without station data.
//!
//! Usage: `generate_sample [OUTPUT] [DAYS]` (defaults: `sample_bsrn.csv`, 3).

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Station latitude in degrees (southern hemisphere, summer in January).
const LATITUDE: f64 = -33.45;
const STEFAN_BOLTZMANN: f64 = 5.670_374e-8;

const HEADER: &[&str] = &[
    "TIMESTAMP",
    "RECORD",
    "GLOBAL_Avg",
    "DIRECT_Avg",
    "DIFFUSE_Avg",
    "GH_CALC_Avg",
    "UPWARD_SW_Avg",
    "DOWNWARD_Avg",
    "UPWARD_LW_Avg",
    "DWIRTEMP_Avg",
    "UWIRTEMP_Avg",
    "CRPTemp_Avg",
    "RELATIVE_HUMIDITY_Avg",
    "PRESSURE_Avg",
    "DEW_POINT_Avg",
    "UVB_Avg",
    "UVTEMP_Avg",
    "UVSIGNAL_Avg",
    "ZenDeg",
    "BattV_Min",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Solar zenith angle in degrees from a simple declination / hour-angle model.
fn zenith_deg(ts: &NaiveDateTime) -> f64 {
    let day = ts.ordinal() as f64;
    let declination = (23.45 * (360.0 / 365.0 * (284.0 + day)).to_radians().sin()).to_radians();
    let hour = ts.hour() as f64 + ts.minute() as f64 / 60.0;
    let hour_angle = (15.0 * (hour - 12.0)).to_radians();
    let lat = LATITUDE.to_radians();
    let cos_z = lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
    cos_z.clamp(-1.0, 1.0).acos().to_degrees()
}

fn row(rng: &mut SimpleRng, record: u64, ts: &NaiveDateTime) -> Vec<String> {
    let zen = zenith_deg(ts);
    let cos_z = zen.to_radians().cos();

    // Clear-sky shortwave (Meinel direct beam, proportional diffuse).
    let (direct, diffuse) = if cos_z > 0.0 {
        let air_mass = 1.0 / cos_z.max(0.05);
        (1353.0 * 0.7f64.powf(air_mass.powf(0.678)), 90.0 * cos_z.sqrt())
    } else {
        (0.0, 0.0)
    };
    let gh_calc = diffuse + direct * cos_z.max(0.0);
    let global = gh_calc * rng.gauss(1.0, 0.02) + rng.gauss(0.0, 1.5);

    // Temperatures in °C, minimum around dawn.
    let hour = ts.hour() as f64 + ts.minute() as f64 / 60.0;
    let air = 20.0 + 8.0 * ((hour - 9.0) / 24.0 * 2.0 * std::f64::consts::PI).sin();
    let rh = (55.0 - 1.5 * (air - 20.0) + rng.gauss(0.0, 2.0)).clamp(5.0, 100.0);
    let dew = air - (100.0 - rh) / 5.0;
    let surface_k = air + 273.15 + 0.01 * global;

    let values = [
        global,
        direct + rng.gauss(0.0, 2.0),
        diffuse + rng.gauss(0.0, 1.0),
        gh_calc,
        0.2 * global + rng.gauss(0.0, 0.5),
        330.0 + rng.gauss(0.0, 3.0),
        STEFAN_BOLTZMANN * surface_k.powi(4),
        air + 273.15 - 15.0 + rng.gauss(0.0, 0.2),
        surface_k + rng.gauss(0.0, 0.2),
        air + rng.gauss(0.0, 0.1),
        rh,
        1013.0 + rng.gauss(0.0, 0.3),
        dew,
        0.002 * gh_calc + rng.gauss(0.0, 0.01),
        25.0 + rng.gauss(0.0, 0.05),
        0.05 * gh_calc + rng.gauss(0.0, 0.05),
        zen,
        12.6 + rng.gauss(0.0, 0.05),
    ];

    let mut out = Vec::with_capacity(HEADER.len());
    out.push(ts.format("%Y-%m-%d %H:%M:%S").to_string());
    out.push(record.to_string());
    for v in values {
        // Occasional logger dropouts: blank cells and "NAN" markers.
        let roll = rng.next_f64();
        out.push(if roll < 0.001 {
            String::new()
        } else if roll < 0.002 {
            "NAN".to_string()
        } else {
            format!("{v:.3}")
        });
    }
    out
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "sample_bsrn.csv".to_string());
    let days: i64 = match args.next() {
        Some(d) => d.parse().with_context(|| format!("invalid day count '{d}'"))?,
        None => 3,
    };

    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("building start timestamp")?;

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADER)?;

    let minutes = days * 24 * 60;
    for i in 0..minutes {
        let ts = start + Duration::minutes(i);
        writer.write_record(row(&mut rng, i as u64, &ts))?;
    }
    writer.flush()?;

    println!("Wrote {minutes} rows ({days} days, 1-minute steps) to {output_path}");
    Ok(())
}

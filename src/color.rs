use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: variable name → Color32
// ---------------------------------------------------------------------------

/// Fixed colour per variable, so a series keeps its colour when the group
/// or window changes.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            mapping: BTreeMap::new(),
            default_color: Color32::LIGHT_BLUE,
        }
    }
}

impl ColorMap {
    /// Assign colours to every variable of a freshly loaded table.
    pub fn new(variables: &[String]) -> Self {
        let mapping = variables
            .iter()
            .cloned()
            .zip(generate_palette(variables.len()))
            .collect();
        ColorMap {
            mapping,
            ..Self::default()
        }
    }

    pub fn color_for(&self, variable: &str) -> Color32 {
        self.mapping
            .get(variable)
            .copied()
            .unwrap_or(self.default_color)
    }
}

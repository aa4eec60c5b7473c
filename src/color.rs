use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// The d3 `schemeCategory10` palette.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

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

/// Parse `#rrggbb`.
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// `#rrggbb` form for SVG output.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

// ---------------------------------------------------------------------------
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps series labels (e.g. post types) to distinct colours, the way an
/// ordinal colour scale does.
#[derive(Debug, Clone)]
pub struct ColorMap {
    order: Vec<String>,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Assign `palette` colours to `labels` in order; labels past the end of
    /// the palette get generated hues.
    pub fn new(labels: &[String], palette: &[String]) -> Self {
        let mut colors: Vec<Color32> = palette.iter().filter_map(|h| parse_hex(h)).collect();
        if colors.len() < labels.len() {
            colors.extend(generate_palette(labels.len() - colors.len()));
        }
        let mapping = labels.iter().cloned().zip(colors).collect();

        ColorMap {
            order: labels.to_vec(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries (label → colour) in domain order.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.order
            .iter()
            .map(|label| (label.clone(), self.color_for(label)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn hex_round_trip() {
        let c = parse_hex("#1f77b4").unwrap();
        assert_eq!(c, Color32::from_rgb(0x1f, 0x77, 0xb4));
        assert_eq!(to_hex(c), "#1f77b4");
        assert!(parse_hex("blue").is_none());
    }

    #[test]
    fn ordinal_assignment_and_overflow() {
        let palette = labels(&["#1f77b4", "#ff7f0e"]);
        let map = ColorMap::new(&labels(&["Image", "Link", "Video"]), &palette);
        assert_eq!(map.color_for("Image"), Color32::from_rgb(0x1f, 0x77, 0xb4));
        assert_eq!(map.color_for("Link"), Color32::from_rgb(0xff, 0x7f, 0x0e));
        assert_ne!(map.color_for("Video"), Color32::GRAY);
        assert_eq!(map.color_for("Poll"), Color32::GRAY);

        let legend: Vec<String> = map.legend_entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(legend, ["Image", "Link", "Video"]);
    }
}

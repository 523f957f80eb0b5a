use std::fmt;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::PlotError;

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
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Color schemes: configuration value replacing colormap names
// ---------------------------------------------------------------------------

/// Named color scheme used by every plotting function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    YlGnBu,
    Viridis,
    Blues,
    Greens,
    /// Evenly spaced hues; discrete only.
    Hue,
}

const YLGNBU: &[u32] = &[
    0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494, 0x081d58,
];
const VIRIDIS: &[u32] = &[
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];
const BLUES: &[u32] = &[
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];
const GREENS: &[u32] = &[
    0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c, 0x00441b,
];

impl ColorScheme {
    pub const ALL: [ColorScheme; 5] = [
        ColorScheme::YlGnBu,
        ColorScheme::Viridis,
        ColorScheme::Blues,
        ColorScheme::Greens,
        ColorScheme::Hue,
    ];

    fn anchors(self) -> &'static [u32] {
        match self {
            ColorScheme::YlGnBu => YLGNBU,
            ColorScheme::Viridis => VIRIDIS,
            ColorScheme::Blues => BLUES,
            ColorScheme::Greens => GREENS,
            ColorScheme::Hue => &[],
        }
    }

    /// Color at position `t` in `[0, 1]` (clamped; NaN maps to 0).
    pub fn sample(self, t: f64) -> Color32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if self == ColorScheme::Hue {
            let hsl = Hsl::new(t as f32 * 300.0, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            return to_color32(rgb);
        }
        let anchors = self.anchors();
        let scaled = t * (anchors.len() - 1) as f64;
        let lo = (scaled.floor() as usize).min(anchors.len() - 2);
        let frac = (scaled - lo as f64) as f32;
        let a: LinSrgb = hex(anchors[lo]).into_linear();
        let b: LinSrgb = hex(anchors[lo + 1]).into_linear();
        to_color32(Srgb::from_linear(a.mix(b, frac)))
    }

    /// `n` discrete colors, sampled away from the extremes of the scheme.
    pub fn palette(self, n: usize) -> Vec<Color32> {
        if self == ColorScheme::Hue {
            return generate_palette(n);
        }
        (1..=n)
            .map(|i| self.sample(i as f64 / (n + 1) as f64))
            .collect()
    }

    /// Single accent color: the middle of a five-color palette.
    pub fn accent(self) -> Color32 {
        self.palette(5)[2]
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::YlGnBu => "YlGnBu",
            ColorScheme::Viridis => "viridis",
            ColorScheme::Blues => "Blues",
            ColorScheme::Greens => "Greens",
            ColorScheme::Hue => "hue",
        }
    }
}

fn hex(rgb: u32) -> Srgb {
    Srgb::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorScheme {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PlotError::UnknownColorScheme {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_endpoints_match_anchors() {
        assert_eq!(ColorScheme::YlGnBu.sample(0.0), Color32::from_rgb(0xff, 0xff, 0xd9));
        assert_eq!(ColorScheme::YlGnBu.sample(1.0), Color32::from_rgb(0x08, 0x1d, 0x58));
        assert_eq!(ColorScheme::Viridis.sample(2.0), ColorScheme::Viridis.sample(1.0));
        assert_eq!(ColorScheme::Blues.sample(f64::NAN), ColorScheme::Blues.sample(0.0));
    }

    #[test]
    fn test_palette_sizes() {
        for scheme in ColorScheme::ALL {
            assert_eq!(scheme.palette(0).len(), 0);
            assert_eq!(scheme.palette(7).len(), 7);
        }
        let p = ColorScheme::Greens.palette(3);
        assert_ne!(p[0], p[2]);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("ylgnbu".parse::<ColorScheme>().unwrap(), ColorScheme::YlGnBu);
        assert_eq!("Viridis".parse::<ColorScheme>().unwrap(), ColorScheme::Viridis);
        assert!(matches!(
            "jet".parse::<ColorScheme>(),
            Err(PlotError::UnknownColorScheme { .. })
        ));
    }

    #[test]
    fn test_generate_palette_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
    }
}

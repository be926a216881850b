//! HSL colors and the four-color ambient palette.

use serde::{Deserialize, Serialize};

/// A color in HSL space.
///
/// `h` is in degrees [0, 360), `s` and `l` are percentages [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorHsl {
    /// Hue in degrees
    pub h: f32,
    /// Saturation in percent
    pub s: f32,
    /// Lightness in percent
    pub l: f32,
}

impl ColorHsl {
    /// Create a new color
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Interpolate towards `other`.
    ///
    /// Hue travels along the shorter arc of the color wheel so a red that
    /// crosses 0° never sweeps through green.
    pub fn lerp(&self, other: &ColorHsl, t: f32) -> ColorHsl {
        let delta = (other.h - self.h + 540.0).rem_euclid(360.0) - 180.0;
        ColorHsl {
            h: (self.h + delta * t).rem_euclid(360.0),
            s: self.s + (other.s - self.s) * t,
            l: self.l + (other.l - self.l) * t,
        }
    }

    /// Hex string of this color
    pub fn to_hex(&self) -> String {
        hsl_to_hex(self.h, self.s, self.l)
    }
}

/// The four named colors driven by the ambient morph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSet {
    /// Main accent color
    pub primary: ColorHsl,
    /// Dark complement of the primary
    pub secondary: ColorHsl,
    /// Shadowed primary
    pub shadow: ColorHsl,
    /// Primary-tinted white
    pub white: ColorHsl,
}

impl Default for ColorSet {
    fn default() -> Self {
        Self {
            primary: ColorHsl::new(355.0, 85.0, 50.0),
            secondary: ColorHsl::new(175.0, 85.0, 5.0),
            shadow: ColorHsl::new(355.0, 85.0, 15.0),
            white: ColorHsl::new(355.0, 10.0, 95.0),
        }
    }
}

impl ColorSet {
    /// Interpolate every color independently.
    pub fn lerp(&self, other: &ColorSet, t: f32) -> ColorSet {
        ColorSet {
            primary: self.primary.lerp(&other.primary, t),
            secondary: self.secondary.lerp(&other.secondary, t),
            shadow: self.shadow.lerp(&other.shadow, t),
            white: self.white.lerp(&other.white, t),
        }
    }

    /// Hex strings in primary, secondary, shadow, white order
    pub fn to_hex(&self) -> [String; 4] {
        [
            self.primary.to_hex(),
            self.secondary.to_hex(),
            self.shadow.to_hex(),
            self.white.to_hex(),
        ]
    }
}

/// Convert HSL (degrees, percent, percent) to a `#rrggbb` string.
pub fn hsl_to_hex(h: f32, s: f32, l: f32) -> String {
    let s = s.clamp(0.0, 100.0) / 100.0;
    let l = l.clamp(0.0, 100.0) / 100.0;
    let a = s * l.min(1.0 - l);

    let component = |n: f32| -> u8 {
        let k = (n + h / 30.0).rem_euclid(12.0);
        let value = l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0);
        (255.0 * value).round().clamp(0.0, 255.0) as u8
    };

    format!(
        "#{:02x}{:02x}{:02x}",
        component(0.0),
        component(8.0),
        component(4.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_to_hex_primary_axes() {
        assert_eq!(hsl_to_hex(0.0, 0.0, 0.0), "#000000");
        assert_eq!(hsl_to_hex(0.0, 0.0, 100.0), "#ffffff");
        assert_eq!(hsl_to_hex(120.0, 100.0, 50.0), "#00ff00");
        assert_eq!(hsl_to_hex(0.0, 100.0, 50.0), "#ff0000");
        assert_eq!(hsl_to_hex(240.0, 100.0, 50.0), "#0000ff");
    }

    #[test]
    fn test_hsl_to_hex_grey_and_out_of_range() {
        assert_eq!(hsl_to_hex(200.0, 0.0, 50.0), "#808080");
        // Negative saturation (e.g. primary saturation below 10) is treated as grey
        assert_eq!(hsl_to_hex(200.0, -5.0, 50.0), "#808080");
        // Hue wraps
        assert_eq!(hsl_to_hex(480.0, 100.0, 50.0), hsl_to_hex(120.0, 100.0, 50.0));
    }

    #[test]
    fn test_lerp_takes_short_arc() {
        let from = ColorHsl::new(350.0, 80.0, 50.0);
        let to = ColorHsl::new(10.0, 90.0, 40.0);

        let mid = from.lerp(&to, 0.5);
        assert!(mid.h.abs() < 1e-3 || (mid.h - 360.0).abs() < 1e-3);
        assert!((mid.s - 85.0).abs() < 1e-4);
        assert!((mid.l - 45.0).abs() < 1e-4);

        let end = from.lerp(&to, 1.0);
        assert!((end.h - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_lerp_endpoints() {
        let set = ColorSet::default();
        let other = ColorSet {
            primary: ColorHsl::new(5.0, 80.0, 45.0),
            ..ColorSet::default()
        };
        assert_eq!(set.lerp(&other, 0.0), set);
        let end = set.lerp(&other, 1.0);
        assert!((end.primary.h - 5.0).abs() < 1e-3);
        assert!((end.primary.s - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_default_palette_hex() {
        let hex = ColorSet::default().to_hex();
        assert!(hex.iter().all(|c| c.len() == 7 && c.starts_with('#')));
        assert_eq!(hex[3], hsl_to_hex(355.0, 10.0, 95.0));
    }
}

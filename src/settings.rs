//! Adjustment settings for the artwork on the mug
//!
//! `AdjustmentSettings` is the value object exchanged with the product editor.
//! The editor owns the canonical copy; the viewer only renders what it is given
//! and reports edits back through its update channel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::ConfigError;

/// An sRGB color written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned when a color string is not `#rgb` or `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color {0:?} (expected #rrggbb)")]
pub struct ColorParseError(pub String);

impl HexColor {
    pub const WHITE: HexColor = HexColor::new(0xff, 0xff, 0xff);
    pub const BLACK: HexColor = HexColor::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub const fn from_rgb_u32(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Convert to linear-light RGB for lighting math
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        match hex.len() {
            6 => {
                let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;
                Ok(Self::from_rgb_u32(value))
            }
            3 => {
                // #abc is shorthand for #aabbcc
                let mut channels = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let nibble = c.to_digit(16).ok_or_else(err)? as u8;
                    channels[i] = nibble * 17;
                }
                Ok(Self::new(channels[0], channels[1], channels[2]))
            }
            _ => Err(err()),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Artwork placement on the print band plus the mug body color
///
/// Offsets are fractions of the print raster's width/height (0 = centered).
/// The legacy field names (`posX`, `posY`, `rotate`, `mugColor`) are accepted
/// when reading previously saved catalog entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentSettings {
    /// Multiplier applied to the fit-contain base size
    #[serde(rename = "scale", default = "default_scale")]
    pub scale: f32,
    /// Horizontal translation as a fraction of raster width
    #[serde(rename = "offsetX", alias = "posX", default)]
    pub offset_x: f32,
    /// Vertical translation as a fraction of raster height
    #[serde(rename = "offsetY", alias = "posY", default)]
    pub offset_y: f32,
    /// Rotation about the artwork center, in degrees
    #[serde(rename = "rotationDegrees", alias = "rotate", default)]
    pub rotation_degrees: f32,
    /// Color of the body, handle, rim and base
    #[serde(rename = "surfaceColor", alias = "mugColor", default)]
    pub surface_color: HexColor,
}

fn default_scale() -> f32 {
    1.0
}

impl Default for AdjustmentSettings {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            offset_x: 0.0,
            offset_y: 0.0,
            rotation_degrees: 0.0,
            surface_color: HexColor::WHITE,
        }
    }
}

impl AdjustmentSettings {
    /// Whether every numeric field can be used for compositing
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite()
            && self.scale > 0.0
            && self.offset_x.is_finite()
            && self.offset_y.is_finite()
            && self.rotation_degrees.is_finite()
    }

    /// Rotation wrapped into (-180, 180] for display
    pub fn display_rotation(&self) -> f32 {
        let wrapped = self.rotation_degrees.rem_euclid(360.0);
        if wrapped > 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        }
    }

    pub fn rotation_radians(&self) -> f32 {
        self.rotation_degrees.to_radians()
    }

    /// Copy with the offsets moved by the given fractions
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            offset_x: self.offset_x + dx,
            offset_y: self.offset_y + dy,
            ..self.clone()
        }
    }

    /// Offsets reset to zero, everything else untouched
    pub fn centered(&self) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            ..self.clone()
        }
    }

    /// Fill the print band (may crop): fixed zoom, centered
    pub fn fit_cover(&self, cover_scale: f32) -> Self {
        Self {
            scale: cover_scale,
            ..self.centered()
        }
    }

    /// Whole artwork visible: unit zoom, centered
    pub fn fit_contain(&self) -> Self {
        Self {
            scale: 1.0,
            ..self.centered()
        }
    }

    /// Load settings from a JSON sidecar file
    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    /// Save settings to a JSON sidecar file
    pub fn save_json(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AdjustmentSettings::default();
        assert_eq!(settings.scale, 1.0);
        assert_eq!(settings.offset_x, 0.0);
        assert_eq!(settings.offset_y, 0.0);
        assert_eq!(settings.rotation_degrees, 0.0);
        assert_eq!(settings.surface_color, HexColor::WHITE);
        assert!(settings.is_valid());
    }

    #[test]
    fn test_hex_color_parsing() {
        assert_eq!("#e36888".parse::<HexColor>().unwrap(), HexColor::new(0xe3, 0x68, 0x88));
        assert_eq!("#FFF".parse::<HexColor>().unwrap(), HexColor::WHITE);
        assert_eq!(HexColor::new(0x2f, 0x4f, 0x4f).to_string(), "#2f4f4f");
        assert!("e36888".parse::<HexColor>().is_err());
        assert!("#e3688".parse::<HexColor>().is_err());
        assert!("#gggggg".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_linear_conversion_endpoints() {
        assert_eq!(HexColor::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let white = HexColor::WHITE.to_linear();
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_invalid_values_detected() {
        let mut settings = AdjustmentSettings::default();
        settings.offset_x = f32::NAN;
        assert!(!settings.is_valid());

        let mut settings = AdjustmentSettings::default();
        settings.scale = 0.0;
        assert!(!settings.is_valid());

        let mut settings = AdjustmentSettings::default();
        settings.rotation_degrees = f32::INFINITY;
        assert!(!settings.is_valid());
    }

    #[test]
    fn test_display_rotation_wraps() {
        let mut settings = AdjustmentSettings::default();
        settings.rotation_degrees = 370.0;
        assert!((settings.display_rotation() - 10.0).abs() < 1e-4);
        settings.rotation_degrees = -190.0;
        assert!((settings.display_rotation() - 170.0).abs() < 1e-4);
        settings.rotation_degrees = 180.0;
        assert_eq!(settings.display_rotation(), 180.0);
    }

    #[test]
    fn test_presets() {
        let settings = AdjustmentSettings {
            scale: 2.0,
            offset_x: 0.3,
            offset_y: -0.2,
            rotation_degrees: 45.0,
            surface_color: HexColor::BLACK,
        };

        let centered = settings.centered();
        assert_eq!((centered.offset_x, centered.offset_y), (0.0, 0.0));
        assert_eq!(centered.scale, 2.0);
        assert_eq!(centered.rotation_degrees, 45.0);

        let contain = settings.fit_contain();
        assert_eq!((contain.scale, contain.offset_x, contain.offset_y), (1.0, 0.0, 0.0));
        assert_eq!(contain.surface_color, HexColor::BLACK);

        let cover = settings.fit_cover(1.25);
        assert_eq!((cover.scale, cover.offset_x, cover.offset_y), (1.25, 0.0, 0.0));
    }

    #[test]
    fn test_json_field_names() {
        let settings = AdjustmentSettings {
            scale: 1.5,
            offset_x: 0.1,
            offset_y: 0.2,
            rotation_degrees: 30.0,
            surface_color: HexColor::new(0x66, 0x98, 0xcc),
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"offsetX\""));
        assert!(json.contains("\"rotationDegrees\""));
        assert!(json.contains("\"#6698cc\""));
        let back: AdjustmentSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_legacy_field_names_accepted() {
        let json = r##"{"scale":1.25,"posX":0.1,"posY":-0.05,"rotate":90,"mugColor":"#000000"}"##;
        let settings: AdjustmentSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.scale, 1.25);
        assert_eq!(settings.offset_x, 0.1);
        assert_eq!(settings.offset_y, -0.05);
        assert_eq!(settings.rotation_degrees, 90.0);
        assert_eq!(settings.surface_color, HexColor::BLACK);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: AdjustmentSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, AdjustmentSettings::default());
    }

    #[test]
    fn test_json_sidecar_roundtrip_on_disk() {
        let path = std::env::temp_dir().join(format!("mug_mockup_settings_{}.json", std::process::id()));
        let settings = AdjustmentSettings::default().translated(0.25, -0.1);
        settings.save_json(&path).unwrap();
        let loaded = AdjustmentSettings::load_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }
}

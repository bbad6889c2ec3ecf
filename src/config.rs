//! Viewer configuration
//!
//! Loads and saves `viewer.xml` from the platform config directory. Missing or
//! unreadable files fall back to defaults; out-of-range values are sanitised
//! on load so the viewer never starts with an unusable raster or camera.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::HexColor;

/// Print area of a standard 11oz mug is roughly 21cm x 9.5cm
pub const DEFAULT_RASTER_WIDTH: u32 = 2048;
pub const DEFAULT_RASTER_HEIGHT: u32 = 926;

/// Offset change per pointer pixel while dragging artwork
pub const DEFAULT_DRAG_SENSITIVITY: f32 = 0.002;

/// Zoom used by the fit-cover preset
pub const DEFAULT_FIT_COVER_SCALE: f32 = 1.25;

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::DeError),
    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::SeError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not find config directory")]
    NoConfigDir,
}

/// Viewer configuration (stored as XML in the config directory)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "MugMockupViewer")]
pub struct ViewerConfig {
    /// Print raster width in pixels
    #[serde(rename = "rasterWidth", default = "default_raster_width")]
    pub raster_width: u32,
    /// Print raster height in pixels
    #[serde(rename = "rasterHeight", default = "default_raster_height")]
    pub raster_height: u32,
    /// Offset change per pointer pixel in reposition mode
    #[serde(rename = "dragSensitivity", default = "default_drag_sensitivity")]
    pub drag_sensitivity: f32,
    /// Scale applied by the fit-cover preset
    #[serde(rename = "fitCoverScale", default = "default_fit_cover_scale")]
    pub fit_cover_scale: f32,
    /// Auto-rotate speed in read-only mode (revolutions per minute)
    #[serde(rename = "autoRotateSpeed", default = "default_auto_rotate_speed")]
    pub auto_rotate_speed: f32,
    /// Shadow map resolution for the key light
    #[serde(rename = "shadowMapSize", default = "default_shadow_map_size")]
    pub shadow_map_size: u32,
    /// Scene clear color
    #[serde(rename = "backgroundColor", default = "default_background_color")]
    pub background_color: HexColor,
    /// Re-decode the artwork when its file changes on disk
    #[serde(rename = "watchArtwork", default = "default_watch_artwork")]
    pub watch_artwork: bool,
    /// Window width
    #[serde(rename = "windowWidth", default = "default_window_width")]
    pub window_width: u32,
    /// Window height
    #[serde(rename = "windowHeight", default = "default_window_height")]
    pub window_height: u32,
}

fn default_raster_width() -> u32 {
    DEFAULT_RASTER_WIDTH
}
fn default_raster_height() -> u32 {
    DEFAULT_RASTER_HEIGHT
}
fn default_drag_sensitivity() -> f32 {
    DEFAULT_DRAG_SENSITIVITY
}
fn default_fit_cover_scale() -> f32 {
    DEFAULT_FIT_COVER_SCALE
}
fn default_auto_rotate_speed() -> f32 {
    1.5
}
fn default_shadow_map_size() -> u32 {
    2048
}
fn default_background_color() -> HexColor {
    HexColor::from_rgb_u32(0xf5f5f7)
}
fn default_watch_artwork() -> bool {
    true
}
fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    900
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            raster_width: default_raster_width(),
            raster_height: default_raster_height(),
            drag_sensitivity: default_drag_sensitivity(),
            fit_cover_scale: default_fit_cover_scale(),
            auto_rotate_speed: default_auto_rotate_speed(),
            shadow_map_size: default_shadow_map_size(),
            background_color: default_background_color(),
            watch_artwork: default_watch_artwork(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl ViewerConfig {
    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("MugMockup");
            p.push("viewer.xml");
            p
        })
    }

    /// Load from the config directory, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load viewer config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load from an explicit XML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = from_str(&contents)?;
        config.sanitize();
        Ok(config)
    }

    /// Save to an explicit XML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let xml = to_string(self)?;
        let formatted = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, formatted)?;
        Ok(())
    }

    /// Save to the config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to_file(&path)
    }

    /// Replace unusable values with defaults
    pub fn sanitize(&mut self) {
        self.raster_width = self.raster_width.clamp(1, 8192);
        self.raster_height = self.raster_height.clamp(1, 8192);
        if !self.drag_sensitivity.is_finite() || self.drag_sensitivity <= 0.0 {
            self.drag_sensitivity = default_drag_sensitivity();
        }
        if !self.fit_cover_scale.is_finite() || self.fit_cover_scale <= 0.0 {
            self.fit_cover_scale = default_fit_cover_scale();
        }
        if !self.auto_rotate_speed.is_finite() {
            self.auto_rotate_speed = default_auto_rotate_speed();
        }
        self.shadow_map_size = self.shadow_map_size.clamp(256, 8192);
        self.window_width = self.window_width.max(320);
        self.window_height = self.window_height.max(240);
    }

    /// Width / height of the print raster
    pub fn raster_aspect(&self) -> f32 {
        self.raster_width as f32 / self.raster_height as f32
    }
}

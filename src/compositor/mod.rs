//! Texture compositor
//!
//! Paints the artwork into the print surface raster according to the current
//! adjustment settings. The raster is then uploaded by the renderer as the
//! print band texture.
//!
//! # Architecture
//!
//! - `PrintSurfaceRaster`: fixed-size RGBA8 canvas with a dirty flag
//! - `ArtworkPlacement`: fit-contain size plus the move / rotate / zoom transform
//! - `composite`: inverse-maps raster pixels into the artwork and samples it

pub mod placement;
pub mod raster;

pub use placement::{fit_contain, ArtworkPlacement};
pub use raster::PrintSurfaceRaster;

use glam::Vec2;

use crate::artwork::ArtworkAsset;
use crate::settings::AdjustmentSettings;

/// What a `composite` call did to the raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOutcome {
    /// Raster cleared, artwork drawn, dirty flag raised
    Painted,
    /// No artwork yet; raster untouched
    SkippedNoArtwork,
    /// A setting was non-finite or the zoom was not positive; raster untouched
    SkippedInvalidSettings,
}

/// Repaint `raster` with `asset` placed according to `settings`.
///
/// Deterministic: the same inputs always produce the same pixels. Values are
/// not clamped, so the artwork may end up partly or entirely off the raster.
pub fn composite(
    raster: &mut PrintSurfaceRaster,
    asset: Option<&ArtworkAsset>,
    settings: &AdjustmentSettings,
) -> CompositeOutcome {
    let Some(asset) = asset else {
        return CompositeOutcome::SkippedNoArtwork;
    };
    if asset.width() == 0 || asset.height() == 0 {
        return CompositeOutcome::SkippedNoArtwork;
    }
    if !settings.is_valid() {
        tracing::debug!(?settings, "Skipping composite for invalid settings");
        return CompositeOutcome::SkippedInvalidSettings;
    }

    raster.clear();

    let raster_size = Vec2::new(raster.width() as f32, raster.height() as f32);
    let placement = ArtworkPlacement::new(asset.aspect_ratio(), raster_size, settings);
    let inverse = placement.transform.inverse();

    let (min, max) = placement.bounds();
    let x_start = min.x.floor().max(0.0) as u32;
    let y_start = min.y.floor().max(0.0) as u32;
    let x_end = max.x.ceil().min(raster_size.x) as u32;
    let y_end = max.y.ceil().min(raster_size.y) as u32;

    for y in y_start..y_end {
        for x in x_start..x_end {
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let uv = placement.raster_to_artwork(&inverse, center);
            if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
                continue;
            }

            let [r, g, b, a] = asset.sample_premultiplied(uv.x, uv.y);
            if a <= 0.0 {
                continue;
            }
            raster.put_pixel(
                x,
                y,
                [
                    to_u8(r / a),
                    to_u8(g / a),
                    to_u8(b / a),
                    to_u8(a),
                ],
            );
        }
    }

    raster.mark_dirty();
    CompositeOutcome::Painted
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

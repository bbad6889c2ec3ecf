//! Artwork placement on the print raster
//!
//! Placement is computed in raster pixel space (origin top-left, +Y down).
//! The artwork is first fitted inside the raster preserving its aspect ratio,
//! then moved, rotated and zoomed about its own center.

use glam::{Affine2, Vec2};

use crate::settings::AdjustmentSettings;

/// Largest size with aspect `art_aspect` that fits inside `raster_w x raster_h`.
///
/// Wider artwork spans the full raster width; otherwise it spans the full
/// height. Equal aspects fill the raster exactly.
pub fn fit_contain(art_aspect: f32, raster_w: f32, raster_h: f32) -> (f32, f32) {
    let raster_aspect = raster_w / raster_h;
    if art_aspect > raster_aspect {
        (raster_w, raster_w / art_aspect)
    } else {
        (raster_h * art_aspect, raster_h)
    }
}

/// Where the artwork quad lands on the raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtworkPlacement {
    /// Fit-contain size before zoom
    pub base_size: Vec2,
    /// Maps artwork-local coordinates (origin at the artwork center) to raster pixels
    pub transform: Affine2,
}

impl ArtworkPlacement {
    /// Build the placement for an artwork of `art_aspect` on a `raster_size` canvas
    pub fn new(art_aspect: f32, raster_size: Vec2, settings: &AdjustmentSettings) -> Self {
        let (w, h) = fit_contain(art_aspect, raster_size.x, raster_size.y);
        let base_size = Vec2::new(w, h);

        let center = raster_size * 0.5;
        let offset = Vec2::new(settings.offset_x, settings.offset_y) * raster_size;

        let transform = Affine2::from_translation(center + offset)
            * Affine2::from_angle(settings.rotation_radians())
            * Affine2::from_scale(Vec2::splat(settings.scale));

        Self { base_size, transform }
    }

    /// Artwork center in raster pixels
    pub fn center(&self) -> Vec2 {
        self.transform.transform_point2(Vec2::ZERO)
    }

    /// Quad corners in raster pixels (top-left, top-right, bottom-right, bottom-left)
    pub fn corners(&self) -> [Vec2; 4] {
        let half = self.base_size * 0.5;
        [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ]
        .map(|p| self.transform.transform_point2(p))
    }

    /// Axis-aligned bounds of the transformed quad as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let corners = self.corners();
        let min = corners.iter().fold(Vec2::splat(f32::INFINITY), |acc, p| acc.min(*p));
        let max = corners.iter().fold(Vec2::splat(f32::NEG_INFINITY), |acc, p| acc.max(*p));
        (min, max)
    }

    /// Map a raster point to normalized artwork coordinates (0..1 inside the artwork)
    pub fn raster_to_artwork(&self, inverse: &Affine2, point: Vec2) -> Vec2 {
        let local = inverse.transform_point2(point);
        local / self.base_size + Vec2::splat(0.5)
    }
}

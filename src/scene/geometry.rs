//! Mug proportions
//!
//! All lengths are in scene units, mug-local, +Y up, origin at the mug's
//! center. Azimuth θ maps to `(r cos θ, y, r sin θ)`; the handle and the
//! print-band gap both sit at θ = 0 (+X).

use std::f32::consts::{PI, TAU};

/// Azimuth shared by the handle and the center of the print-band gap
pub const HANDLE_AZIMUTH: f32 = 0.0;

/// Dimensions of the mug model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MugDimensions {
    /// Outer radius of the print band
    pub radius: f32,
    /// Body height
    pub height: f32,
    /// Segments around the circumference
    pub radial_segments: u32,
    /// Angular width of the unprinted strip behind the handle (radians)
    pub print_gap: f32,
    /// Ring radius of the handle torus
    pub handle_radius: f32,
    /// Tube radius of the handle torus
    pub handle_tube: f32,
    /// Arc swept by the handle (radians)
    pub handle_arc: f32,
    /// How far the handle ends sink into the body
    pub handle_overlap: f32,
    /// Liner radius is `radius - liner_inset`
    pub liner_inset: f32,
    /// Body radius is `radius - body_inset`
    pub body_inset: f32,
    /// Rim ring radius is `radius - rim_inset`
    pub rim_inset: f32,
    /// Rim tube radius
    pub rim_tube: f32,
}

impl Default for MugDimensions {
    fn default() -> Self {
        Self {
            radius: 0.8,
            height: 1.9,
            radial_segments: 64,
            print_gap: 0.6,
            handle_radius: 0.35,
            handle_tube: 0.1,
            handle_arc: PI + 0.5,
            handle_overlap: 0.05,
            liner_inset: 0.08,
            body_inset: 0.01,
            rim_inset: 0.045,
            rim_tube: 0.035,
        }
    }
}

impl MugDimensions {
    pub fn body_radius(&self) -> f32 {
        self.radius - self.body_inset
    }

    pub fn liner_radius(&self) -> f32 {
        self.radius - self.liner_inset
    }

    pub fn rim_radius(&self) -> f32 {
        self.radius - self.rim_inset
    }

    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Azimuth where the print band starts
    pub fn print_band_start(&self) -> f32 {
        HANDLE_AZIMUTH + self.print_gap * 0.5
    }

    /// Angular length of the print band
    pub fn print_band_arc(&self) -> f32 {
        TAU - self.print_gap
    }

    /// Azimuth of the print band's middle (faces away from the handle)
    pub fn print_center_azimuth(&self) -> f32 {
        self.print_band_start() + self.print_band_arc() * 0.5
    }

    /// X of the handle torus center, chosen so both arc ends sit
    /// `handle_overlap` inside the body surface
    pub fn handle_center_x(&self) -> f32 {
        let end_x = self.handle_radius * (self.handle_arc * 0.5).cos();
        self.radius - self.handle_overlap - end_x
    }

    /// Where the arc ends of the handle's centerline land (upper end first)
    pub fn handle_ends(&self) -> [(f32, f32); 2] {
        let half = self.handle_arc * 0.5;
        let x = self.handle_center_x() + self.handle_radius * half.cos();
        let y = self.handle_radius * half.sin();
        [(x, y), (x, -y)]
    }

    /// Height of the shadow-catching floor
    pub fn floor_y(&self) -> f32 {
        -self.half_height() - 0.01
    }

    /// Radius of a sphere around the origin enclosing the whole mug
    pub fn bounding_radius(&self) -> f32 {
        let reach = self.handle_center_x() + self.handle_radius + self.handle_tube;
        let horizontal = reach.max(self.radius);
        (horizontal * horizontal + self.half_height() * self.half_height()).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_print_band() {
        let dims = MugDimensions::default();
        assert!((dims.print_band_start() - 0.3).abs() < 1e-6);
        assert!((dims.print_band_arc() - (TAU - 0.6)).abs() < 1e-6);
        assert!((dims.print_center_azimuth() - PI).abs() < 1e-5);
    }

    #[test]
    fn test_handle_ends_sink_into_body() {
        for (radius, height) in [(0.8, 1.9), (0.6, 1.2), (1.1, 2.4)] {
            let dims = MugDimensions {
                radius,
                height,
                ..MugDimensions::default()
            };
            for (x, _) in dims.handle_ends() {
                assert!((x - (radius - dims.handle_overlap)).abs() < 1e-5);
            }
            assert!(dims.handle_center_x() > 0.0);
        }
    }

    #[test]
    fn test_floor_below_base() {
        let dims = MugDimensions::default();
        assert!(dims.floor_y() < -dims.half_height());
        assert!(dims.bounding_radius() > dims.radius);
    }
}

//! Mug scene description
//!
//! CPU-side scene: every mug part with its mesh and material, plus the light
//! rig. The renderer uploads this once; only the surface color and the
//! print texture change afterwards.

use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

use super::geometry::{MugDimensions, HANDLE_AZIMUTH};
use super::lighting::LightRig;
use super::mesh::MockupMesh;
use crate::settings::HexColor;

const CERAMIC_ROUGHNESS: f32 = 0.15;
const CERAMIC_METALNESS: f32 = 0.05;
const PRINT_ROUGHNESS: f32 = 0.3;
const LINER_ROUGHNESS: f32 = 0.2;
const FLOOR_SHADOW_OPACITY: f32 = 0.1;
const FLOOR_SIZE: f32 = 10.0;

/// Which part of the mug a mesh is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Body,
    Liner,
    Rim,
    Base,
    PrintBand,
    Handle,
    Floor,
}

impl PartKind {
    /// Parts painted with the adjustable surface color
    pub fn uses_surface_color(self) -> bool {
        matches!(self, PartKind::Body | PartKind::Rim | PartKind::Base | PartKind::Handle)
    }

    pub fn label(self) -> &'static str {
        match self {
            PartKind::Body => "Body",
            PartKind::Liner => "Liner",
            PartKind::Rim => "Rim",
            PartKind::Base => "Base",
            PartKind::PrintBand => "Print Band",
            PartKind::Handle => "Handle",
            PartKind::Floor => "Floor",
        }
    }
}

/// Which faces a material renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

/// How a material is shaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Lit, opaque
    Opaque,
    /// Lit, samples the print texture, alpha blended and pulled toward the camera
    PrintTexture,
    /// Invisible except for the shadow it receives, at the given opacity
    ShadowCatcher { opacity: f32 },
}

/// Surface appearance of one part
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: HexColor,
    pub roughness: f32,
    pub metalness: f32,
    pub shading: Shading,
    pub side: Side,
    pub casts_shadow: bool,
    pub receives_shadow: bool,
}

impl Material {
    fn ceramic(color: HexColor) -> Self {
        Self {
            color,
            roughness: CERAMIC_ROUGHNESS,
            metalness: CERAMIC_METALNESS,
            shading: Shading::Opaque,
            side: Side::Front,
            casts_shadow: true,
            receives_shadow: true,
        }
    }

    /// Drawn after opaque parts
    pub fn is_blended(&self) -> bool {
        !matches!(self.shading, Shading::Opaque)
    }
}

/// One renderable mug part
#[derive(Debug, Clone)]
pub struct ScenePart {
    pub kind: PartKind,
    pub mesh: MockupMesh,
    pub material: Material,
}

/// Geometry, materials and lights of the mockup
#[derive(Debug, Clone)]
pub struct SceneModel {
    dimensions: MugDimensions,
    parts: Vec<ScenePart>,
    lights: LightRig,
    surface_color: HexColor,
}

impl SceneModel {
    /// Build the mug with the given surface color
    pub fn new(dimensions: MugDimensions, surface_color: HexColor) -> Self {
        let parts = Self::build_parts(&dimensions, surface_color);
        tracing::debug!(
            parts = parts.len(),
            vertices = parts.iter().map(|p| p.mesh.vertex_count()).sum::<usize>(),
            "Built mug scene"
        );

        Self {
            dimensions,
            parts,
            lights: LightRig::studio(),
            surface_color,
        }
    }

    fn build_parts(dims: &MugDimensions, surface_color: HexColor) -> Vec<ScenePart> {
        let segments = dims.radial_segments;
        let half = dims.half_height();

        let body = MockupMesh::cylinder(dims.body_radius(), dims.height, segments, 0.0, TAU);

        // Inside wall plus the inner floor, both facing into the cup
        let liner_floor = MockupMesh::disc(dims.liner_radius(), segments)
            .inverted()
            .transformed(Mat4::from_translation(Vec3::new(0.0, -half + 0.05, 0.0)));
        let liner = MockupMesh::cylinder(dims.liner_radius(), dims.height + 0.01, segments, 0.0, TAU)
            .inverted()
            .merged(liner_floor);

        let rim = MockupMesh::torus(dims.rim_radius(), dims.rim_tube, 12, segments, 0.0, TAU)
            .transformed(
                Mat4::from_translation(Vec3::new(0.0, half, 0.0)) * Mat4::from_rotation_x(FRAC_PI_2),
            );

        let base = MockupMesh::disc(dims.body_radius(), segments)
            .transformed(Mat4::from_translation(Vec3::new(0.0, -half, 0.0)));

        let print_band = MockupMesh::cylinder(
            dims.radius,
            dims.height,
            segments,
            dims.print_band_start(),
            dims.print_band_arc(),
        );

        let handle = MockupMesh::torus(
            dims.handle_radius,
            dims.handle_tube,
            16,
            32,
            HANDLE_AZIMUTH - dims.handle_arc * 0.5,
            dims.handle_arc,
        )
        .transformed(Mat4::from_translation(Vec3::new(dims.handle_center_x(), 0.0, 0.0)));

        let floor = MockupMesh::plane(FLOOR_SIZE, FLOOR_SIZE)
            .transformed(Mat4::from_translation(Vec3::new(0.0, dims.floor_y(), 0.0)));

        vec![
            ScenePart {
                kind: PartKind::Body,
                mesh: body,
                material: Material::ceramic(surface_color),
            },
            ScenePart {
                kind: PartKind::Liner,
                mesh: liner,
                material: Material {
                    roughness: LINER_ROUGHNESS,
                    metalness: 0.0,
                    casts_shadow: false,
                    ..Material::ceramic(HexColor::WHITE)
                },
            },
            ScenePart {
                kind: PartKind::Rim,
                mesh: rim,
                material: Material::ceramic(surface_color),
            },
            ScenePart {
                kind: PartKind::Base,
                mesh: base,
                material: Material::ceramic(surface_color),
            },
            ScenePart {
                kind: PartKind::Handle,
                mesh: handle,
                material: Material::ceramic(surface_color),
            },
            ScenePart {
                kind: PartKind::PrintBand,
                mesh: print_band,
                material: Material {
                    color: HexColor::WHITE,
                    roughness: PRINT_ROUGHNESS,
                    metalness: 0.0,
                    shading: Shading::PrintTexture,
                    side: Side::Front,
                    casts_shadow: false,
                    receives_shadow: true,
                },
            },
            ScenePart {
                kind: PartKind::Floor,
                mesh: floor,
                material: Material {
                    color: HexColor::BLACK,
                    roughness: 1.0,
                    metalness: 0.0,
                    shading: Shading::ShadowCatcher {
                        opacity: FLOOR_SHADOW_OPACITY,
                    },
                    side: Side::Double,
                    casts_shadow: false,
                    receives_shadow: true,
                },
            },
        ]
    }

    pub fn parts(&self) -> &[ScenePart] {
        &self.parts
    }

    pub fn part(&self, kind: PartKind) -> Option<&ScenePart> {
        self.parts.iter().find(|p| p.kind == kind)
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn dimensions(&self) -> &MugDimensions {
        &self.dimensions
    }

    pub fn surface_color(&self) -> HexColor {
        self.surface_color
    }

    /// Recolor body, handle, rim and base; returns whether anything changed
    pub fn set_surface_color(&mut self, color: HexColor) -> bool {
        if self.surface_color == color {
            return false;
        }
        self.surface_color = color;
        for part in &mut self.parts {
            if part.kind.uses_surface_color() {
                part.material.color = color;
            }
        }
        true
    }

    /// Center and radius enclosing every shadow-casting part
    pub fn shadow_bounds(&self) -> (Vec3, f32) {
        let (min, max) = self
            .parts
            .iter()
            .filter(|p| p.material.casts_shadow)
            .map(|p| p.mesh.bounds())
            .fold(
                (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                |(lo, hi), (min, max)| (lo.min(min), hi.max(max)),
            );
        if !min.is_finite() || !max.is_finite() {
            return (Vec3::ZERO, self.dimensions.bounding_radius());
        }
        let center = (min + max) * 0.5;
        (center, (max - center).length())
    }
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new(MugDimensions::default(), HexColor::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn azimuth(position: [f32; 3]) -> f32 {
        position[2].atan2(position[0]).rem_euclid(TAU)
    }

    fn dims(radius: f32, height: f32) -> MugDimensions {
        MugDimensions {
            radius,
            height,
            ..MugDimensions::default()
        }
    }

    #[test]
    fn test_all_parts_present() {
        let scene = SceneModel::default();
        for kind in [
            PartKind::Body,
            PartKind::Liner,
            PartKind::Rim,
            PartKind::Base,
            PartKind::PrintBand,
            PartKind::Handle,
            PartKind::Floor,
        ] {
            assert!(scene.part(kind).is_some(), "missing {:?}", kind);
        }
        // Blended parts come after every opaque part.
        let first_blended = scene.parts().iter().position(|p| p.material.is_blended()).unwrap();
        assert!(scene.parts()[first_blended..].iter().all(|p| p.material.is_blended()));
    }

    #[test]
    fn test_print_gap_centered_on_handle_side() {
        for (radius, height) in [(0.8, 1.9), (0.5, 1.0), (1.2, 2.5)] {
            let d = dims(radius, height);
            let scene = SceneModel::new(d, HexColor::WHITE);
            let band = &scene.part(PartKind::PrintBand).unwrap().mesh;
            let half_gap = d.print_gap * 0.5;

            for v in &band.vertices {
                let theta = azimuth(v.position);
                let from_handle = theta.min(TAU - theta);
                assert!(from_handle >= half_gap - 1e-4, "band vertex inside gap at {}", theta);
            }

            // Both band ends border the gap symmetrically.
            let row = d.radial_segments as usize + 1;
            let first = azimuth(band.vertices[0].position);
            let last = azimuth(band.vertices[row - 1].position);
            assert!((first - half_gap).abs() < 1e-4);
            assert!((TAU - last - half_gap).abs() < 1e-4);
        }
    }

    #[test]
    fn test_handle_centered_at_gap() {
        for (radius, height) in [(0.8, 1.9), (0.5, 1.0), (1.2, 2.5)] {
            let d = dims(radius, height);
            let scene = SceneModel::new(d, HexColor::WHITE);
            let handle = &scene.part(PartKind::Handle).unwrap().mesh;
            let (min, max) = handle.bounds();

            // Symmetric about the XY plane (θ = 0) and outside the body.
            assert!((min.z + max.z).abs() < 1e-4);
            assert!((min.y + max.y).abs() < 1e-4);
            assert!(max.x > radius + d.handle_tube);
            // Ends sink into the body wall.
            assert!(min.x < radius - d.handle_overlap);
        }
    }

    #[test]
    fn test_print_band_outside_body() {
        let scene = SceneModel::default();
        let d = scene.dimensions();
        let band = &scene.part(PartKind::PrintBand).unwrap().mesh;
        let body = &scene.part(PartKind::Body).unwrap().mesh;

        let p = band.vertices[0].position;
        let band_r = (p[0] * p[0] + p[2] * p[2]).sqrt();
        let body_r = body.bounds().1.x;
        assert!((band_r - d.radius).abs() < 1e-4);
        assert!(body_r < band_r);
    }

    #[test]
    fn test_rim_sits_on_top() {
        let scene = SceneModel::default();
        let rim = &scene.part(PartKind::Rim).unwrap().mesh;
        let (min, max) = rim.bounds();
        let half = scene.dimensions().half_height();
        assert!(((min.y + max.y) * 0.5 - half).abs() < 1e-4);
        assert!((max.y - half - scene.dimensions().rim_tube).abs() < 1e-4);
    }

    #[test]
    fn test_surface_color_applies_to_ceramic_parts() {
        let mut scene = SceneModel::default();
        let pink = HexColor::from_rgb_u32(0xe36888);
        assert!(scene.set_surface_color(pink));
        assert!(!scene.set_surface_color(pink));

        for part in scene.parts() {
            match part.kind {
                PartKind::Body | PartKind::Rim | PartKind::Base | PartKind::Handle => {
                    assert_eq!(part.material.color, pink)
                }
                PartKind::Liner | PartKind::PrintBand => {
                    assert_eq!(part.material.color, HexColor::WHITE)
                }
                PartKind::Floor => {}
            }
        }
    }

    #[test]
    fn test_shadow_bounds_cover_casters() {
        let scene = SceneModel::default();
        let (center, radius) = scene.shadow_bounds();
        assert!(radius > scene.dimensions().half_height());
        assert!(center.y.abs() < 0.1);
    }
}

//! Studio light rig
//!
//! Ambient fill plus three directional lights. Only the key light casts
//! shadows; its shadow camera is an orthographic box around the mug.

use glam::{Mat4, Vec3};

use crate::settings::HexColor;

/// A directional light shining from `position` toward the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: HexColor,
    pub intensity: f32,
    pub casts_shadow: bool,
}

impl DirectionalLight {
    /// Unit vector from the scene toward the light
    pub fn direction_to_light(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

/// Lights used by the mockup scene
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient_color: HexColor,
    pub ambient_intensity: f32,
    /// Key, fill, rim
    pub directional: [DirectionalLight; 3],
    /// Tone mapping exposure
    pub exposure: f32,
}

impl LightRig {
    /// Soft product-shot lighting
    pub fn studio() -> Self {
        Self {
            ambient_color: HexColor::WHITE,
            ambient_intensity: 0.6,
            directional: [
                DirectionalLight {
                    position: Vec3::new(3.0, 5.0, 5.0),
                    color: HexColor::WHITE,
                    intensity: 1.0,
                    casts_shadow: true,
                },
                DirectionalLight {
                    position: Vec3::new(-3.0, 0.0, 4.0),
                    color: HexColor::from_rgb_u32(0xebebeb),
                    intensity: 0.4,
                    casts_shadow: false,
                },
                DirectionalLight {
                    position: Vec3::new(0.0, 5.0, -5.0),
                    color: HexColor::WHITE,
                    intensity: 0.5,
                    casts_shadow: false,
                },
            ],
            exposure: 1.0,
        }
    }

    /// The shadow-casting light, if any
    pub fn shadow_caster(&self) -> Option<&DirectionalLight> {
        self.directional.iter().find(|light| light.casts_shadow)
    }

    /// World to light clip space for the shadow-casting light
    ///
    /// `center` / `radius` bound the geometry that should cast shadows.
    pub fn shadow_view_projection(&self, center: Vec3, radius: f32) -> Option<Mat4> {
        let light = self.shadow_caster()?;
        let dir = light.direction_to_light();
        if dir == Vec3::ZERO {
            return None;
        }

        let eye = center + dir * radius * 2.0;
        let up = if dir.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(eye, center, up);

        let half_size = radius * 1.5;
        let projection = Mat4::orthographic_rh(
            -half_size,
            half_size,
            -half_size,
            half_size,
            0.1,
            radius * 4.0,
        );

        Some(projection * view)
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::studio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_key_light_casts_shadows() {
        let rig = LightRig::studio();
        let casters: Vec<_> = rig.directional.iter().filter(|l| l.casts_shadow).collect();
        assert_eq!(casters.len(), 1);
        assert_eq!(casters[0].position, Vec3::new(3.0, 5.0, 5.0));
        assert_eq!(rig.ambient_intensity, 0.6);
    }

    #[test]
    fn test_shadow_projection_contains_mug() {
        let rig = LightRig::studio();
        let vp = rig.shadow_view_projection(Vec3::ZERO, 1.5).unwrap();
        for p in [Vec3::ZERO, Vec3::new(1.2, 0.95, 0.0), Vec3::new(-0.8, -0.95, 0.8)] {
            let clip = vp.project_point3(p);
            assert!(clip.x.abs() <= 1.0 && clip.y.abs() <= 1.0);
            assert!((0.0..=1.0).contains(&clip.z));
        }
    }

    #[test]
    fn test_no_caster_no_projection() {
        let mut rig = LightRig::studio();
        rig.directional[0].casts_shadow = false;
        assert!(rig.shadow_view_projection(Vec3::ZERO, 1.0).is_none());
    }
}

//! Orbit camera for the mug preview
//!
//! Spherical-coordinate camera orbiting the mug, with damped motion, polar
//! and distance limits, and an optional slow auto-rotation.

use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Closest the camera gets to looking straight down or up (radians from the pole)
pub const MIN_POLAR_ANGLE: f32 = 0.2;
pub const MAX_POLAR_ANGLE: f32 = PI - 0.2;
pub const MIN_DISTANCE: f32 = 3.0;
pub const MAX_DISTANCE: f32 = 10.0;
/// Fraction of the pending rotation applied per update
pub const DAMPING_FACTOR: f32 = 0.05;

const INITIAL_YAW: f32 = -FRAC_PI_2;
/// Eye at (0, 1.5, 5.5) relative to the mug
const INITIAL_PITCH: f32 = 0.266_252_2;
const INITIAL_DISTANCE: f32 = 5.700_877;

/// Orbit camera for mug preview navigation
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal angle (yaw) in radians
    yaw: f32,
    /// Elevation above the horizon in radians
    pitch: f32,
    /// Distance from target point
    distance: f32,
    /// Point the camera orbits around
    target: Vec3,
    /// Aspect ratio (width/height) for projection
    aspect: f32,
    /// Vertical field of view in radians
    fov: f32,
    /// Near clipping plane
    near: f32,
    /// Far clipping plane
    far: f32,
    /// Pending yaw still to be applied by damping
    yaw_delta: f32,
    /// Pending pitch still to be applied by damping
    pitch_delta: f32,
    /// Whether pointer drags orbit the camera
    enabled: bool,
    /// Turn slowly on its own
    auto_rotate: bool,
    /// Revolutions per minute while auto-rotating
    auto_rotate_speed: f32,
}

impl OrbitCamera {
    /// Create a camera with the default mug framing
    pub fn new() -> Self {
        Self {
            yaw: INITIAL_YAW,
            pitch: INITIAL_PITCH,
            distance: INITIAL_DISTANCE,
            target: Vec3::ZERO,
            aspect: 16.0 / 9.0,
            fov: 35f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            enabled: true,
            auto_rotate: false,
            auto_rotate_speed: 1.5,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Calculate camera position from spherical coordinates
    pub fn eye_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Queue an orbit from a pointer drag of `(dx, dy)` pixels
    ///
    /// A drag the full height of the viewport turns the camera once around.
    pub fn on_drag(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.enabled {
            return;
        }
        let height = viewport_height.max(1.0);
        self.yaw_delta -= TAU * dx / height;
        self.pitch_delta += TAU * dy / height;
    }

    /// Zoom by `delta` wheel steps (positive = closer)
    pub fn on_scroll(&mut self, delta: f32) {
        if !delta.is_finite() || delta == 0.0 {
            return;
        }
        let scale = 0.95f32.powf(delta.abs());
        let distance = if delta > 0.0 {
            self.distance * scale
        } else {
            self.distance / scale
        };
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Advance damping and auto-rotation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.auto_rotate {
            self.yaw_delta -= TAU / 60.0 * self.auto_rotate_speed * dt.max(0.0);
        }

        self.yaw += self.yaw_delta * DAMPING_FACTOR;
        self.pitch = Self::clamp_pitch(self.pitch + self.pitch_delta * DAMPING_FACTOR);

        self.yaw_delta *= 1.0 - DAMPING_FACTOR;
        self.pitch_delta *= 1.0 - DAMPING_FACTOR;
    }

    fn clamp_pitch(pitch: f32) -> f32 {
        pitch.clamp(FRAC_PI_2 - MAX_POLAR_ANGLE, FRAC_PI_2 - MIN_POLAR_ANGLE)
    }

    /// Update aspect ratio on resize
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Allow or block pointer orbiting (pending motion is dropped when blocked)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.yaw_delta = 0.0;
            self.pitch_delta = 0.0;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_auto_rotate(&mut self, auto_rotate: bool) {
        self.auto_rotate = auto_rotate;
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn set_auto_rotate_speed(&mut self, speed: f32) {
        self.auto_rotate_speed = speed;
    }

    /// Get current yaw
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Get current pitch
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Angle from the +Y pole
    pub fn polar_angle(&self) -> f32 {
        FRAC_PI_2 - self.pitch
    }

    /// Get current distance
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Whether queued orbit motion is still playing out
    pub fn is_moving(&self) -> bool {
        self.yaw_delta.abs() > 1e-5 || self.pitch_delta.abs() > 1e-5
    }

    /// Reset camera to the initial framing
    pub fn reset(&mut self) {
        self.yaw = INITIAL_YAW;
        self.pitch = INITIAL_PITCH;
        self.distance = INITIAL_DISTANCE;
        self.yaw_delta = 0.0;
        self.pitch_delta = 0.0;
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_framing() {
        let camera = OrbitCamera::new();
        let eye = camera.eye_position();
        assert!((camera.distance() - 5.7).abs() < 0.01);
        assert!((eye.y - 1.5).abs() < 1e-3);
        // Looks at the print center on the -X side.
        assert!(eye.x < -5.0);
        assert!(eye.z.abs() < 1e-3);
    }

    #[test]
    fn test_drag_is_damped() {
        let mut camera = OrbitCamera::new();
        let start = camera.yaw();
        camera.on_drag(100.0, 0.0, 600.0);
        camera.update(1.0 / 60.0);
        let first = (camera.yaw() - start).abs();
        let total = TAU * 100.0 / 600.0;
        assert!(first > 0.0 && first < total * 0.1);

        for _ in 0..500 {
            camera.update(1.0 / 60.0);
        }
        // Dragging right turns the camera toward decreasing yaw.
        assert!((camera.yaw() - start + total).abs() < 1e-3);
        assert!(!camera.is_moving());
    }

    #[test]
    fn test_polar_limits() {
        let mut camera = OrbitCamera::new();
        for _ in 0..50 {
            camera.on_drag(0.0, 1000.0, 100.0);
            camera.update(0.016);
        }
        assert!(camera.polar_angle() >= MIN_POLAR_ANGLE - 1e-5);

        for _ in 0..100 {
            camera.on_drag(0.0, -1000.0, 100.0);
            camera.update(0.016);
        }
        assert!(camera.polar_angle() <= MAX_POLAR_ANGLE + 1e-5);
    }

    #[test]
    fn test_distance_limits() {
        let mut camera = OrbitCamera::new();
        camera.on_scroll(100.0);
        assert_eq!(camera.distance(), MIN_DISTANCE);
        camera.on_scroll(-100.0);
        assert_eq!(camera.distance(), MAX_DISTANCE);
    }

    #[test]
    fn test_disabled_ignores_drag() {
        let mut camera = OrbitCamera::new();
        camera.set_enabled(false);
        let yaw = camera.yaw();
        camera.on_drag(200.0, 50.0, 400.0);
        camera.update(0.016);
        assert_eq!(camera.yaw(), yaw);
    }

    #[test]
    fn test_auto_rotate_turns() {
        let mut camera = OrbitCamera::new();
        let yaw = camera.yaw();
        camera.update(0.5);
        assert_eq!(camera.yaw(), yaw);

        camera.set_auto_rotate(true);
        for _ in 0..60 {
            camera.update(1.0 / 60.0);
        }
        assert!(camera.yaw() != yaw);
    }

    #[test]
    fn test_reset() {
        let mut camera = OrbitCamera::new();
        camera.on_drag(300.0, 80.0, 500.0);
        camera.on_scroll(5.0);
        for _ in 0..10 {
            camera.update(0.016);
        }
        camera.reset();
        let fresh = OrbitCamera::new();
        assert_eq!(camera.eye_position(), fresh.eye_position());
        assert!(!camera.is_moving());
    }
}

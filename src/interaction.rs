//! Pointer interaction state machine
//!
//! Decides what a pointer drag on the preview means: orbiting the camera or
//! moving the artwork across the print band. Repositioning never writes
//! settings itself; it returns the new settings for the host to adopt.

use crate::config::{DEFAULT_DRAG_SENSITIVITY, DEFAULT_FIT_COVER_SCALE};
use crate::settings::AdjustmentSettings;

/// What a drag on the preview does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Drag rotates the camera around the mug
    #[default]
    Orbit,
    /// Drag moves the artwork on the print band
    Reposition,
}

impl InteractionMode {
    pub fn hint(self) -> &'static str {
        match self {
            InteractionMode::Orbit => "Drag to rotate the view",
            InteractionMode::Reposition => "Drag to position the artwork",
        }
    }
}

/// Pointer input in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down,
    Move { dx: f32, dy: f32 },
    Up,
    Leave,
}

/// Result of feeding a pointer event to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum PointerResponse {
    /// Nothing to do
    Ignored,
    /// Rotate the camera by this drag
    Orbit { dx: f32, dy: f32 },
    /// Host should adopt these settings
    Reposition(AdjustmentSettings),
}

/// Preset adjustments offered next to the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Center,
    FitCover,
    FitContain,
}

impl QuickAction {
    pub const ALL: [QuickAction; 3] = [QuickAction::Center, QuickAction::FitCover, QuickAction::FitContain];

    pub fn label(self) -> &'static str {
        match self {
            QuickAction::Center => "Center",
            QuickAction::FitCover => "Fit Cover",
            QuickAction::FitContain => "Fit Contain",
        }
    }

    pub fn apply(self, settings: &AdjustmentSettings, cover_scale: f32) -> AdjustmentSettings {
        match self {
            QuickAction::Center => settings.centered(),
            QuickAction::FitCover => settings.fit_cover(cover_scale),
            QuickAction::FitContain => settings.fit_contain(),
        }
    }
}

/// Orbit / Reposition state machine for one viewer
#[derive(Debug, Clone)]
pub struct InteractionController {
    mode: InteractionMode,
    pointer_down: bool,
    editable: bool,
    sensitivity: f32,
    cover_scale: f32,
}

impl InteractionController {
    pub fn new(editable: bool, sensitivity: f32) -> Self {
        Self {
            mode: InteractionMode::Orbit,
            pointer_down: false,
            editable,
            sensitivity,
            cover_scale: DEFAULT_FIT_COVER_SCALE,
        }
    }

    pub fn with_cover_scale(mut self, cover_scale: f32) -> Self {
        self.cover_scale = cover_scale;
        self
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Switching to read-only drops back to orbit mode
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
        if !editable {
            self.mode = InteractionMode::Orbit;
        }
    }

    /// Change mode; ignored while read-only
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if !self.editable || self.mode == mode {
            return;
        }
        tracing::debug!(?mode, "Interaction mode changed");
        self.mode = mode;
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn camera_controls_enabled(&self) -> bool {
        self.mode == InteractionMode::Orbit
    }

    pub fn artwork_drag_enabled(&self) -> bool {
        self.editable && self.mode == InteractionMode::Reposition
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// Feed one pointer event; `current` is the host's latest settings
    pub fn handle_pointer(&mut self, event: PointerEvent, current: &AdjustmentSettings) -> PointerResponse {
        match event {
            PointerEvent::Down => {
                self.pointer_down = true;
                PointerResponse::Ignored
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.pointer_down = false;
                PointerResponse::Ignored
            }
            PointerEvent::Move { .. } if !self.pointer_down => PointerResponse::Ignored,
            PointerEvent::Move { dx, dy } => {
                if self.artwork_drag_enabled() {
                    PointerResponse::Reposition(current.translated(dx * self.sensitivity, dy * self.sensitivity))
                } else if self.camera_controls_enabled() {
                    PointerResponse::Orbit { dx, dy }
                } else {
                    PointerResponse::Ignored
                }
            }
        }
    }

    /// Preset result, or `None` while read-only
    pub fn quick_action(&self, action: QuickAction, current: &AdjustmentSettings) -> Option<AdjustmentSettings> {
        self.editable.then(|| action.apply(current, self.cover_scale))
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(false, DEFAULT_DRAG_SENSITIVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editable() -> InteractionController {
        InteractionController::new(true, DEFAULT_DRAG_SENSITIVITY)
    }

    #[test]
    fn test_drag_accumulates_offsets() {
        let mut controller = editable();
        controller.set_mode(InteractionMode::Reposition);

        let mut settings = AdjustmentSettings::default();
        controller.handle_pointer(PointerEvent::Down, &settings);
        for (dx, dy) in [(10.0, 0.0), (15.0, -5.0), (25.0, 30.0)] {
            match controller.handle_pointer(PointerEvent::Move { dx, dy }, &settings) {
                PointerResponse::Reposition(next) => settings = next,
                other => panic!("expected reposition, got {:?}", other),
            }
        }
        controller.handle_pointer(PointerEvent::Up, &settings);

        assert!((settings.offset_x - 0.1).abs() < 1e-6);
        assert!((settings.offset_y - 0.05).abs() < 1e-6);
        assert_eq!(settings.scale, 1.0);
        assert!(!controller.is_pointer_down());
    }

    #[test]
    fn test_drag_is_not_clamped() {
        let mut controller = editable();
        controller.set_mode(InteractionMode::Reposition);
        let settings = AdjustmentSettings::default();
        controller.handle_pointer(PointerEvent::Down, &settings);

        let response = controller.handle_pointer(PointerEvent::Move { dx: 5000.0, dy: 0.0 }, &settings);
        assert_eq!(response, PointerResponse::Reposition(settings.translated(10.0, 0.0)));
    }

    #[test]
    fn test_orbit_mode_never_emits_settings() {
        let mut controller = editable();
        let settings = AdjustmentSettings::default();
        assert!(controller.camera_controls_enabled());
        assert!(!controller.artwork_drag_enabled());

        controller.handle_pointer(PointerEvent::Down, &settings);
        let response = controller.handle_pointer(PointerEvent::Move { dx: 4.0, dy: 2.0 }, &settings);
        assert_eq!(response, PointerResponse::Orbit { dx: 4.0, dy: 2.0 });

        controller.set_mode(InteractionMode::Reposition);
        assert!(!controller.camera_controls_enabled());
        assert!(controller.artwork_drag_enabled());
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut controller = editable();
        controller.set_mode(InteractionMode::Reposition);
        let settings = AdjustmentSettings::default();

        let response = controller.handle_pointer(PointerEvent::Move { dx: 4.0, dy: 2.0 }, &settings);
        assert_eq!(response, PointerResponse::Ignored);

        controller.handle_pointer(PointerEvent::Down, &settings);
        controller.handle_pointer(PointerEvent::Leave, &settings);
        assert!(!controller.is_pointer_down());
    }

    #[test]
    fn test_read_only_never_emits() {
        let mut controller = InteractionController::new(false, DEFAULT_DRAG_SENSITIVITY);
        let settings = AdjustmentSettings::default();

        controller.set_mode(InteractionMode::Reposition);
        assert_eq!(controller.mode(), InteractionMode::Orbit);

        controller.handle_pointer(PointerEvent::Down, &settings);
        for _ in 0..10 {
            let response = controller.handle_pointer(PointerEvent::Move { dx: 20.0, dy: 20.0 }, &settings);
            assert!(!matches!(response, PointerResponse::Reposition(_)));
        }
        for action in QuickAction::ALL {
            assert!(controller.quick_action(action, &settings).is_none());
        }
    }

    #[test]
    fn test_losing_edit_rights_returns_to_orbit() {
        let mut controller = editable();
        controller.set_mode(InteractionMode::Reposition);
        controller.set_editable(false);
        assert_eq!(controller.mode(), InteractionMode::Orbit);
    }

    #[test]
    fn test_quick_action_presets() {
        let controller = editable();
        let settings = AdjustmentSettings {
            scale: 2.0,
            offset_x: 0.3,
            offset_y: -0.2,
            rotation_degrees: 45.0,
            ..Default::default()
        };

        let centered = controller.quick_action(QuickAction::Center, &settings).unwrap();
        assert_eq!((centered.offset_x, centered.offset_y), (0.0, 0.0));
        assert_eq!(centered.scale, 2.0);
        assert_eq!(centered.rotation_degrees, 45.0);

        let contain = controller.quick_action(QuickAction::FitContain, &settings).unwrap();
        assert_eq!(contain.scale, 1.0);
        assert_eq!((contain.offset_x, contain.offset_y), (0.0, 0.0));
        assert_eq!(contain.rotation_degrees, 45.0);

        let cover = controller.quick_action(QuickAction::FitCover, &settings).unwrap();
        assert_eq!(cover.scale, 1.25);
        assert_eq!((cover.offset_x, cover.offset_y), (0.0, 0.0));
    }

    #[test]
    fn test_hints() {
        assert_eq!(InteractionMode::Reposition.hint(), "Drag to position the artwork");
        assert_eq!(InteractionMode::Orbit.hint(), "Drag to rotate the view");
    }
}

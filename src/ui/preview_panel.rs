//! 3D Mockup Preview Panel
//!
//! Shows the rendered mug, turns pointer drags on it into viewer pointer
//! events and overlays the artwork loading state.

use crate::interaction::{InteractionMode, PointerEvent};
use crate::ui::{draw_texture, draw_texture_placeholder};
use crate::viewer::LoadStatus;

/// Scroll distance (in points) that counts as one wheel step
const SCROLL_POINTS_PER_STEP: f32 = 50.0;

/// Actions that can be returned from the preview panel
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewAction {
    /// Pointer input on the viewport; height is in the same units as the deltas
    Pointer { event: PointerEvent, viewport_height: f32 },
    /// Wheel steps, positive = zoom in
    Scroll(f32),
    /// Decode the artwork again after a failure
    RetryArtwork,
}

/// Turns per-frame drag state into the pointer protocol
#[derive(Debug, Default)]
pub struct PointerTracker {
    down: bool,
}

impl PointerTracker {
    /// Events for one frame
    ///
    /// `contains_pointer` is whether the pointer is still over the viewport.
    pub fn update(
        &mut self,
        started: bool,
        delta: egui::Vec2,
        stopped: bool,
        contains_pointer: bool,
    ) -> Vec<PointerEvent> {
        let mut events = Vec::new();

        if started && !self.down {
            self.down = true;
            events.push(PointerEvent::Down);
        }

        if self.down && !contains_pointer {
            self.down = false;
            events.push(PointerEvent::Leave);
            return events;
        }

        if self.down && delta != egui::Vec2::ZERO {
            events.push(PointerEvent::Move { dx: delta.x, dy: delta.y });
        }

        if stopped && self.down {
            self.down = false;
            events.push(PointerEvent::Up);
        }

        events
    }

    pub fn is_down(&self) -> bool {
        self.down
    }
}

/// State for the preview panel
pub struct PreviewPanel {
    /// egui texture ID for the rendered 3D view
    pub texture_id: Option<egui::TextureId>,
    /// Size of the 3D viewport in the panel (in logical pixels)
    viewport_size: (f32, f32),
    pointer: PointerTracker,
}

impl Default for PreviewPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self {
            texture_id: None,
            viewport_size: (640.0, 480.0),
            pointer: PointerTracker::default(),
        }
    }

    /// Render target size in physical pixels
    pub fn target_size(&self, pixels_per_point: f32) -> (u32, u32) {
        (
            (self.viewport_size.0 * pixels_per_point).round().max(1.0) as u32,
            (self.viewport_size.1 * pixels_per_point).round().max(1.0) as u32,
        )
    }

    /// Render the viewport filling the available space
    ///
    /// Returns a list of actions to be handled by the app.
    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        status: &LoadStatus,
        editable: bool,
        mode: InteractionMode,
    ) -> Vec<PreviewAction> {
        let mut actions = Vec::new();

        let available = ui.available_size();
        let viewport_size = egui::vec2(available.x.max(200.0), available.y.max(150.0));
        let (rect, response) = ui.allocate_exact_size(viewport_size, egui::Sense::click_and_drag());

        let contains_pointer = ui
            .input(|i| i.pointer.hover_pos())
            .is_some_and(|pos| rect.contains(pos));
        let delta = if response.dragged_by(egui::PointerButton::Primary) {
            response.drag_delta()
        } else {
            egui::Vec2::ZERO
        };
        let events = self.pointer.update(
            response.drag_started_by(egui::PointerButton::Primary),
            delta,
            response.drag_stopped(),
            contains_pointer,
        );
        actions.extend(events.into_iter().map(|event| PreviewAction::Pointer {
            event,
            viewport_height: rect.height(),
        }));

        // Scroll zoom only while hovering the viewport
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.0 {
                actions.push(PreviewAction::Scroll(scroll / SCROLL_POINTS_PER_STEP));
            }
        }

        if let Some(tex_id) = self.texture_id {
            draw_texture(ui, tex_id, rect);
        } else {
            draw_texture_placeholder(ui, rect, "Preparing preview…");
        }

        if editable {
            self.draw_hint(ui, rect, mode);
        } else {
            self.draw_badge(ui, rect, "360° view");
        }

        match status {
            LoadStatus::Loading => {
                self.draw_overlay(ui, rect, |ui| {
                    ui.spinner();
                    ui.label("Loading artwork…");
                });
            }
            LoadStatus::LoadFailed { reason } => {
                self.draw_overlay(ui, rect, |ui| {
                    ui.label(egui::RichText::new("Artwork could not be loaded").strong());
                    ui.label(egui::RichText::new(reason.as_str()).small().weak());
                    if ui.button("Retry").clicked() {
                        actions.push(PreviewAction::RetryArtwork);
                    }
                });
            }
            LoadStatus::Idle | LoadStatus::Ready => {}
        }

        self.viewport_size = (viewport_size.x, viewport_size.y);
        actions
    }

    fn draw_hint(&self, ui: &egui::Ui, rect: egui::Rect, mode: InteractionMode) {
        ui.painter().text(
            rect.center_bottom() - egui::vec2(0.0, 16.0),
            egui::Align2::CENTER_BOTTOM,
            mode.hint(),
            egui::FontId::proportional(13.0),
            egui::Color32::from_gray(110),
        );
    }

    fn draw_badge(&self, ui: &egui::Ui, rect: egui::Rect, text: &str) {
        let painter = ui.painter();
        let galley = painter.layout_no_wrap(
            text.to_string(),
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
        let badge = egui::Rect::from_min_size(
            rect.left_top() + egui::vec2(12.0, 12.0),
            galley.size() + egui::vec2(16.0, 8.0),
        );
        painter.rect_filled(badge, 10.0, egui::Color32::from_black_alpha(150));
        painter.galley(badge.min + egui::vec2(8.0, 4.0), galley, egui::Color32::WHITE);
    }

    fn draw_overlay(&self, ui: &mut egui::Ui, rect: egui::Rect, add_contents: impl FnOnce(&mut egui::Ui)) {
        ui.painter()
            .rect_filled(rect, 0.0, egui::Color32::from_white_alpha(170));

        let inner = egui::Rect::from_center_size(rect.center(), egui::vec2(260.0, 110.0));
        let mut child = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(inner)
                .layout(egui::Layout::top_down(egui::Align::Center)),
        );
        add_contents(&mut child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_produces_down_move_up() {
        let mut tracker = PointerTracker::default();
        assert_eq!(
            tracker.update(true, egui::vec2(3.0, 1.0), false, true),
            vec![PointerEvent::Down, PointerEvent::Move { dx: 3.0, dy: 1.0 }]
        );
        assert!(tracker.is_down());
        assert_eq!(tracker.update(false, egui::Vec2::ZERO, false, true), vec![]);
        assert_eq!(tracker.update(false, egui::Vec2::ZERO, true, true), vec![PointerEvent::Up]);
        assert!(!tracker.is_down());
    }

    #[test]
    fn test_leaving_viewport_ends_drag() {
        let mut tracker = PointerTracker::default();
        tracker.update(true, egui::Vec2::ZERO, false, true);
        assert_eq!(
            tracker.update(false, egui::vec2(5.0, 0.0), false, false),
            vec![PointerEvent::Leave]
        );
        // The drag keeps going outside but nothing more is reported.
        assert_eq!(tracker.update(false, egui::vec2(5.0, 0.0), false, false), vec![]);
        assert_eq!(tracker.update(false, egui::Vec2::ZERO, true, false), vec![]);
    }

    #[test]
    fn test_hover_without_press_is_silent() {
        let mut tracker = PointerTracker::default();
        assert!(tracker.update(false, egui::Vec2::ZERO, false, true).is_empty());
    }

    #[test]
    fn test_target_size_uses_pixels_per_point() {
        let panel = PreviewPanel::new();
        assert_eq!(panel.target_size(2.0), (1280, 960));
    }
}

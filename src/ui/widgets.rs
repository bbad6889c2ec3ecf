//! Reusable UI widgets with consistent behavior
//!
//! Sliders that reset to their default on right-click, color swatches, and the
//! helpers that hand wgpu textures to egui.

use egui::{PointerButton, Response, Slider, Ui};
use egui_wgpu::Renderer as EguiRenderer;
use std::ops::RangeInclusive;

use crate::settings::HexColor;

// ============================================================================
// Resettable Slider
// ============================================================================

/// Slider that snaps back to `default` on right-click.
///
/// # Example
/// ```ignore
/// Resettable::slider(&mut zoom, 10.0..=300.0, 100.0)
///     .suffix("%")
///     .show(ui);
/// ```
pub struct Resettable<'a> {
    value: &'a mut f32,
    default: f32,
    range: RangeInclusive<f32>,
    suffix: Option<&'a str>,
    text: Option<&'a str>,
}

impl<'a> Resettable<'a> {
    pub fn slider(value: &'a mut f32, range: RangeInclusive<f32>, default: f32) -> Self {
        Self {
            value,
            default,
            range,
            suffix: None,
            text: None,
        }
    }

    /// Set the suffix text (e.g., "%", "°").
    pub fn suffix(mut self, suffix: &'a str) -> Self {
        self.suffix = Some(suffix);
        self
    }

    /// Label shown after the slider
    pub fn text(mut self, text: &'a str) -> Self {
        self.text = Some(text);
        self
    }

    /// Show the widget and return the response.
    pub fn show(self, ui: &mut Ui) -> Response {
        // Values from outside the range are shown as-is until the user drags
        let mut slider = Slider::new(self.value, self.range).clamping(egui::SliderClamping::Edits);
        if let Some(suffix) = self.suffix {
            slider = slider.suffix(suffix);
        }
        if let Some(text) = self.text {
            slider = slider.text(text);
        }
        let mut response = ui.add(slider);

        if response.clicked_by(PointerButton::Secondary) {
            *self.value = self.default;
            response.mark_changed();
        }
        response
    }
}

// ============================================================================
// Color Swatches
// ============================================================================

pub fn to_color32(color: HexColor) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

/// Clickable square filled with `color`, outlined when selected.
pub fn color_swatch(ui: &mut Ui, color: HexColor, selected: bool) -> Response {
    let size = egui::vec2(22.0, 22.0);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        painter.rect_filled(rect, 4.0, to_color32(color));

        let stroke = if selected {
            egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
        } else if response.hovered() {
            egui::Stroke::new(1.0, egui::Color32::from_gray(160))
        } else {
            egui::Stroke::new(1.0, egui::Color32::from_gray(80))
        };
        painter.rect_stroke(rect, 4.0, stroke, egui::StrokeKind::Outside);
    }

    response.on_hover_text(color.to_string())
}

// ============================================================================
// Texture Registration Helpers
// ============================================================================

/// Register a wgpu TextureView with egui, freeing any previous registration.
pub fn register_egui_texture(
    egui_renderer: &mut EguiRenderer,
    device: &wgpu::Device,
    texture_view: &wgpu::TextureView,
    current_id: &mut Option<egui::TextureId>,
) -> egui::TextureId {
    free_egui_texture(egui_renderer, current_id);
    let texture_id = egui_renderer.register_native_texture(device, texture_view, wgpu::FilterMode::Linear);
    *current_id = Some(texture_id);
    texture_id
}

/// Free an egui texture if it exists, setting the ID to None.
pub fn free_egui_texture(egui_renderer: &mut EguiRenderer, current_id: &mut Option<egui::TextureId>) {
    if let Some(id) = current_id.take() {
        egui_renderer.free_texture(&id);
    }
}

// ============================================================================
// Texture Rendering Helpers
// ============================================================================

/// Full UV rect (0,0) to (1,1) for rendering entire texture.
pub const FULL_UV: egui::Rect = egui::Rect {
    min: egui::pos2(0.0, 0.0),
    max: egui::pos2(1.0, 1.0),
};

/// Draw a texture filling a rect with full UVs.
pub fn draw_texture(ui: &Ui, texture_id: egui::TextureId, rect: egui::Rect) {
    ui.painter().image(texture_id, rect, FULL_UV, egui::Color32::WHITE);
}

/// Draw a placeholder when texture is not available.
pub fn draw_texture_placeholder(ui: &Ui, rect: egui::Rect, message: &str) {
    ui.painter().rect_filled(rect, 4.0, egui::Color32::from_gray(235));
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        message,
        egui::FontId::default(),
        egui::Color32::GRAY,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swatch_color_conversion() {
        let color = HexColor::from_rgb_u32(0xe36888);
        assert_eq!(to_color32(color), egui::Color32::from_rgb(0xe3, 0x68, 0x88));
    }
}

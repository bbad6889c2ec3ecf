//! Artwork Adjustment Panel
//!
//! Mode toggle, quick presets, zoom / position / rotation sliders and surface
//! color swatches. Only shown when the preview is editable; every change is
//! returned as an action carrying the complete new settings.

use crate::interaction::{InteractionMode, QuickAction};
use crate::settings::{AdjustmentSettings, HexColor};
use crate::ui::widgets::{color_swatch, Resettable};

/// Preset surface colors
pub const SURFACE_SWATCHES: [HexColor; 6] = [
    HexColor::from_rgb_u32(0xffffff),
    HexColor::from_rgb_u32(0x000000),
    HexColor::from_rgb_u32(0xe36888),
    HexColor::from_rgb_u32(0xf2d88f),
    HexColor::from_rgb_u32(0x6698cc),
    HexColor::from_rgb_u32(0x2f4f4f),
];

pub const ZOOM_PERCENT_RANGE: std::ops::RangeInclusive<f32> = 10.0..=300.0;
pub const POSITION_RANGE: std::ops::RangeInclusive<f32> = -0.6..=0.6;
pub const ROTATION_RANGE: std::ops::RangeInclusive<f32> = -180.0..=180.0;

/// Actions that can be returned from the editor panel
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    SetMode(InteractionMode),
    QuickAction(QuickAction),
    Edit(AdjustmentSettings),
    ResetCamera,
    OpenArtwork,
}

/// Slider values shown in the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderValues {
    pub zoom_percent: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub rotation: f32,
}

impl SliderValues {
    pub fn from_settings(settings: &AdjustmentSettings) -> Self {
        Self {
            zoom_percent: settings.scale * 100.0,
            offset_x: settings.offset_x,
            offset_y: settings.offset_y,
            rotation: settings.display_rotation(),
        }
    }

    /// Settings with these slider values; untouched sliders keep the exact input value
    pub fn apply_to(&self, settings: &AdjustmentSettings) -> AdjustmentSettings {
        let shown = Self::from_settings(settings);
        let mut next = settings.clone();
        if self.zoom_percent != shown.zoom_percent {
            next.scale = (self.zoom_percent / 100.0).max(0.01);
        }
        if self.offset_x != shown.offset_x {
            next.offset_x = self.offset_x;
        }
        if self.offset_y != shown.offset_y {
            next.offset_y = self.offset_y;
        }
        if self.rotation != shown.rotation {
            next.rotation_degrees = self.rotation;
        }
        next
    }
}

/// State for the editor panel
#[derive(Debug, Default)]
pub struct EditorPanel;

impl EditorPanel {
    pub fn new() -> Self {
        Self
    }

    /// Render the panel contents
    ///
    /// Returns a list of actions to be handled by the app.
    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        settings: &AdjustmentSettings,
        mode: InteractionMode,
        artwork_label: &str,
    ) -> Vec<EditorAction> {
        let mut actions = Vec::new();

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Artwork").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Open…").clicked() {
                    actions.push(EditorAction::OpenArtwork);
                }
            });
        });
        ui.label(egui::RichText::new(artwork_label).small().weak());

        ui.add_space(8.0);
        ui.separator();
        ui.add_space(4.0);

        // Mode toggle
        ui.horizontal(|ui| {
            for (label, target) in [
                ("Rotate Mug", InteractionMode::Orbit),
                ("Move Art", InteractionMode::Reposition),
            ] {
                if ui.selectable_label(mode == target, label).clicked() && mode != target {
                    actions.push(EditorAction::SetMode(target));
                }
            }
        });
        ui.label(egui::RichText::new(mode.hint()).small().weak());

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            for action in QuickAction::ALL {
                if ui.button(action.label()).clicked() {
                    actions.push(EditorAction::QuickAction(action));
                }
            }
        });

        ui.add_space(8.0);
        ui.separator();
        ui.add_space(4.0);

        let shown = SliderValues::from_settings(settings);
        let mut values = shown;
        let mut changed = false;

        ui.label(egui::RichText::new("Placement").strong());
        changed |= Resettable::slider(&mut values.zoom_percent, ZOOM_PERCENT_RANGE, 100.0)
            .suffix("%")
            .text("Zoom")
            .show(ui)
            .changed();
        changed |= Resettable::slider(&mut values.offset_x, POSITION_RANGE, 0.0)
            .text("Position X")
            .show(ui)
            .changed();
        changed |= Resettable::slider(&mut values.offset_y, POSITION_RANGE, 0.0)
            .text("Position Y")
            .show(ui)
            .changed();
        changed |= Resettable::slider(&mut values.rotation, ROTATION_RANGE, 0.0)
            .suffix("°")
            .text("Rotation")
            .show(ui)
            .changed();

        let mut next = if changed && values != shown {
            values.apply_to(settings)
        } else {
            settings.clone()
        };

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Mug Color").strong());
        ui.horizontal_wrapped(|ui| {
            for swatch in SURFACE_SWATCHES {
                if color_swatch(ui, swatch, next.surface_color == swatch).clicked() {
                    next.surface_color = swatch;
                }
            }

            let mut rgb = next.surface_color.to_array();
            if egui::color_picker::color_edit_button_srgb(ui, &mut rgb).changed() {
                next.surface_color = HexColor::new(rgb[0], rgb[1], rgb[2]);
            }
        });

        if &next != settings {
            actions.push(EditorAction::Edit(next));
        }

        ui.add_space(8.0);
        ui.separator();
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Camera").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Reset").clicked() {
                    actions.push(EditorAction::ResetCamera);
                }
            });
        });
        ui.label(egui::RichText::new("Scroll to zoom").small().weak());

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_shown_as_percent() {
        let settings = AdjustmentSettings {
            scale: 1.5,
            rotation_degrees: 270.0,
            ..Default::default()
        };
        let values = SliderValues::from_settings(&settings);
        assert_eq!(values.zoom_percent, 150.0);
        assert_eq!(values.rotation, -90.0);
    }

    #[test]
    fn test_untouched_sliders_keep_exact_values() {
        // Out-of-range values survive an edit of another slider.
        let settings = AdjustmentSettings {
            scale: 5.0,
            offset_x: 1.5,
            rotation_degrees: 720.0,
            ..Default::default()
        };
        let mut values = SliderValues::from_settings(&settings);
        values.offset_y = 0.2;

        let next = values.apply_to(&settings);
        assert_eq!(next.scale, 5.0);
        assert_eq!(next.offset_x, 1.5);
        assert_eq!(next.offset_y, 0.2);
        assert_eq!(next.rotation_degrees, 720.0);
    }

    #[test]
    fn test_zoom_edit_converts_back() {
        let settings = AdjustmentSettings::default();
        let mut values = SliderValues::from_settings(&settings);
        values.zoom_percent = 250.0;
        assert_eq!(values.apply_to(&settings).scale, 2.5);
    }

    #[test]
    fn test_swatches() {
        assert_eq!(SURFACE_SWATCHES[0], HexColor::WHITE);
        assert_eq!(SURFACE_SWATCHES[5].to_string(), "#2f4f4f");
    }
}

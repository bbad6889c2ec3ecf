//! egui panels for the mockup window
//!
//! The preview panel shows the rendered mug and captures pointer input; the
//! editor panel holds the adjustment controls.

pub mod editor_panel;
pub mod preview_panel;
pub mod widgets;

pub use editor_panel::{EditorAction, EditorPanel, SliderValues, SURFACE_SWATCHES};
pub use preview_panel::{PointerTracker, PreviewAction, PreviewPanel};
pub use widgets::{
    color_swatch, draw_texture, draw_texture_placeholder, free_egui_texture, register_egui_texture, Resettable,
    FULL_UV,
};

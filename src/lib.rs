//! Mug Mockup Library
//!
//! Interactive mockup preview for made-to-order mugs: composites a flat artwork
//! onto the mug's print band, renders the mug as a lit, orbitable 3D object and
//! lets an operator drag the artwork directly on the live preview.

pub mod app;
pub mod artwork;
pub mod compositor;
pub mod config;
pub mod gpu_context;
pub mod host;
pub mod interaction;
pub mod scene;
pub mod settings;
pub mod shaders;
pub mod telemetry;
pub mod ui;
pub mod viewer;

pub use app::App;
pub use artwork::{ArtworkAsset, ArtworkError, ArtworkLoader, ArtworkSource};
pub use compositor::{composite, fit_contain, ArtworkPlacement, CompositeOutcome, PrintSurfaceRaster};
pub use config::{ConfigError, ViewerConfig};
pub use host::EditorHost;
pub use interaction::{InteractionController, InteractionMode, PointerEvent, PointerResponse, QuickAction};
pub use scene::{LightRig, MockupRenderer, MugDimensions, OrbitCamera, RenderLoop, SceneModel};
pub use settings::{AdjustmentSettings, HexColor};
pub use viewer::{LoadStatus, MockupViewer, ViewerProps};

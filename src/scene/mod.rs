//! 3D mug scene
//!
//! Procedural mug geometry, materials, lights, the orbit camera and the wgpu
//! renderer that draws them into an offscreen texture.

pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod mesh;
pub mod model;
pub mod render_loop;
pub mod renderer;

pub use camera::OrbitCamera;
pub use geometry::MugDimensions;
pub use lighting::{DirectionalLight, LightRig};
pub use mesh::{MockupMesh, MockupVertex};
pub use model::{Material, PartKind, SceneModel, ScenePart, Shading, Side};
pub use render_loop::{CancellationToken, RenderLoop};
pub use renderer::{MockupRenderer, RENDER_FORMAT};

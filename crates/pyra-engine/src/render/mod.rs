//! Scene rendering.
//!
//! Setup-time pieces (mesh upload, uniform buffer, pipeline) live next to the steady-state
//! frame loop that uses them.
//!
//! Convention:
//! - right-handed world space; the model spins about Z, the camera sits on +Z looking at the origin
//! - matrices are column-major and uploaded as one `Transforms` block per frame

mod frame;
mod geometry;
pub mod pipeline;
pub mod resources;
mod scene;
mod uniforms;

pub use frame::{FrameOutcome, FrameRenderer};
pub use geometry::{Vertex, PYRAMID_INDICES, PYRAMID_VERTICES};
pub use pipeline::BuiltPipeline;
pub use resources::StaticMesh;
pub use scene::SceneResources;
pub use uniforms::{TransformAnimator, Transforms};

/// Bundled WGSL source with `vs_main` and `fs_main`.
pub const PYRAMID_SHADER: &str = include_str!("../../shaders/pyramid.wgsl");

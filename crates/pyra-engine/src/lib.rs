//! Pyra engine crate.
//!
//! A single windowed wgpu session: capability negotiation, static scene resources, a fixed
//! depth-tested pipeline, a surface state machine that survives resizes and stale swapchains,
//! and a per-frame renderer.

pub mod device;
pub mod logging;
pub mod render;
pub mod session;
pub mod time;
pub mod window;

pub use session::Session;

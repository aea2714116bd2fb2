//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and drives the session's load / frame / close
//! callbacks from window events.

mod host;
mod runtime;

pub use host::FramebufferSource;
pub use runtime::{Runtime, RuntimeConfig};

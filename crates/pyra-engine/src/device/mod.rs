//! GPU negotiation + presentation surface management.
//!
//! This module is responsible for:
//! - negotiating the wgpu Adapter/Device/Queue against a surface
//! - watching the device for loss and uncaptured errors
//! - keeping the Surface configuration and depth attachment in step with the drawable size

mod depth;
mod diagnostics;
mod error;
mod frame;
mod health;
mod init;
mod negotiate;
mod scoped;
mod surface;
mod validation;
mod window_surface;

pub use depth::{DepthAttachment, DEPTH_FORMAT};
pub use diagnostics::{AdapterProperties, Diagnostics, LimitsSnapshot};
pub use error::{AcquireFailure, NegotiationStage, SessionError, SessionResult};
pub use frame::FrameView;
pub use health::{DeviceHealth, DeviceLoss};
pub use init::GpuConfig;
pub use negotiate::{negotiate, Negotiated};
pub use scoped::Scoped;
#[cfg(test)]
pub(crate) use scoped::journal as release_journal;
pub use surface::{
    build_configuration, SurfaceBackend, SurfaceCaps, SurfaceConfig, SurfacePreferences,
    SurfaceSession, SurfaceState,
};
pub use validation::capture_errors;
#[cfg(test)]
pub(crate) use validation::noop_device;
pub use window_surface::WindowSurface;

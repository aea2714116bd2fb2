/// Configuration for negotiation and surface setup.
///
/// Backend pinning is expressed through `backends`; negotiation always goes through the same
/// "compatible surface" request regardless of which backends are allowed.
#[derive(Debug, Clone)]
pub struct GpuConfig {
    /// Backends the instance may use.
    pub backends: wgpu::Backends,

    /// Adapter power preference.
    pub power_preference: wgpu::PowerPreference,

    /// Force a software adapter.
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode requested for the surface.
    ///
    /// Falls back to the first supported mode when unavailable.
    pub present_mode: wgpu::PresentMode,

    /// Alpha mode requested for the surface.
    pub alpha_mode: wgpu::CompositeAlphaMode,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl GpuConfig {
    /// Default configuration with `WGPU_BACKEND` applied when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(backends) = wgpu::Backends::from_env() {
            log::info!("backends pinned from WGPU_BACKEND: {backends:?}");
            config.backends = backends;
        }
        config
    }
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            desired_maximum_frame_latency: 2,
        }
    }
}

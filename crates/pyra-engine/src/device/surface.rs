use super::error::{AcquireFailure, SessionError, SessionResult};
use super::health::DeviceHealth;
use super::GpuConfig;

/// Formats and modes a surface supports on the negotiated adapter.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SurfaceCaps {
    pub formats: Vec<wgpu::TextureFormat>,
    pub present_modes: Vec<wgpu::PresentMode>,
    pub alpha_modes: Vec<wgpu::CompositeAlphaMode>,
}

impl From<&wgpu::SurfaceCapabilities> for SurfaceCaps {
    fn from(caps: &wgpu::SurfaceCapabilities) -> Self {
        Self {
            formats: caps.formats.clone(),
            present_modes: caps.present_modes.clone(),
            alpha_modes: caps.alpha_modes.clone(),
        }
    }
}

/// Applied surface configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfaceConfig {
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: wgpu::CompositeAlphaMode,
}

impl SurfaceConfig {
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn to_wgpu(&self, desired_maximum_frame_latency: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: self.present_mode,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        }
    }
}

/// Surface preferences taken from [`GpuConfig`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfacePreferences {
    pub prefer_srgb: bool,
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: wgpu::CompositeAlphaMode,
}

impl From<&GpuConfig> for SurfacePreferences {
    fn from(config: &GpuConfig) -> Self {
        Self {
            prefer_srgb: config.prefer_srgb,
            present_mode: config.present_mode,
            alpha_mode: config.alpha_mode,
        }
    }
}

impl Default for SurfacePreferences {
    fn default() -> Self {
        Self::from(&GpuConfig::default())
    }
}

pub(crate) fn choose_surface_format(
    caps: &SurfaceCaps,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

pub(crate) fn choose_present_mode(
    caps: &SurfaceCaps,
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    if caps.present_modes.contains(&requested) {
        return requested;
    }
    // Fifo is the only mode every backend must support.
    caps.present_modes
        .first()
        .copied()
        .unwrap_or(wgpu::PresentMode::Fifo)
}

pub(crate) fn choose_alpha_mode(
    caps: &SurfaceCaps,
    requested: wgpu::CompositeAlphaMode,
) -> wgpu::CompositeAlphaMode {
    Some(requested)
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Builds the configuration for a drawable of `size`.
///
/// Returns `None` when the surface reports no formats or the size has zero area.
pub fn build_configuration(
    caps: &SurfaceCaps,
    prefs: &SurfacePreferences,
    size: (u32, u32),
) -> Option<SurfaceConfig> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        return None;
    }

    Some(SurfaceConfig {
        format: choose_surface_format(caps, prefs.prefer_srgb)?,
        width,
        height,
        present_mode: choose_present_mode(caps, prefs.present_mode),
        alpha_mode: choose_alpha_mode(caps, prefs.alpha_mode),
    })
}

/// Lifecycle of the presentation surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceState {
    Unconfigured,
    Configured,
    Stale,
    TornDown,
}

/// Operations the surface state machine needs from the platform surface.
///
/// The depth attachment lives with the backend so it can be rebuilt in the same step as the
/// color configuration.
pub trait SurfaceBackend {
    /// A drawable acquired for one frame.
    type Frame;

    fn capabilities(&self) -> SurfaceCaps;

    /// Current drawable size in physical pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    fn configure(&mut self, config: &SurfaceConfig);

    fn rebuild_depth(&mut self, width: u32, height: u32);

    fn release_depth(&mut self);

    /// Depth attachment extent, if one exists.
    fn depth_extent(&self) -> Option<(u32, u32)>;

    fn acquire(&mut self) -> Result<Self::Frame, AcquireFailure>;
}

/// Owns the surface configuration and keeps it in step with the drawable size.
pub struct SurfaceSession<B: SurfaceBackend> {
    backend: B,
    prefs: SurfacePreferences,
    state: SurfaceState,
    config: Option<SurfaceConfig>,
    reconfigurations: u64,
}

impl<B: SurfaceBackend> SurfaceSession<B> {
    pub fn new(backend: B, prefs: SurfacePreferences) -> Self {
        Self {
            backend,
            prefs,
            state: SurfaceState::Unconfigured,
            config: None,
            reconfigurations: 0,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn config(&self) -> Option<&SurfaceConfig> {
        self.config.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Format the surface is (or would be) configured with, independent of the drawable size.
    pub fn preferred_format(&self) -> Option<wgpu::TextureFormat> {
        choose_surface_format(&self.backend.capabilities(), self.prefs.prefer_srgb)
    }

    /// Number of times the surface was configured after the first time.
    pub fn reconfigurations(&self) -> u64 {
        self.reconfigurations
    }

    /// Applies a configuration sized to the current framebuffer and rebuilds the depth
    /// attachment to match.
    ///
    /// Returns `false` when no configuration could be built (zero-area drawable or no supported
    /// formats); the surface then stays unusable until a later call succeeds.
    pub fn configure(&mut self) -> bool {
        if self.state == SurfaceState::TornDown {
            return false;
        }

        let size = self.backend.framebuffer_size();
        let caps = self.backend.capabilities();
        let Some(config) = build_configuration(&caps, &self.prefs, size) else {
            if caps.formats.is_empty() {
                log::warn!("surface reports no supported formats");
            } else {
                log::debug!("drawable is {}x{}; deferring configuration", size.0, size.1);
            }
            if self.state == SurfaceState::Configured {
                self.backend.release_depth();
                self.state = SurfaceState::Stale;
            }
            return false;
        };

        self.backend.configure(&config);
        self.backend.rebuild_depth(config.width, config.height);

        if self.config.is_some() {
            self.reconfigurations += 1;
            log::info!(
                "surface reconfigured: {}x{} {:?}",
                config.width,
                config.height,
                config.format
            );
        } else {
            log::info!(
                "surface configured: {}x{} {:?} {:?} {:?}",
                config.width,
                config.height,
                config.format,
                config.present_mode,
                config.alpha_mode
            );
        }

        self.config = Some(config);
        self.state = SurfaceState::Configured;
        true
    }

    /// Acquires the next drawable.
    ///
    /// `Ok(None)` means the surface was stale and has been reconfigured (or cannot be
    /// configured yet); the caller skips this frame and tries again on the next tick.
    pub fn acquire_frame_view(&mut self) -> SessionResult<Option<B::Frame>> {
        match self.state {
            SurfaceState::TornDown => return Ok(None),
            SurfaceState::Unconfigured | SurfaceState::Stale => {
                if !self.configure() {
                    return Ok(None);
                }
            }
            SurfaceState::Configured => {
                let current = self.backend.framebuffer_size();
                if self.config.map(|c| c.extent()) != Some(current) && !self.configure() {
                    return Ok(None);
                }
            }
        }

        match self.backend.acquire() {
            Ok(frame) => Ok(Some(frame)),
            Err(status) if status.is_transient() => {
                log::debug!("surface {status}; reconfiguring and skipping frame");
                self.backend.release_depth();
                self.state = SurfaceState::Stale;
                self.configure();
                Ok(None)
            }
            Err(status) => {
                log::error!("surface acquisition failed: {status}");
                Err(SessionError::SurfaceFatal(status))
            }
        }
    }

    /// [`acquire_frame_view`](Self::acquire_frame_view) guarded by the device's health.
    ///
    /// A recorded loss tears the surface down without another acquisition. A fatal status that
    /// arrives once the device is lost is reported as the loss.
    pub fn acquire_checked(&mut self, health: &DeviceHealth) -> SessionResult<Option<B::Frame>> {
        if let Some(lost) = health.lost() {
            self.tear_down();
            return Err(lost.to_error());
        }

        match self.acquire_frame_view() {
            Err(SessionError::SurfaceFatal(status)) => {
                let Some(lost) = health.lost() else {
                    return Err(SessionError::SurfaceFatal(status));
                };
                self.tear_down();
                Err(lost.to_error())
            }
            other => other,
        }
    }

    /// Releases the depth attachment and leaves the surface to be dropped. Idempotent.
    pub fn tear_down(&mut self) {
        if self.state == SurfaceState::TornDown {
            return;
        }
        self.backend.release_depth();
        self.config = None;
        self.state = SurfaceState::TornDown;
        log::debug!("surface session torn down");
    }
}

impl<B: SurfaceBackend> Drop for SurfaceSession<B> {
    fn drop(&mut self) {
        self.tear_down();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Scripted surface used to drive the state machine without a GPU.
    #[derive(Default)]
    pub(crate) struct FakeSurface {
        pub caps: SurfaceCaps,
        pub size: (u32, u32),
        pub script: VecDeque<Result<(), AcquireFailure>>,
        pub configured: Vec<SurfaceConfig>,
        pub depth: Option<(u32, u32)>,
        pub depth_builds: u32,
        pub depth_releases: u32,
        pub acquires: u32,
        /// Marked lost at the start of every acquisition.
        pub lose_on_acquire: Option<std::sync::Arc<DeviceHealth>>,
    }

    impl FakeSurface {
        pub(crate) fn new(size: (u32, u32)) -> Self {
            Self {
                caps: SurfaceCaps {
                    formats: vec![
                        wgpu::TextureFormat::Bgra8Unorm,
                        wgpu::TextureFormat::Bgra8UnormSrgb,
                    ],
                    present_modes: vec![wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox],
                    alpha_modes: vec![
                        wgpu::CompositeAlphaMode::Opaque,
                        wgpu::CompositeAlphaMode::PreMultiplied,
                    ],
                },
                size,
                ..Default::default()
            }
        }
    }

    impl SurfaceBackend for FakeSurface {
        type Frame = (u32, u32);

        fn capabilities(&self) -> SurfaceCaps {
            self.caps.clone()
        }

        fn framebuffer_size(&self) -> (u32, u32) {
            self.size
        }

        fn configure(&mut self, config: &SurfaceConfig) {
            self.configured.push(*config);
        }

        fn rebuild_depth(&mut self, width: u32, height: u32) {
            self.depth = Some((width, height));
            self.depth_builds += 1;
        }

        fn release_depth(&mut self) {
            if self.depth.take().is_some() {
                self.depth_releases += 1;
            }
        }

        fn depth_extent(&self) -> Option<(u32, u32)> {
            self.depth
        }

        fn acquire(&mut self) -> Result<Self::Frame, AcquireFailure> {
            self.acquires += 1;
            if let Some(health) = &self.lose_on_acquire {
                health.mark_lost("Unknown", "lost while acquiring");
            }
            match self.script.pop_front() {
                Some(Err(status)) => Err(status),
                _ => Ok(self.size),
            }
        }
    }

    fn session(size: (u32, u32)) -> SurfaceSession<FakeSurface> {
        SurfaceSession::new(FakeSurface::new(size), SurfacePreferences::default())
    }

    // ── configuration selection ───────────────────────────────────────────

    #[test]
    fn prefers_srgb_format() {
        let caps = FakeSurface::new((1, 1)).caps;
        assert_eq!(
            choose_surface_format(&caps, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(choose_surface_format(&caps, false), Some(wgpu::TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn no_formats_yields_no_configuration() {
        let caps = SurfaceCaps::default();
        assert!(build_configuration(&caps, &SurfacePreferences::default(), (640, 480)).is_none());
    }

    #[test]
    fn unsupported_modes_fall_back_to_first_supported() {
        let caps = SurfaceCaps {
            formats: vec![wgpu::TextureFormat::Rgba8Unorm],
            present_modes: vec![wgpu::PresentMode::Immediate],
            alpha_modes: vec![wgpu::CompositeAlphaMode::PostMultiplied],
        };
        let cfg = build_configuration(&caps, &SurfacePreferences::default(), (8, 8)).unwrap();
        assert_eq!(cfg.present_mode, wgpu::PresentMode::Immediate);
        assert_eq!(cfg.alpha_mode, wgpu::CompositeAlphaMode::PostMultiplied);
    }

    #[test]
    fn default_configuration_is_fifo_opaque() {
        let caps = FakeSurface::new((1, 1)).caps;
        let cfg = build_configuration(&caps, &SurfacePreferences::default(), (800, 600)).unwrap();
        assert_eq!(cfg.present_mode, wgpu::PresentMode::Fifo);
        assert_eq!(cfg.alpha_mode, wgpu::CompositeAlphaMode::Opaque);
        assert_eq!(cfg.extent(), (800, 600));
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn starts_unconfigured() {
        let s = session((640, 480));
        assert_eq!(s.state(), SurfaceState::Unconfigured);
        assert!(s.config().is_none());
    }

    #[test]
    fn configure_sizes_color_and_depth_alike() {
        let mut s = session((640, 480));
        assert!(s.configure());
        assert_eq!(s.state(), SurfaceState::Configured);
        assert_eq!(s.config().unwrap().extent(), (640, 480));
        assert_eq!(s.backend().depth_extent(), Some((640, 480)));
    }

    #[test]
    fn reconfigure_with_unchanged_size_is_identical() {
        let mut s = session((1024, 768));
        s.configure();
        let first = *s.config().unwrap();
        s.configure();
        let second = *s.config().unwrap();
        assert_eq!(first, second);
        assert_eq!(s.backend().configured[0], s.backend().configured[1]);
    }

    #[test]
    fn transient_statuses_skip_and_reconfigure() {
        let statuses = [
            AcquireFailure::Lost,
            AcquireFailure::Outdated,
            AcquireFailure::Timeout,
            AcquireFailure::Timeout,
            AcquireFailure::Lost,
            AcquireFailure::Outdated,
        ];

        for len in 1..=statuses.len() {
            let mut s = session((320, 200));
            s.configure();
            s.backend.script = statuses[..len].iter().copied().map(Err).collect();

            for step in 0..len {
                // Resize midway so the reconfiguration must pick up the new size.
                if step == len / 2 {
                    s.backend.size = (500 + step as u32, 300);
                }
                assert!(s.acquire_frame_view().unwrap().is_none());
                assert_eq!(s.state(), SurfaceState::Configured);
                let current = s.backend().framebuffer_size();
                assert_eq!(s.config().unwrap().extent(), current);
                assert_eq!(s.backend().depth_extent(), Some(current));
            }

            assert!(s.acquire_frame_view().unwrap().is_some());
            assert_eq!(s.backend().depth_releases, len as u32);
        }
    }

    #[test]
    fn fatal_statuses_are_errors() {
        for status in [AcquireFailure::OutOfMemory, AcquireFailure::Unknown] {
            let mut s = session((64, 64));
            s.configure();
            s.backend.script.push_back(Err(status));
            match s.acquire_frame_view() {
                Err(SessionError::SurfaceFatal(got)) => assert_eq!(got, status),
                other => panic!("expected fatal error, got {:?}", other.map(|f| f.is_some())),
            }
            // No reconfiguration was attempted.
            assert_eq!(s.backend().configured.len(), 1);
        }
    }

    #[test]
    fn resize_between_frames_is_absorbed_before_acquire() {
        let mut s = session((800, 600));
        assert!(s.acquire_frame_view().unwrap().is_some());

        s.backend.size = (1280, 720);
        let frame = s.acquire_frame_view().unwrap().unwrap();
        assert_eq!(frame, (1280, 720));
        assert_eq!(s.config().unwrap().extent(), (1280, 720));
        assert_eq!(s.backend().depth_extent(), Some((1280, 720)));
        assert_eq!(s.reconfigurations(), 1);
    }

    #[test]
    fn zero_area_drawable_skips_without_acquiring() {
        let mut s = session((0, 0));
        assert!(s.acquire_frame_view().unwrap().is_none());
        assert_eq!(s.backend().acquires, 0);
        assert_eq!(s.state(), SurfaceState::Unconfigured);

        s.backend.size = (200, 100);
        assert!(s.acquire_frame_view().unwrap().is_some());
        assert_eq!(s.state(), SurfaceState::Configured);
    }

    #[test]
    fn preferred_format_is_known_while_minimized() {
        let mut s = session((0, 0));
        assert!(!s.configure());
        assert_eq!(s.preferred_format(), Some(wgpu::TextureFormat::Bgra8UnormSrgb));

        s.backend.caps = SurfaceCaps::default();
        assert_eq!(s.preferred_format(), None);
    }

    #[test]
    fn minimizing_a_configured_surface_marks_it_stale() {
        let mut s = session((200, 100));
        s.configure();
        s.backend.size = (0, 0);
        assert!(s.acquire_frame_view().unwrap().is_none());
        assert_eq!(s.state(), SurfaceState::Stale);
        assert_eq!(s.backend().depth_extent(), None);
    }

    // ── device loss ───────────────────────────────────────────────────────

    #[test]
    fn device_loss_tears_down_without_acquiring() {
        let health = DeviceHealth::new();
        let mut s = session((640, 480));
        assert!(s.acquire_checked(&health).unwrap().is_some());
        assert_eq!(s.backend().acquires, 1);

        health.mark_lost("Unknown", "driver reset");
        for _ in 0..2 {
            let err = s.acquire_checked(&health).unwrap_err();
            assert!(matches!(err, SessionError::DeviceLost { ref message, .. } if message == "driver reset"));
        }

        assert_eq!(s.backend().acquires, 1);
        assert_eq!(s.state(), SurfaceState::TornDown);
        assert_eq!(s.backend().depth_releases, 1);
    }

    #[test]
    fn fatal_status_after_loss_reports_the_loss() {
        let health = std::sync::Arc::new(DeviceHealth::new());
        let mut s = session((640, 480));
        s.backend.lose_on_acquire = Some(health.clone());
        s.backend.script.push_back(Err(AcquireFailure::Unknown));

        let err = s.acquire_checked(&health).unwrap_err();
        assert!(matches!(err, SessionError::DeviceLost { .. }));
        assert_eq!(s.state(), SurfaceState::TornDown);
    }

    #[test]
    fn fatal_status_on_healthy_device_stays_fatal() {
        let health = DeviceHealth::new();
        let mut s = session((640, 480));
        s.backend.script.push_back(Err(AcquireFailure::OutOfMemory));

        let err = s.acquire_checked(&health).unwrap_err();
        assert!(matches!(err, SessionError::SurfaceFatal(AcquireFailure::OutOfMemory)));
        assert!(!health.is_lost());
    }

    #[test]
    fn tear_down_releases_depth_once() {
        let mut s = session((100, 100));
        s.configure();
        s.tear_down();
        s.tear_down();
        assert_eq!(s.state(), SurfaceState::TornDown);
        assert_eq!(s.backend().depth_releases, 1);
        assert!(s.acquire_frame_view().unwrap().is_none());
        assert!(!s.configure());
    }
}

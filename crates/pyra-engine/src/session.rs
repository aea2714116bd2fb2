//! The rendering session: one owner for every GPU object.

use std::sync::Arc;

use winit::window::Window;

use crate::device::{
    negotiate, DeviceHealth, Diagnostics, GpuConfig, Negotiated, Scoped, SessionError,
    SessionResult, SurfaceConfig, SurfacePreferences, SurfaceSession, SurfaceState,
    WindowSurface,
};
use crate::render::{FrameOutcome, FrameRenderer, SceneResources};
use crate::time::FrameTime;

/// How often (in ticks) frame statistics are logged at debug level.
const STATS_INTERVAL: u64 = 600;

/// Owns the instance, adapter, device, queue, surface and scene resources of one window.
///
/// Fields are declared in release order, the reverse of acquisition: scene resources first,
/// then queue, device, surface, adapter and finally the instance. The surface holds its own
/// adapter and device handles, so the backend objects behind them are freed when `surface`
/// drops, after the `device` and `adapter` fields have logged their release.
pub struct Session<'w> {
    renderer: FrameRenderer,
    scene: SceneResources,
    queue: Scoped<wgpu::Queue>,
    device: Scoped<wgpu::Device>,
    surface: SurfaceSession<WindowSurface<'w>>,
    adapter: Scoped<wgpu::Adapter>,
    instance: Scoped<wgpu::Instance>,

    health: Arc<DeviceHealth>,
    diagnostics: Diagnostics,
    dt_sum: f32,
}

impl<'w> Session<'w> {
    /// Runs the full setup sequence for `window`.
    ///
    /// On failure, everything acquired so far is released in reverse order before the error
    /// is returned.
    pub fn create(
        window: &'w Window,
        config: &GpuConfig,
        shader_source: &str,
    ) -> SessionResult<Self> {
        Self::setup(window, config, shader_source).inspect_err(|e| {
            log::error!("session setup failed: {e}");
        })
    }

    fn setup(window: &'w Window, config: &GpuConfig, shader_source: &str) -> SessionResult<Self> {
        let instance = Scoped::new(
            "instance",
            wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: config.backends,
                ..Default::default()
            }),
        );

        log::info!("instance created for backends {:?}", config.backends);

        let raw_surface = instance.create_surface(window)?;

        let Negotiated {
            adapter,
            device,
            queue,
            health,
            diagnostics,
        } = negotiate(&instance, &raw_surface, config)?;
        let adapter = Scoped::new("adapter", adapter);
        let device = Scoped::new("device", device);
        let queue = Scoped::new("queue", queue);

        let mut surface = SurfaceSession::new(
            WindowSurface::new(
                raw_surface,
                window,
                (*adapter).clone(),
                (*device).clone(),
                config.desired_maximum_frame_latency,
            ),
            SurfacePreferences::from(config),
        );
        surface.configure();

        let format = surface
            .config()
            .map(|c| c.format)
            .or_else(|| surface.preferred_format())
            .ok_or(SessionError::NoSurfaceFormat)?;

        let scene = SceneResources::create(&device, &queue, shader_source, format)?;

        log::info!("session ready");

        Ok(Self {
            renderer: FrameRenderer::new(),
            scene,
            queue,
            device,
            surface,
            adapter,
            instance,
            health,
            diagnostics,
            dt_sum: 0.0,
        })
    }

    /// Renders one frame.
    ///
    /// A recorded device loss tears the surface down and ends the session here, before any
    /// acquisition is attempted.
    pub fn frame(&mut self, time: &FrameTime) -> SessionResult<FrameOutcome> {
        let outcome = self.renderer.render(
            &mut self.surface,
            &self.health,
            &self.device,
            &self.queue,
            &self.scene,
        )?;

        if outcome == FrameOutcome::Skipped {
            log::debug!("frame {} skipped", time.frame_index);
        }

        self.dt_sum += time.dt;
        if (time.frame_index + 1) % STATS_INTERVAL == 0 {
            log::debug!(
                "frames: {} presented, {} skipped, {} reconfigurations, avg dt {:.2} ms",
                self.renderer.presented_frames(),
                self.renderer.skipped_frames(),
                self.surface.reconfigurations(),
                self.dt_sum / STATS_INTERVAL as f32 * 1000.0
            );
            self.dt_sum = 0.0;
        }

        Ok(outcome)
    }

    pub fn surface_state(&self) -> SurfaceState {
        self.surface.state()
    }

    pub fn surface_config(&self) -> Option<&SurfaceConfig> {
        self.surface.config()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn health(&self) -> &DeviceHealth {
        &self.health
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        log::info!(
            "tearing down session after {} frames ({} uncaptured backend errors)",
            self.renderer.presented_frames(),
            self.health.uncaptured_errors()
        );
        // Depth attachment goes before anything else; the surface itself is released with
        // its field.
        self.surface.tear_down();
    }
}

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::GpuConfig;
use crate::session::Session;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "pyra".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, renders into it until it is closed, then tears everything down.
    ///
    /// Returns the first fatal session error, if any.
    pub fn run(config: RuntimeConfig, gpu: GpuConfig, shader_source: String) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu, shader_source);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.into_result()
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    session: Session<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu: GpuConfig,
    shader_source: String,

    entry: Option<WindowEntry>,
    loaded: bool,
    fatal: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu: GpuConfig, shader_source: String) -> Self {
        Self {
            config,
            gpu,
            shader_source,
            entry: None,
            loaded: false,
            fatal: None,
        }
    }

    /// Keeps the first fatal error; later ones are only logged.
    fn record_fatal(&mut self, error: anyhow::Error) {
        log::error!("{error:#}");
        if self.fatal.is_none() {
            self.fatal = Some(error);
        }
    }

    fn into_result(mut self) -> Result<()> {
        self.on_close();
        match self.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// True once the window is gone, whether it closed normally or never opened.
    fn should_exit(&self) -> bool {
        self.loaded && self.entry.is_none()
    }

    fn window_id(&self) -> Option<WindowId> {
        self.entry.as_ref().map(|e| e.with_window(|w| w.id()))
    }

    /// Creates the window and runs session setup. Happens once per run.
    fn on_load(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.loaded = true;

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu = &self.gpu;
        let shader_source = self.shader_source.as_str();

        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            session_builder: |w| Session::create(w, gpu, shader_source),
        }
        .try_build();

        match entry {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e).context("rendering session setup failed")),
        }
    }

    fn on_frame(&mut self) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let result = entry.with_mut(|fields| {
            let time = fields.clock.tick();
            fields.session.frame(&time)
        });

        if let Err(e) = result {
            self.record_fatal(anyhow::Error::new(e).context("rendering session failed"));
        }
    }

    /// Drops the session (and with it every GPU object) before the window goes away.
    fn on_close(&mut self) {
        if let Some(entry) = self.entry.take() {
            log::info!("closing window");
            drop(entry);
        }
    }

    fn finish_if_done(&mut self, event_loop: &ActiveEventLoop) {
        if self.fatal.is_some() {
            self.on_close();
        }
        if self.should_exit() {
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.loaded {
            if let Err(e) = self.on_load(event_loop) {
                self.record_fatal(e);
            }
        } else if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }

        self.finish_if_done(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id() != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.on_close(),

            // The session picks up the new framebuffer size on its next acquire.
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = &self.entry {
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.on_frame(),

            _ => {}
        }

        self.finish_if_done(event_loop);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.on_close();
    }
}

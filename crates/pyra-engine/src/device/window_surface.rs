use crate::window::FramebufferSource;

use super::depth::DepthAttachment;
use super::error::AcquireFailure;
use super::frame::FrameView;
use super::surface::{SurfaceBackend, SurfaceCaps, SurfaceConfig};

/// wgpu surface bound to a window, plus its depth attachment.
///
/// Holds its own handles to the adapter and device so it can query capabilities and
/// (re)configure without borrowing the session. Those are the last handles alive during
/// session teardown, so the adapter and device are actually freed when this drops.
pub struct WindowSurface<'w> {
    depth: Option<DepthAttachment>,
    surface: wgpu::Surface<'w>,
    host: &'w dyn FramebufferSource,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    desired_maximum_frame_latency: u32,
}

impl<'w> WindowSurface<'w> {
    pub fn new(
        surface: wgpu::Surface<'w>,
        host: &'w dyn FramebufferSource,
        adapter: wgpu::Adapter,
        device: wgpu::Device,
        desired_maximum_frame_latency: u32,
    ) -> Self {
        Self {
            depth: None,
            surface,
            host,
            adapter,
            device,
            desired_maximum_frame_latency,
        }
    }

    /// View of the current depth attachment.
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth.as_ref().map(DepthAttachment::view)
    }

    /// Lets the host know a frame is about to be presented.
    pub fn pre_present(&self) {
        self.host.pre_present();
    }
}

impl SurfaceBackend for WindowSurface<'_> {
    type Frame = FrameView;

    fn capabilities(&self) -> SurfaceCaps {
        SurfaceCaps::from(&self.surface.get_capabilities(&self.adapter))
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.host.framebuffer_size()
    }

    fn configure(&mut self, config: &SurfaceConfig) {
        self.surface
            .configure(&self.device, &config.to_wgpu(self.desired_maximum_frame_latency));
    }

    fn rebuild_depth(&mut self, width: u32, height: u32) {
        self.release_depth();
        self.depth = Some(DepthAttachment::new(&self.device, width, height));
    }

    fn release_depth(&mut self) {
        if let Some(depth) = self.depth.take() {
            let (w, h) = depth.extent();
            depth.destroy();
            log::debug!("released depth attachment {w}x{h}");
        }
    }

    fn depth_extent(&self) -> Option<(u32, u32)> {
        self.depth.as_ref().map(DepthAttachment::extent)
    }

    fn acquire(&mut self) -> Result<FrameView, AcquireFailure> {
        let surface_texture = self
            .surface
            .get_current_texture()
            .map_err(AcquireFailure::from)?;
        if surface_texture.suboptimal {
            log::debug!("acquired a suboptimal surface texture");
        }
        Ok(FrameView::new(surface_texture))
    }
}

impl Drop for WindowSurface<'_> {
    fn drop(&mut self) {
        self.release_depth();
        log::debug!("released surface, adapter and device");
    }
}

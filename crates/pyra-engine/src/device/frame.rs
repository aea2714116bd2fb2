/// A drawable acquired for one frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next one. Consumed by
/// [`FrameView::present`] after the frame's command buffer has been submitted.
pub struct FrameView {
    surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl FrameView {
    pub(crate) fn new(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                label: Some("pyra drawable view"),
                ..Default::default()
            });
        Self {
            surface_texture,
            view,
        }
    }

    /// Size of the acquired texture in physical pixels.
    pub fn extent(&self) -> (u32, u32) {
        let size = self.surface_texture.texture.size();
        (size.width, size.height)
    }

    /// Releases the view, then presents the texture.
    pub fn present(self) {
        let FrameView {
            surface_texture,
            view,
        } = self;
        drop(view);
        surface_texture.present();
    }
}

/// Depth format of the session. Carries an 8-bit stencil aspect so the render pass can clear
/// and store stencil even though the pipeline never reads it.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Depth texture and its view, sized to the color surface.
pub struct DepthAttachment {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthAttachment {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pyra depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[DEPTH_FORMAT],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("pyra depth view"),
            format: Some(DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            ..Default::default()
        });

        Self {
            texture,
            view,
            width,
            height,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Destroys the texture storage now instead of waiting for the last handle to drop.
    pub fn destroy(self) {
        let DepthAttachment { texture, view, .. } = self;
        drop(view);
        texture.destroy();
    }
}

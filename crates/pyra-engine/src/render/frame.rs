use crate::device::{DeviceHealth, SessionResult, SurfaceBackend, SurfaceSession, WindowSurface};

use super::scene::SceneResources;
use super::uniforms::TransformAnimator;

/// What happened during one tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// The surface was stale and got reconfigured; nothing was submitted.
    Skipped,
}

/// Steady-state loop: acquire, update transforms, encode one pass, submit, present.
pub struct FrameRenderer {
    animator: TransformAnimator,
    clear: wgpu::Color,
    presented: u64,
    skipped: u64,
}

impl FrameRenderer {
    pub const CLEAR: wgpu::Color = wgpu::Color {
        r: 0.2,
        g: 0.3,
        b: 0.3,
        a: 1.0,
    };

    pub fn new() -> Self {
        Self::with_clear(Self::CLEAR)
    }

    pub fn with_clear(clear: wgpu::Color) -> Self {
        Self {
            animator: TransformAnimator::new(),
            clear,
            presented: 0,
            skipped: 0,
        }
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    pub fn skipped_frames(&self) -> u64 {
        self.skipped
    }

    /// Draws one frame. A device loss recorded in `health` fails the frame before acquisition.
    pub fn render(
        &mut self,
        surface: &mut SurfaceSession<WindowSurface<'_>>,
        health: &DeviceHealth,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneResources,
    ) -> SessionResult<FrameOutcome> {
        let Some(frame) = surface.acquire_checked(health)? else {
            self.skipped += 1;
            return Ok(FrameOutcome::Skipped);
        };

        let (Some(config), Some(depth_view)) = (surface.config(), surface.backend().depth_view())
        else {
            log::warn!("surface acquired without configuration or depth; skipping frame");
            self.skipped += 1;
            return Ok(FrameOutcome::Skipped);
        };
        debug_assert_eq!(frame.extent(), config.extent());
        debug_assert_eq!(surface.backend().depth_extent(), Some(config.extent()));

        // Queued ahead of the submit below, so the pass reads this frame's block.
        let transforms = self.animator.advance(config.extent());
        queue.write_buffer(&scene.uniform_buffer, 0, bytemuck::bytes_of(&transforms));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pyra frame encoder"),
        });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pyra scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let mesh = &*scene.mesh;
            rpass.set_bind_group(0, &*scene.bind_group, &[]);
            rpass.set_pipeline(&scene.pipeline.pipeline);
            rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));

        surface.backend().pre_present();
        frame.present();

        self.presented += 1;
        Ok(FrameOutcome::Presented)
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

use crate::device::{capture_errors, Scoped, SessionError, SessionResult};

use super::geometry::{Vertex, PYRAMID_INDICES, PYRAMID_VERTICES};
use super::pipeline::{self, BuiltPipeline};
use super::resources::{self, StaticMesh};
use super::uniforms::Transforms;

/// Everything the frame loop draws with, created once per session.
///
/// Fields are declared in release order: the bind group goes first, the pipeline it was built
/// against goes last.
pub struct SceneResources {
    pub bind_group: Scoped<wgpu::BindGroup>,
    pub uniform_buffer: Scoped<wgpu::Buffer>,
    pub mesh: Scoped<StaticMesh>,
    pub pipeline: Scoped<BuiltPipeline>,
}

impl SceneResources {
    /// Uploads the pyramid and builds the pipeline for `surface_format`.
    pub fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader_source: &str,
        surface_format: wgpu::TextureFormat,
    ) -> SessionResult<Self> {
        Self::with_mesh(
            device,
            queue,
            shader_source,
            surface_format,
            &PYRAMID_VERTICES,
            &PYRAMID_INDICES,
        )
    }

    pub fn with_mesh(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader_source: &str,
        surface_format: wgpu::TextureFormat,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> SessionResult<Self> {
        let mesh = Scoped::new(
            "vertex/index buffers",
            resources::upload_static(device, queue, vertices, indices)?,
        );
        let uniform_buffer = Scoped::new(
            "uniform buffer",
            resources::create_uniform_buffer(device, Transforms::SIZE)?,
        );
        let pipeline = Scoped::new(
            "render pipeline",
            pipeline::build(device, shader_source, surface_format)?,
        );

        let bind_group = capture_errors(device, || {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("pyra transforms bind group"),
                layout: &pipeline.bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            })
        })
        .map_err(|e| SessionError::ResourceCreation(format!("pyra transforms bind group: {e}")))?;

        Ok(Self {
            bind_group: Scoped::new("bind group", bind_group),
            uniform_buffer,
            mesh,
            pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{noop_device, release_journal as journal};
    use crate::render::PYRAMID_SHADER;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    #[test]
    fn scene_builds_and_releases_dependents_first() {
        let (device, queue) = noop_device();
        journal::take();

        let scene = SceneResources::create(&device, &queue, PYRAMID_SHADER, FORMAT).unwrap();
        assert_eq!(scene.mesh.index_count, 18);
        assert_eq!(scene.uniform_buffer.size(), Transforms::SIZE);
        assert!(journal::take().is_empty());

        drop(scene);
        assert_eq!(
            journal::take(),
            vec!["bind group", "uniform buffer", "vertex/index buffers", "render pipeline"]
        );
    }

    #[test]
    fn pipeline_failure_releases_buffers_in_reverse() {
        let (device, queue) = noop_device();
        journal::take();

        let result = SceneResources::create(&device, &queue, "fn vs_main() {}", FORMAT);
        assert!(matches!(result, Err(SessionError::PipelineBuild(_))));
        assert_eq!(journal::take(), vec!["uniform buffer", "vertex/index buffers"]);
    }

    #[test]
    fn rejected_mesh_creates_nothing() {
        let (device, queue) = noop_device();
        journal::take();

        let result =
            SceneResources::with_mesh(&device, &queue, PYRAMID_SHADER, FORMAT, &PYRAMID_VERTICES, &[]);
        assert!(matches!(result, Err(SessionError::ResourceCreation(_))));
        assert!(journal::take().is_empty());
    }
}

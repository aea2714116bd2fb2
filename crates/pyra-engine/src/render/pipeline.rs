//! Fixed render pipeline, built once per session.

use crate::device::{capture_errors, SessionError, SessionResult, DEPTH_FORMAT};

use super::geometry::Vertex;
use super::uniforms::Transforms;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// The pipeline plus the layout needed to build bind groups for it.
pub struct BuiltPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

// ── fixed state ───────────────────────────────────────────────────────────

/// Straight alpha for color; destination alpha kept as is.
pub fn blend_state() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::Zero,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

pub fn primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// Depth test `Less` with writes; stencil masked off entirely.
pub fn depth_stencil_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState {
            front: wgpu::StencilFaceState::IGNORE,
            back: wgpu::StencilFaceState::IGNORE,
            read_mask: 0,
            write_mask: 0,
        },
        bias: wgpu::DepthBiasState::default(),
    }
}

fn transforms_min_binding_size() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(Transforms::SIZE)
}

// ── shader checks ─────────────────────────────────────────────────────────

/// Returns true if `source` declares a function called `name`.
pub fn declares_entry_point(source: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';

    source.match_indices("fn").any(|(at, _)| {
        let before_ok = source[..at].chars().next_back().is_none_or(|c| !is_ident(c));
        let rest = &source[at + 2..];
        let trimmed = rest.trim_start();
        if !before_ok || trimmed.len() == rest.len() {
            return false;
        }
        trimmed
            .strip_prefix(name)
            .and_then(|after| after.trim_start().chars().next())
            .is_some_and(|c| c == '(')
    })
}

fn check_entry_points(source: &str) -> SessionResult<()> {
    for entry in [VERTEX_ENTRY, FRAGMENT_ENTRY] {
        if !declares_entry_point(source, entry) {
            return Err(SessionError::PipelineBuild(format!(
                "shader does not declare entry point `{entry}`"
            )));
        }
    }
    Ok(())
}

fn check_compilation(shader: &wgpu::ShaderModule) -> SessionResult<()> {
    let info = pollster::block_on(shader.get_compilation_info());
    let mut errors = Vec::new();
    for msg in &info.messages {
        match msg.message_type {
            wgpu::CompilationMessageType::Error => errors.push(msg.message.clone()),
            wgpu::CompilationMessageType::Warning => log::warn!("shader: {}", msg.message),
            _ => log::debug!("shader: {}", msg.message),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SessionError::PipelineBuild(errors.join("\n")))
    }
}

// ── build ─────────────────────────────────────────────────────────────────

/// Builds the session's only pipeline.
///
/// The shader module and pipeline layout are dropped on return; only the pipeline and the
/// bind-group layout are kept. Anything the device rejects while building is returned as
/// [`SessionError::PipelineBuild`].
pub fn build(
    device: &wgpu::Device,
    shader_source: &str,
    surface_format: wgpu::TextureFormat,
) -> SessionResult<BuiltPipeline> {
    check_entry_points(shader_source)?;

    let built = capture_errors(device, || create(device, shader_source, surface_format))
        .map_err(|e| SessionError::PipelineBuild(e.to_string()))??;

    log::info!("pipeline built for {surface_format:?}");
    Ok(built)
}

fn create(
    device: &wgpu::Device,
    shader_source: &str,
    surface_format: wgpu::TextureFormat,
) -> SessionResult<BuiltPipeline> {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("pyra shader"),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });
    check_compilation(&shader)?;

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("pyra transforms bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: transforms_min_binding_size(),
            },
            count: None,
        }],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pyra pipeline layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("pyra pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(blend_state()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: primitive_state(),
        depth_stencil: Some(depth_stencil_state()),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    Ok(BuiltPipeline {
        pipeline,
        bind_group_layout,
    })
}

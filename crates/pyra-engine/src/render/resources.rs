//! Immutable GPU resources created once per session.

use crate::device::{capture_errors, SessionError, SessionResult};

use super::geometry::Vertex;
use super::uniforms::Transforms;

/// Vertex and index buffers uploaded at setup.
pub struct StaticMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// Checks a mesh payload before any buffer is created.
pub fn validate_mesh(vertices: &[Vertex], indices: &[u16]) -> SessionResult<()> {
    if vertices.is_empty() {
        return Err(SessionError::ResourceCreation(
            "vertex buffer would be empty".to_string(),
        ));
    }
    if indices.is_empty() {
        return Err(SessionError::ResourceCreation(
            "index buffer would be empty".to_string(),
        ));
    }
    if let Some(&bad) = indices.iter().find(|&&i| usize::from(i) >= vertices.len()) {
        return Err(SessionError::ResourceCreation(format!(
            "index {bad} out of range for {} vertices",
            vertices.len()
        )));
    }
    Ok(())
}

/// Checks that a uniform buffer holds exactly one [`Transforms`] block.
pub fn validate_uniform_size(size_bytes: u64) -> SessionResult<()> {
    if size_bytes != Transforms::SIZE {
        return Err(SessionError::ResourceCreation(format!(
            "uniform buffer must be {} bytes (model, view, projection), got {size_bytes}",
            Transforms::SIZE
        )));
    }
    Ok(())
}

/// Rounds a payload up to the queue copy alignment.
fn copy_size(len: usize) -> u64 {
    (len as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    usage: wgpu::BufferUsages,
    bytes: &[u8],
) -> SessionResult<wgpu::Buffer> {
    let size = copy_size(bytes.len());
    capture_errors(device, || {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if size == bytes.len() as u64 {
            queue.write_buffer(&buffer, 0, bytes);
        } else {
            let mut padded = bytes.to_vec();
            padded.resize(size as usize, 0);
            queue.write_buffer(&buffer, 0, &padded);
        }
        buffer
    })
    .map_err(|e| SessionError::ResourceCreation(format!("{label}: {e}")))
}

/// Creates the vertex and index buffers and queues their contents.
pub fn upload_static(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    vertices: &[Vertex],
    indices: &[u16],
) -> SessionResult<StaticMesh> {
    validate_mesh(vertices, indices)?;
    let index_count = u32::try_from(indices.len())
        .map_err(|_| SessionError::ResourceCreation("too many indices".to_string()))?;

    let vertex_buffer = upload(
        device,
        queue,
        "pyra vertex buffer",
        wgpu::BufferUsages::VERTEX,
        bytemuck::cast_slice(vertices),
    )?;
    let index_buffer = upload(
        device,
        queue,
        "pyra index buffer",
        wgpu::BufferUsages::INDEX,
        bytemuck::cast_slice(indices),
    )?;

    log::debug!(
        "uploaded {} vertices ({} bytes) and {index_count} indices",
        vertices.len(),
        vertex_buffer.size()
    );

    Ok(StaticMesh {
        vertex_buffer,
        index_buffer,
        index_count,
    })
}

/// Creates the per-frame uniform buffer. Contents are undefined until the first frame writes.
pub fn create_uniform_buffer(device: &wgpu::Device, size_bytes: u64) -> SessionResult<wgpu::Buffer> {
    validate_uniform_size(size_bytes)?;
    capture_errors(device, || {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pyra transforms ubo"),
            size: size_bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    })
    .map_err(|e| SessionError::ResourceCreation(format!("pyra transforms ubo: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::noop_device;
    use crate::render::geometry::{PYRAMID_INDICES, PYRAMID_VERTICES};

    #[test]
    fn pyramid_mesh_is_valid() {
        assert!(validate_mesh(&PYRAMID_VERTICES, &PYRAMID_INDICES).is_ok());
    }

    #[test]
    fn empty_payloads_are_rejected() {
        assert!(matches!(
            validate_mesh(&[], &PYRAMID_INDICES),
            Err(SessionError::ResourceCreation(_))
        ));
        assert!(matches!(
            validate_mesh(&PYRAMID_VERTICES, &[]),
            Err(SessionError::ResourceCreation(_))
        ));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = validate_mesh(&PYRAMID_VERTICES[..3], &[0, 1, 3]).unwrap_err();
        assert!(err.to_string().contains("index 3"));
    }

    #[test]
    fn uniform_size_must_be_three_matrices() {
        assert!(validate_uniform_size(192).is_ok());
        for bad in [0, 64, 128, 191, 256] {
            assert!(matches!(
                validate_uniform_size(bad),
                Err(SessionError::ResourceCreation(_))
            ));
        }
    }

    // ── device ────────────────────────────────────────────────────────────

    #[test]
    fn pyramid_uploads_on_a_device() {
        let (device, queue) = noop_device();
        let mesh = upload_static(&device, &queue, &PYRAMID_VERTICES, &PYRAMID_INDICES).unwrap();
        assert_eq!(mesh.index_count, 18);
        assert_eq!(mesh.vertex_buffer.size(), 16 * 36);
        assert_eq!(mesh.index_buffer.size(), 36);
        assert!(mesh.index_buffer.usage().contains(wgpu::BufferUsages::INDEX));
    }

    #[test]
    fn odd_index_payload_is_padded() {
        let (device, queue) = noop_device();
        let mesh = upload_static(&device, &queue, &PYRAMID_VERTICES[..3], &[0, 1, 2]).unwrap();
        assert_eq!(mesh.index_buffer.size(), 8);
    }

    #[test]
    fn uniform_buffer_is_created_at_block_size() {
        let (device, _queue) = noop_device();
        let ubo = create_uniform_buffer(&device, Transforms::SIZE).unwrap();
        assert_eq!(ubo.size(), 192);
        assert!(matches!(
            create_uniform_buffer(&device, 64),
            Err(SessionError::ResourceCreation(_))
        ));
    }

    #[test]
    fn device_rejection_is_a_resource_error() {
        let (device, queue) = noop_device();
        let err = upload(
            &device,
            &queue,
            "mappable vertices",
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::MAP_READ,
            &[0u8; 16],
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::ResourceCreation(ref m) if m.contains("mappable vertices")));
    }

    #[test]
    fn copy_size_rounds_to_alignment() {
        assert_eq!(copy_size(36), 36);
        assert_eq!(copy_size(6), 8);
        assert_eq!(copy_size(16 * 36), 576);
    }
}

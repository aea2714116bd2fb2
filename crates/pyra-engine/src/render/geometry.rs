use bytemuck::{Pod, Zeroable};

/// One interleaved vertex: position, normal, color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x3  // color
    ];

    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn v(position: [f32; 3], normal: [f32; 3]) -> Vertex {
    Vertex {
        position,
        normal,
        color: [1.0, 1.0, 1.0],
    }
}

const APEX: [f32; 3] = [0.0, 0.0, 0.5];

/// Square-based pyramid: the base quad plus four flat-shaded sides.
pub const PYRAMID_VERTICES: [Vertex; 16] = [
    // base
    v([-0.5, -0.5, -0.3], [0.0, -1.0, 0.0]),
    v([0.5, -0.5, -0.3], [0.0, -1.0, 0.0]),
    v([0.5, 0.5, -0.3], [0.0, -1.0, 0.0]),
    v([-0.5, 0.5, -0.3], [0.0, -1.0, 0.0]),
    // side 1
    v([-0.5, -0.5, -0.3], [0.0, -0.848, 0.53]),
    v([0.5, -0.5, -0.3], [0.0, -0.848, 0.53]),
    v(APEX, [0.0, -0.848, 0.53]),
    // side 2
    v([0.5, -0.5, -0.3], [0.848, 0.0, 0.53]),
    v([0.5, 0.5, -0.3], [0.848, 0.0, 0.53]),
    v(APEX, [0.848, 0.0, 0.53]),
    // side 3
    v([0.5, 0.5, -0.3], [0.0, 0.848, 0.53]),
    v([-0.5, 0.5, -0.3], [0.0, 0.848, 0.53]),
    v(APEX, [0.0, 0.848, 0.53]),
    // side 4
    v([-0.5, 0.5, -0.3], [-0.848, 0.0, 0.53]),
    v([-0.5, -0.5, -0.3], [-0.848, 0.0, 0.53]),
    v(APEX, [-0.848, 0.0, 0.53]),
];

pub const PYRAMID_INDICES: [u16; 18] = [
    0, 1, 2, 0, 2, 3, // base
    4, 5, 6, // sides
    7, 8, 9, //
    10, 11, 12, //
    13, 14, 15,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_nine_floats() {
        assert_eq!(Vertex::STRIDE, 9 * 4);
        assert_eq!(Vertex::layout().array_stride, 36);
    }

    #[test]
    fn attribute_offsets_match_interleaving() {
        let layout = Vertex::layout();
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        assert_eq!(locations, vec![0, 1, 2]);
        assert!(
            layout
                .attributes
                .iter()
                .all(|a| a.format == wgpu::VertexFormat::Float32x3)
        );
    }

    #[test]
    fn pyramid_counts() {
        assert_eq!(PYRAMID_VERTICES.len(), 16);
        assert_eq!(PYRAMID_INDICES.len(), 18);
        assert_eq!(bytemuck::cast_slice::<Vertex, f32>(&PYRAMID_VERTICES).len(), 16 * 9);
    }

    #[test]
    fn pyramid_indices_are_in_range() {
        assert!(PYRAMID_INDICES.iter().all(|&i| (i as usize) < PYRAMID_VERTICES.len()));
    }
}

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Per-frame transform block bound at group 0, binding 0.
///
/// Matrices are column-major, matching WGSL `mat4x4<f32>`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Transforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl Transforms {
    pub const SIZE: u64 = std::mem::size_of::<Transforms>() as u64;

    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}

/// Produces the transform block for each rendered frame.
///
/// The model spins about Z by a fixed step per rendered frame; skipped frames do not advance
/// it. View and projection parameters are fixed; only the aspect ratio varies.
#[derive(Debug, Clone)]
pub struct TransformAnimator {
    model: Mat4,
    step: Mat4,
    view: Mat4,
    fov_y: f32,
    z_near: f32,
    z_far: f32,
}

impl TransformAnimator {
    pub const EYE: Vec3 = Vec3::new(0.0, 0.0, 2.0);
    pub const STEP_DEGREES: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            model: Mat4::IDENTITY,
            step: Mat4::from_rotation_z(Self::STEP_DEGREES.to_radians()),
            view: Mat4::look_at_rh(Self::EYE, Vec3::ZERO, Vec3::Y),
            fov_y: 70f32.to_radians(),
            z_near: 0.1,
            z_far: 100.0,
        }
    }

    /// Current model transform.
    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect_ratio, self.z_near, self.z_far)
    }

    /// Advances the rotation by one step and returns the block for a drawable of `extent`.
    pub fn advance(&mut self, extent: (u32, u32)) -> Transforms {
        self.model *= self.step;
        let aspect = extent.0 as f32 / extent.1.max(1) as f32;
        Transforms::new(self.model, self.view, self.projection(aspect))
    }
}

impl Default for TransformAnimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn block_is_three_mat4() {
        assert_eq!(Transforms::SIZE, 3 * 16 * 4);
        assert_eq!(Transforms::SIZE, 192);
    }

    #[test]
    fn rotation_accumulates_per_frame() {
        let mut anim = TransformAnimator::new();
        for _ in 0..90 {
            anim.advance((800, 600));
        }
        // 90 steps of 1° rotate +X onto +Y.
        let x = anim.model().transform_vector3(Vec3::X);
        assert!(close(x.x, 0.0), "{x:?}");
        assert!(close(x.y, 1.0), "{x:?}");
    }

    #[test]
    fn projection_follows_aspect_ratio() {
        let mut anim = TransformAnimator::new();
        let wide = anim.advance((1600, 800));
        let square = anim.advance((800, 800));

        // m00 = f / aspect, m11 = f
        let f = square.projection[1][1];
        assert!(close(square.projection[0][0], f));
        assert!(close(wide.projection[0][0], f / 2.0));
        assert!(close(wide.projection[1][1], f));
    }

    #[test]
    fn view_looks_at_origin_from_eye() {
        let mut anim = TransformAnimator::new();
        let t = anim.advance((1, 1));
        let view = Mat4::from_cols_array_2d(&t.view);
        let origin = view.transform_point3(Vec3::ZERO);
        assert!(close(origin.z, -2.0));
        assert!(close(origin.x, 0.0) && close(origin.y, 0.0));
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let mut anim = TransformAnimator::new();
        let t = anim.advance((100, 0));
        assert!(t.projection[0][0].is_finite());
    }
}

//! Directional light and the per-vertex lighting model.
//!
//! Shading happens in `shaders/scene_vs.wgsl`. [`shade_vertex`] computes the same
//! formula on the CPU so it can be checked without a GPU.

use glam::{Mat4, Vec3, Vec4};

use crate::color::Color;

/// A single directional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub color: Color,
    /// Unit vector pointing towards the light.
    pub direction: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            direction: Vec3::new(0.5, 3.0, 4.0).normalize(),
        }
    }
}

impl Light {
    pub fn new(color: Color, direction: Vec3) -> Self {
        Self {
            color,
            direction: direction.normalize(),
        }
    }
}

/// Inverse-transpose of `model`, which keeps normals perpendicular to surfaces under
/// non-uniform scale.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    model.inverse().transpose()
}

/// Lit color of one vertex: `light × color × max(n·l, 0)`.
pub fn shade_vertex(light: &Light, normal_matrix: Mat4, normal: Vec3, color: Color) -> Vec3 {
    let n = (normal_matrix * Vec4::new(normal.x, normal.y, normal.z, 0.0))
        .truncate()
        .normalize();
    let n_dot_l = n.dot(light.direction).max(0.0);
    light.color.to_vec3() * color.to_vec3() * n_dot_l
}

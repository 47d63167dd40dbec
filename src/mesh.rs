//! Static geometry for the two meshes the room is drawn with.
//!
//! - [`CubeMesh`]: a unit cube centered at the origin, the only primitive furniture
//!   is built from. Every furniture box is this cube, scaled and moved by its model
//!   matrix and tinted by a per-draw color.
//! - [`AxisMesh`]: three white lines along the world axes for debugging placement.
//!
//! Geometry is stored as flat attribute arrays (one array per vertex attribute) so it
//! can be handed to [`RenderBackend::upload_vertex_attribute`] directly.
//!
//! # Cube layout
//!
//! ```text
//!    v6----- v5
//!   /|      /|
//!  v1------v0|
//!  | |     | |
//!  | |v7---|-|v4
//!  |/      |/
//!  v2------v3
//! ```
//!
//! Each face owns four vertices so that it gets its own flat normal. Faces are stored
//! in the order front (Z+), right (X+), up (Y+), left (X-), down (Y-), back (Z-).
//!
//! [`RenderBackend::upload_vertex_attribute`]: crate::backend::RenderBackend::upload_vertex_attribute

use crate::backend::{BufferHandle, ProgramHandle, RenderBackend, attribute};
use crate::color::Color;
use crate::error::RenderError;

/// Unit cube geometry with extents [-0.5, 0.5] on every axis.
pub struct CubeMesh;

impl CubeMesh {
    /// Vertices in the mesh (4 per face).
    pub const VERTEX_COUNT: usize = 24;
    /// Indices drawn per cube (2 triangles per face).
    pub const INDEX_COUNT: u32 = 36;

    #[rustfmt::skip]
    pub const POSITIONS: [f32; 72] = [
         0.5,  0.5,  0.5,  -0.5,  0.5,  0.5,  -0.5, -0.5,  0.5,   0.5, -0.5,  0.5, // v0-v1-v2-v3 front
         0.5,  0.5,  0.5,   0.5, -0.5,  0.5,   0.5, -0.5, -0.5,   0.5,  0.5, -0.5, // v0-v3-v4-v5 right
         0.5,  0.5,  0.5,   0.5,  0.5, -0.5,  -0.5,  0.5, -0.5,  -0.5,  0.5,  0.5, // v0-v5-v6-v1 up
        -0.5,  0.5,  0.5,  -0.5,  0.5, -0.5,  -0.5, -0.5, -0.5,  -0.5, -0.5,  0.5, // v1-v6-v7-v2 left
        -0.5, -0.5, -0.5,   0.5, -0.5, -0.5,   0.5, -0.5,  0.5,  -0.5, -0.5,  0.5, // v7-v4-v3-v2 down
         0.5, -0.5, -0.5,  -0.5, -0.5, -0.5,  -0.5,  0.5, -0.5,   0.5,  0.5, -0.5, // v4-v7-v6-v5 back
    ];

    #[rustfmt::skip]
    pub const NORMALS: [f32; 72] = [
         0.0,  0.0,  1.0,   0.0,  0.0,  1.0,   0.0,  0.0,  1.0,   0.0,  0.0,  1.0, // front
         1.0,  0.0,  0.0,   1.0,  0.0,  0.0,   1.0,  0.0,  0.0,   1.0,  0.0,  0.0, // right
         0.0,  1.0,  0.0,   0.0,  1.0,  0.0,   0.0,  1.0,  0.0,   0.0,  1.0,  0.0, // up
        -1.0,  0.0,  0.0,  -1.0,  0.0,  0.0,  -1.0,  0.0,  0.0,  -1.0,  0.0,  0.0, // left
         0.0, -1.0,  0.0,   0.0, -1.0,  0.0,   0.0, -1.0,  0.0,   0.0, -1.0,  0.0, // down
         0.0,  0.0, -1.0,   0.0,  0.0, -1.0,   0.0,  0.0, -1.0,   0.0,  0.0, -1.0, // back
    ];

    #[rustfmt::skip]
    pub const INDICES: [u16; 36] = [
         0,  1,  2,   0,  2,  3, // front
         4,  5,  6,   4,  6,  7, // right
         8,  9, 10,   8, 10, 11, // up
        12, 13, 14,  12, 14, 15, // left
        16, 17, 18,  16, 18, 19, // down
        20, 21, 22,  20, 22, 23, // back
    ];

    /// Per-vertex color data giving every vertex the same tint.
    pub fn colors(tint: Color) -> Vec<f32> {
        tint.to_array()
            .into_iter()
            .cycle()
            .take(Self::VERTEX_COUNT * 3)
            .collect()
    }

    /// Uploads the tint-independent attributes (positions, normals, indices).
    pub fn upload(
        backend: &mut impl RenderBackend,
        program: ProgramHandle,
    ) -> Result<CubeBuffers, RenderError> {
        let positions =
            backend.upload_vertex_attribute(program, attribute::POSITION, &Self::POSITIONS, 3)?;
        let normals =
            backend.upload_vertex_attribute(program, attribute::NORMAL, &Self::NORMALS, 3)?;
        let indices = backend.upload_index_buffer(&Self::INDICES)?;

        Ok(CubeBuffers {
            positions,
            normals,
            indices,
        })
    }
}

/// Backend buffers holding the shared cube geometry.
#[derive(Clone, Copy, Debug)]
pub struct CubeBuffers {
    pub positions: BufferHandle,
    pub normals: BufferHandle,
    pub indices: BufferHandle,
}

/// Debug axes: one white line per world axis, 40 units long.
pub struct AxisMesh;

impl AxisMesh {
    pub const INDEX_COUNT: u32 = 6;

    #[rustfmt::skip]
    pub const POSITIONS: [f32; 18] = [
        -20.0,   0.0,   0.0,   20.0,  0.0,  0.0,
          0.0,  20.0,   0.0,    0.0, -20.0, 0.0,
          0.0,   0.0, -20.0,    0.0,  0.0, 20.0,
    ];

    pub const COLORS: [f32; 18] = [1.0; 18];

    /// Lines are drawn unlit; the normals only fill the attribute slot.
    pub const NORMALS: [f32; 18] = [0.0; 18];

    pub const INDICES: [u16; 6] = [0, 1, 2, 3, 4, 5];

    pub fn upload(
        backend: &mut impl RenderBackend,
        program: ProgramHandle,
    ) -> Result<AxisBuffers, RenderError> {
        let positions =
            backend.upload_vertex_attribute(program, attribute::POSITION, &Self::POSITIONS, 3)?;
        let colors =
            backend.upload_vertex_attribute(program, attribute::COLOR, &Self::COLORS, 3)?;
        let normals =
            backend.upload_vertex_attribute(program, attribute::NORMAL, &Self::NORMALS, 3)?;
        let indices = backend.upload_index_buffer(&Self::INDICES)?;

        Ok(AxisBuffers {
            positions,
            colors,
            normals,
            indices,
        })
    }
}

/// Backend buffers holding the axis helper geometry.
#[derive(Clone, Copy, Debug)]
pub struct AxisBuffers {
    pub positions: BufferHandle,
    pub colors: BufferHandle,
    pub normals: BufferHandle,
    pub indices: BufferHandle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn vec3_at(data: &[f32], i: usize) -> Vec3 {
        Vec3::new(data[i * 3], data[i * 3 + 1], data[i * 3 + 2])
    }

    #[test]
    fn cube_spans_unit_extents() {
        for v in CubeMesh::POSITIONS {
            assert_eq!(v.abs(), 0.5);
        }
    }

    #[test]
    fn cube_normals_point_outward() {
        for i in 0..CubeMesh::VERTEX_COUNT {
            let position = vec3_at(&CubeMesh::POSITIONS, i);
            let normal = vec3_at(&CubeMesh::NORMALS, i);
            assert_eq!(normal.length(), 1.0);
            // The vertex lies on the face plane the normal points out of.
            assert_eq!(position.dot(normal), 0.5);
        }
    }

    #[test]
    fn cube_indices_stay_within_their_face() {
        assert_eq!(CubeMesh::INDICES.len() as u32, CubeMesh::INDEX_COUNT);
        for (tri, chunk) in CubeMesh::INDICES.chunks(6).enumerate() {
            let base = tri as u16 * 4;
            assert!(chunk.iter().all(|&i| (base..base + 4).contains(&i)));
        }
    }

    #[test]
    fn cube_colors_repeat_tint() {
        let tint = Color::rgb8(128, 81, 61);
        let colors = CubeMesh::colors(tint);
        assert_eq!(colors.len(), 72);
        for i in 0..CubeMesh::VERTEX_COUNT {
            assert_eq!(vec3_at(&colors, i), tint.to_vec3());
        }
    }
}

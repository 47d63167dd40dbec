use glam::{Mat4, Vec3};

/// A fixed look-at camera with a perspective projection.
///
/// The view and projection are uploaded once when the renderer is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 15.0),
            target: Vec3::new(0.0, 0.0, -100.0),
            up: Vec3::Y,
            fov_degrees: 50.0,
            near: 1.0,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.eye = Vec3::new(x, y, z);
        self
    }

    pub fn looking_at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.target = Vec3::new(x, y, z);
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self
    }

    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Right-handed perspective with a [0, 1] depth range.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        let view = camera.view_matrix();

        // The eye maps to the origin and the room origin lies straight ahead.
        assert!(view.transform_point3(camera.eye).abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(
            view.transform_point3(Vec3::ZERO)
                .abs_diff_eq(Vec3::new(0.0, 0.0, -15.0), 1e-5)
        );
    }

    #[test]
    fn near_and_far_planes_map_to_depth_range() {
        let camera = Camera::default();
        let proj = camera.projection_matrix(4.0 / 3.0);

        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn builders_override_defaults() {
        let camera = Camera::new()
            .at(1.0, 2.0, 3.0)
            .looking_at(0.0, 0.0, 0.0)
            .with_fov(60.0)
            .with_clip(0.1, 10.0);
        assert_eq!(camera.eye, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.fov_degrees, 60.0);
        assert_eq!((camera.near, camera.far), (0.1, 10.0));
    }
}

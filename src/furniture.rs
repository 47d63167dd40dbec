//! Furniture assembled from unit cubes.
//!
//! Every builder returns a [`Furniture`]: a [`Placement`] in the room, one tint and a
//! list of [`BoxPart`]s in the object's local space. The renderer expands it with
//! [`Furniture::instances`] into one model transform per cube:
//!
//! ```text
//! placement.matrix() * translate(part.offset) * scale(part.size)
//! ```
//!
//! where `placement.matrix()` is `translate(position) * rot_x * rot_y * rot_z`.
//!
//! # Example
//!
//! ```
//! use parlour::furniture::{self, Placement};
//! use parlour::Color;
//!
//! let table = furniture::table(Placement::at(4.0, 0.0, 4.0), Color::rgb8(171, 74, 32));
//! assert_eq!(table.parts.len(), 5);
//! ```

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::error::RenderError;

/// Where a piece of furniture sits in the room.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Euler angles in degrees, applied x then y then z.
    pub rotation: Vec3,
}

impl Placement {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            rotation: Vec3::ZERO,
        }
    }

    /// Rotation about the vertical axis, in degrees.
    pub fn with_yaw(mut self, degrees: f32) -> Self {
        self.rotation.y = degrees;
        self
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vec3::new(x, y, z);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.rotation.x.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_z(self.rotation.z.to_radians())
    }
}

/// One scaled cube in a piece of furniture's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxPart {
    /// Center of the box.
    pub offset: Vec3,
    /// Edge lengths.
    pub size: Vec3,
}

impl BoxPart {
    pub fn new(offset: [f32; 3], size: [f32; 3]) -> Self {
        Self {
            offset: Vec3::from_array(offset),
            size: Vec3::from_array(size),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset) * Mat4::from_scale(self.size)
    }
}

/// A unit cube ready to draw, relative to the scene root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FurnitureInstance {
    pub local_transform: Mat4,
    pub color: Color,
}

/// A piece of furniture: its placement, tint and boxes.
#[derive(Clone, Debug, PartialEq)]
pub struct Furniture {
    pub name: &'static str,
    pub placement: Placement,
    pub color: Color,
    pub parts: Vec<BoxPart>,
}

impl Furniture {
    pub fn instances(&self) -> impl Iterator<Item = FurnitureInstance> + '_ {
        let origin = self.placement.matrix();
        self.parts.iter().map(move |part| FurnitureInstance {
            local_transform: origin * part.matrix(),
            color: self.color,
        })
    }
}

/// Floor plus the left and back walls.
pub fn walls(y: f32, width: f32, depth: f32, height: f32, color: Color) -> Furniture {
    Furniture {
        name: "walls",
        placement: Placement::default(),
        color,
        parts: vec![
            BoxPart::new([0.0, y, 0.0], [width, 0.1, depth]),
            BoxPart::new([-depth / 2.0, y + height / 2.0, 0.0], [0.1, height, depth]),
            BoxPart::new([0.0, y + height / 2.0, -depth / 2.0], [width, height, 0.1]),
        ],
    }
}

pub fn table(placement: Placement, color: Color) -> Furniture {
    const WIDTH: f32 = 5.0;
    const LENGTH: f32 = 3.0;
    const LEG_WIDTH: f32 = 0.3;
    const LEG_HEIGHT: f32 = 2.0;

    let leg_x = WIDTH / 2.0 - LEG_WIDTH;
    let leg_z = LENGTH / 2.0 - LEG_WIDTH;
    let leg_size = [LEG_WIDTH, LEG_HEIGHT, LEG_WIDTH];

    Furniture {
        name: "table",
        placement,
        color,
        parts: vec![
            BoxPart::new([0.0, 0.0, 0.0], [WIDTH, 0.2, LENGTH]),
            BoxPart::new([leg_x, -1.0, leg_z], leg_size),
            BoxPart::new([-leg_x, -1.0, leg_z], leg_size),
            BoxPart::new([leg_x, -1.0, -leg_z], leg_size),
            BoxPart::new([-leg_x, -1.0, -leg_z], leg_size),
        ],
    }
}

/// Chair with its back along local -Z.
///
/// One leg is a quarter unit shorter than the other three.
pub fn chair(placement: Placement, color: Color) -> Furniture {
    const LEG_WIDTH: f32 = 0.25;

    Furniture {
        name: "chair",
        placement,
        color,
        parts: vec![
            BoxPart::new([0.0, -0.25, 0.0], [1.25, 0.25, 1.25]),
            BoxPart::new([0.0, 0.5, -0.5], [1.25, 1.75, 0.25]),
            BoxPart::new([0.5, -1.0, -0.5], [LEG_WIDTH, 1.5, LEG_WIDTH]),
            BoxPart::new([-0.5, -1.0, -0.5], [LEG_WIDTH, 1.5, LEG_WIDTH]),
            BoxPart::new([-0.5, -1.0, 0.5], [LEG_WIDTH, 1.5, LEG_WIDTH]),
            BoxPart::new([0.5, -1.0, 0.5], [LEG_WIDTH, 1.25, LEG_WIDTH]),
        ],
    }
}

/// Dimensions of a shelf unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShelfSpec {
    /// Number of horizontal slabs, at least 1.
    pub count: u32,
    /// Vertical distance between slabs.
    pub spacing: f32,
    pub width: f32,
    pub depth: f32,
}

impl ShelfSpec {
    pub const BOOKSHELF: ShelfSpec = ShelfSpec {
        count: 5,
        spacing: 1.5,
        width: 2.0,
        depth: 1.0,
    };

    pub const TV_STAND: ShelfSpec = ShelfSpec {
        count: 3,
        spacing: 0.5,
        width: 5.0,
        depth: 1.5,
    };

    /// Height of the side panels, from the bottom slab to the top one.
    pub fn height(&self) -> f32 {
        self.count.saturating_sub(1) as f32 * self.spacing
    }
}

/// Stacked slabs between two side panels, starting at the local origin.
///
/// A single-slab unit is allowed and gets zero-height side panels.
pub fn shelf_unit(
    spec: ShelfSpec,
    placement: Placement,
    color: Color,
) -> Result<Furniture, RenderError> {
    if spec.count == 0 {
        return Err(RenderError::InvalidShelfCount(spec.count));
    }

    let height = spec.height();
    let side_x = spec.width / 2.0 - 0.05;

    let mut parts: Vec<BoxPart> = (0..spec.count)
        .map(|i| {
            BoxPart::new(
                [0.0, i as f32 * spec.spacing, 0.0],
                [spec.width, 0.1, spec.depth],
            )
        })
        .collect();
    parts.push(BoxPart::new([side_x, height / 2.0, 0.0], [0.1, height, spec.depth]));
    parts.push(BoxPart::new([-side_x, height / 2.0, 0.0], [0.1, height, spec.depth]));

    Ok(Furniture {
        name: "shelf unit",
        placement,
        color,
        parts,
    })
}

pub fn sofa(placement: Placement, color: Color) -> Furniture {
    Furniture {
        name: "sofa",
        placement,
        color,
        parts: vec![
            BoxPart::new([0.0, -1.75, 0.0], [4.0, 0.25, 2.0]),
            BoxPart::new([0.0, -1.5, -0.875], [4.25, 3.0, 0.25]),
            BoxPart::new([0.0, -2.35, 0.875], [4.0, 1.3, 0.25]),
            BoxPart::new([2.0, -2.0, 0.0], [0.25, 2.0, 2.0]),
            BoxPart::new([-2.0, -2.0, 0.0], [0.25, 2.0, 2.0]),
        ],
    }
}

/// Flat screen on a small stand.
pub fn television(placement: Placement, color: Color) -> Furniture {
    Furniture {
        name: "television",
        placement,
        color,
        parts: vec![
            BoxPart::new([0.0, 0.0, 0.0], [5.0, 3.0, 0.2]),
            BoxPart::new([0.0, -2.0, 0.0], [4.0, 0.1, 1.5]),
            BoxPart::new([0.0, -1.75, 0.0], [0.2, 0.5, 0.2]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINT: Color = Color::rgb8(107, 62, 0);

    #[test]
    fn bookshelf_slabs_and_sides() {
        let shelf = shelf_unit(ShelfSpec::BOOKSHELF, Placement::default(), TINT).unwrap();
        assert_eq!(shelf.parts.len(), 7);

        let slab_heights: Vec<f32> = shelf.parts[..5].iter().map(|p| p.offset.y).collect();
        assert_eq!(slab_heights, vec![0.0, 1.5, 3.0, 4.5, 6.0]);

        for side in &shelf.parts[5..] {
            assert_eq!(side.size, Vec3::new(0.1, 6.0, 1.0));
            assert_eq!(side.offset.y, 3.0);
            assert!((side.offset.x.abs() - 0.95).abs() < 1e-6);
        }
    }

    #[test]
    fn shelf_unit_rejects_zero_slabs() {
        let spec = ShelfSpec {
            count: 0,
            ..ShelfSpec::BOOKSHELF
        };
        assert!(matches!(
            shelf_unit(spec, Placement::default(), TINT),
            Err(RenderError::InvalidShelfCount(0))
        ));
    }

    #[test]
    fn single_slab_has_flat_sides() {
        let spec = ShelfSpec {
            count: 1,
            ..ShelfSpec::TV_STAND
        };
        let shelf = shelf_unit(spec, Placement::default(), TINT).unwrap();
        assert_eq!(shelf.parts.len(), 3);
        assert_eq!(shelf.parts[1].size.y, 0.0);
        assert_eq!(shelf.parts[2].size.y, 0.0);
    }

    #[test]
    fn table_legs_sit_inside_the_top() {
        let table = table(Placement::default(), TINT);
        for leg in &table.parts[1..] {
            assert!((leg.offset.x.abs() - 2.2).abs() < 1e-6);
            assert!((leg.offset.z.abs() - 1.2).abs() < 1e-6);
            assert_eq!(leg.offset.y, -1.0);
        }
    }

    #[test]
    fn chair_has_one_short_leg() {
        let chair = chair(Placement::default(), TINT);
        let heights: Vec<f32> = chair.parts[2..].iter().map(|p| p.size.y).collect();
        assert_eq!(heights, vec![1.5, 1.5, 1.5, 1.25]);
    }

    #[test]
    fn walls_enclose_the_floor() {
        let walls = walls(-2.0, 15.0, 15.0, 7.5, TINT);
        assert_eq!(walls.parts[0].offset, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(walls.parts[1].offset, Vec3::new(-7.5, 1.75, 0.0));
        assert_eq!(walls.parts[2].offset, Vec3::new(0.0, 1.75, -7.5));
        assert_eq!(walls.placement.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn instances_apply_placement_then_part() {
        let tv = television(Placement::at(-6.75, 1.2, 0.0).with_yaw(90.0), TINT);
        let screen = tv.instances().next().unwrap();

        // The screen faces +X once turned a quarter turn about Y.
        let normal = screen.local_transform.transform_vector3(Vec3::Z).normalize();
        assert!(normal.abs_diff_eq(Vec3::X, 1e-6));
        assert!(
            screen
                .local_transform
                .transform_point3(Vec3::ZERO)
                .abs_diff_eq(Vec3::new(-6.75, 1.2, 0.0), 1e-6)
        );
        assert_eq!(screen.color, TINT);
        assert_eq!(tv.instances().count(), 3);
    }

    #[test]
    fn placement_rotates_x_before_y() {
        let placement = Placement::default().with_rotation(90.0, 90.0, 0.0);
        let expected = Mat4::from_rotation_x(90f32.to_radians())
            * Mat4::from_rotation_y(90f32.to_radians());
        assert!(placement.matrix().abs_diff_eq(expected, 1e-6));
    }
}

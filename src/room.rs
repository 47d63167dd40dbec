//! The furnished room: which furniture goes where.

use crate::color::Color;
use crate::error::RenderError;
use crate::furniture::{self, Furniture, Placement, ShelfSpec};

pub const WALL_COLOR: Color = Color::rgb8(250, 248, 220);
pub const TABLE_COLOR: Color = Color::rgb8(171, 74, 32);
pub const CHAIR_COLOR: Color = Color::rgb8(128, 81, 61);
pub const BOOKSHELF_COLOR: Color = Color::rgb8(107, 62, 0);
pub const TV_STAND_COLOR: Color = Color::rgb8(100, 100, 100);
pub const SOFA_COLOR: Color = Color::rgb(1.0, 0.5, 0.5);
pub const TELEVISION_COLOR: Color = Color::rgb8(10, 10, 10);

/// Every piece of furniture in draw order, with the chairs pulled `chair_slide` units
/// away from the table.
pub fn room_layout(chair_slide: f32) -> Result<Vec<Furniture>, RenderError> {
    let mut room = vec![
        furniture::walls(-2.0, 15.0, 15.0, 7.5, WALL_COLOR),
        furniture::table(Placement::at(4.0, 0.0, 4.0), TABLE_COLOR),
    ];

    // Two chairs on each long side of the table, facing each other: front pair first.
    for x in [3.0, 5.0] {
        room.push(furniture::chair(
            Placement::at(x, -0.25, 2.5 - chair_slide),
            CHAIR_COLOR,
        ));
    }
    for x in [3.0, 5.0] {
        room.push(furniture::chair(
            Placement::at(x, -0.25, 5.5 + chair_slide).with_yaw(180.0),
            CHAIR_COLOR,
        ));
    }

    for x in [2.0, 4.0, 6.0] {
        room.push(furniture::shelf_unit(
            ShelfSpec::BOOKSHELF,
            Placement::at(x, -1.9, -7.0),
            BOOKSHELF_COLOR,
        )?);
    }

    room.push(furniture::shelf_unit(
        ShelfSpec::TV_STAND,
        Placement::at(-6.75, -1.9, 0.0).with_yaw(90.0),
        TV_STAND_COLOR,
    )?);

    room.push(furniture::sofa(
        Placement::at(-1.0, 1.0, -2.5).with_yaw(-60.0),
        SOFA_COLOR,
    ));
    room.push(furniture::sofa(
        Placement::at(-1.0, 1.0, 2.5).with_yaw(-120.0),
        SOFA_COLOR,
    ));

    room.push(furniture::television(
        Placement::at(-6.75, 1.2, 0.0).with_yaw(90.0),
        TELEVISION_COLOR,
    ));

    Ok(room)
}

//! Angle and coordinate math for the field.
//!
//! Headings and orientations are measured in calchart degrees: 0 faces +y
//! (east), 90 faces -x (south), 180 faces -y (west) and 270 faces +x
//! (north). The unit vector for an angle `a` is `(-sin a, cos a)`.

use serde::{Deserialize, Serialize};

/// Heading of a move toward the north (+x).
pub const NORTH: f64 = 270.0;
/// Heading of a move toward the south (-x).
pub const SOUTH: f64 = 90.0;
/// Heading of a move toward the east (+y).
pub const EAST: f64 = 0.0;
/// Heading of a move toward the west (-y).
pub const WEST: f64 = 180.0;

const SMALL_SCALE: f64 = 1e10;

/// A position on the field, measured in steps from the south-west corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Coordinate) -> f64 {
        calc_distance(self.x, self.y, other.x, other.y)
    }

    /// Compare two coordinates, ignoring floating point noise.
    pub fn approx_eq(&self, other: &Coordinate) -> bool {
        is_equal(self.x, other.x) && is_equal(self.y, other.y)
    }

    /// Move this coordinate `distance` steps along the given heading.
    pub fn offset(&self, direction: f64, distance: f64) -> Coordinate {
        let radians = direction.to_radians();
        Coordinate {
            x: round_small(self.x - radians.sin() * distance),
            y: round_small(self.y + radians.cos() * distance),
        }
    }
}

pub fn calc_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let delta_x = x2 - x1;
    let delta_y = y2 - y1;
    (delta_x * delta_x + delta_y * delta_y).sqrt()
}

/// The heading, in calchart degrees, of the vector (x1,y1) -> (x2,y2).
pub fn calc_angle(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let delta_x = x2 - x1;
    let delta_y = y2 - y1;
    round_small(wrap((-delta_x).atan2(delta_y).to_degrees(), 360.0))
}

/// X component of the unit vector at the given calchart angle.
pub fn calc_rotated_x_pos(angle: f64) -> f64 {
    round_small(-angle.to_radians().sin())
}

/// Y component of the unit vector at the given calchart angle.
pub fn calc_rotated_y_pos(angle: f64) -> f64 {
    round_small(angle.to_radians().cos())
}

pub fn to_calchart_degrees(angle: f64) -> f64 {
    wrap(270.0 - angle, 360.0)
}

/// Wrap the value into `[0, modulus)`.
pub fn wrap(x: f64, modulus: f64) -> f64 {
    ((x % modulus) + modulus) % modulus
}

/// Round to the nearest multiple of `interval`.
pub fn round(x: f64, interval: f64) -> f64 {
    (x / interval).round() * interval
}

/// Round away floating point error below 1e-10.
pub fn round_small(x: f64) -> f64 {
    let rounded = (x * SMALL_SCALE).round() / SMALL_SCALE;
    // collapse -0.0 so equal positions hash and print the same
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn is_equal(x: f64, y: f64) -> bool {
    round_small(x - y) == 0.0
}

/// Heading for a straight leg along the x axis.
pub fn x_direction(delta_x: f64) -> f64 {
    if delta_x < 0.0 {
        SOUTH
    } else {
        NORTH
    }
}

/// Heading for a straight leg along the y axis.
pub fn y_direction(delta_y: f64) -> f64 {
    if delta_y < 0.0 {
        WEST
    } else {
        EAST
    }
}

/// Heading for a 45-degree diagonal leg with the given axis signs.
pub fn diagonal_direction(delta_x: f64, delta_y: f64) -> f64 {
    match (delta_x < 0.0, delta_y < 0.0) {
        (false, false) => 315.0,
        (false, true) => 225.0,
        (true, false) => 45.0,
        (true, true) => 135.0,
    }
}

/// Rotate `point` about `pivot` by `degrees` calchart degrees. Positive angles
/// turn clockwise when viewed with north up.
pub fn rotate_about(point: &Coordinate, pivot: &Coordinate, degrees: f64) -> Coordinate {
    let radius = pivot.distance(point);
    if is_equal(radius, 0.0) {
        return *pivot;
    }
    let angle = calc_angle(pivot.x, pivot.y, point.x, point.y);
    let rotated = pivot.offset(angle + degrees, radius);
    Coordinate::new(round_small(rotated.x), round_small(rotated.y))
}

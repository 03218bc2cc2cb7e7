use crate::error::{InvalidInput, Result};

/// Default pitch length in meters.
pub const DEFAULT_FIELD_LENGTH: f64 = 105.0;
/// Default pitch width in meters.
pub const DEFAULT_FIELD_WIDTH: f64 = 68.0;

/// Side ID for the bottom edge (y = min), it is negative to prevent conflicts with site IDs.
pub const SIDE_ID_BOTTOM: i64 = -1;
/// Side ID for the right edge (x = max), it is negative to prevent conflicts with site IDs.
pub const SIDE_ID_RIGHT: i64 = -2;
/// Side ID for the top edge (y = max), it is negative to prevent conflicts with site IDs.
pub const SIDE_ID_TOP: i64 = -3;
/// Side ID for the left edge (x = min), it is negative to prevent conflicts with site IDs.
pub const SIDE_ID_LEFT: i64 = -4;

/// An axis-aligned rectangle that all regions are restricted to.
///
/// For a pitch this is `[0, length] x [0, width]`. A boundary is immutable
/// once created, and can only be created through [`Boundary::new`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBoundary"))]
pub struct Boundary {
    pub(crate) min: [f64; 2],
    pub(crate) max: [f64; 2],
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawBoundary {
    min: [f64; 2],
    max: [f64; 2],
}

#[cfg(feature = "serde")]
impl TryFrom<RawBoundary> for Boundary {
    type Error = crate::error::Error;

    fn try_from(raw: RawBoundary) -> Result<Self> {
        Boundary::new(raw.min, raw.max)
    }
}

impl Boundary {
    /// Creates the rectangle spanned by `min` and `max`.
    ///
    /// Fails with [`InvalidInput::MalformedBoundary`] unless both extents are
    /// positive and finite.
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Result<Self> {
        let length = max[0] - min[0];
        let width = max[1] - min[1];
        let finite = min.iter().chain(max.iter()).all(|v| v.is_finite());
        if !finite || !(length > 0.0) || !(width > 0.0) {
            return Err(InvalidInput::MalformedBoundary { length, width }.into());
        }
        Ok(Self { min, max })
    }

    /// The field `[0, length] x [0, width]`.
    pub fn field(length: f64, width: f64) -> Result<Self> {
        Self::new([0.0, 0.0], [length, width])
    }

    pub fn min(&self) -> [f64; 2] {
        self.min
    }

    pub fn max(&self) -> [f64; 2] {
        self.max
    }

    pub fn length(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn width(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn area(&self) -> f64 {
        self.length() * self.width()
    }

    pub fn diagonal(&self) -> f64 {
        self.length().hypot(self.width())
    }

    pub fn center(&self) -> [f64; 2] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
        ]
    }

    /// Corners in counter-clockwise order, starting bottom-left.
    pub fn corners(&self) -> [[f64; 2]; 4] {
        [
            [self.min[0], self.min[1]],
            [self.max[0], self.min[1]],
            [self.max[0], self.max[1]],
            [self.min[0], self.max[1]],
        ]
    }

    /// Whether `point` lies inside or within `tolerance` of the rectangle.
    pub fn contains(&self, point: &[f64; 2], tolerance: f64) -> bool {
        point[0] >= self.min[0] - tolerance
            && point[0] <= self.max[0] + tolerance
            && point[1] >= self.min[1] - tolerance
            && point[1] <= self.max[1] + tolerance
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn covers(&self, other: &Boundary) -> bool {
        other.corners().iter().all(|c| self.contains(c, 0.0))
    }

    /// The four sides as half-planes `(point, outward unit normal, side id)`.
    pub(crate) fn half_planes(&self) -> [([f64; 2], [f64; 2], i64); 4] {
        [
            (self.min, [0.0, -1.0], box_side(1, false)),
            (self.max, [1.0, 0.0], box_side(0, true)),
            (self.max, [0.0, 1.0], box_side(1, true)),
            (self.min, [-1.0, 0.0], box_side(0, false)),
        ]
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            min: [0.0, 0.0],
            max: [DEFAULT_FIELD_LENGTH, DEFAULT_FIELD_WIDTH],
        }
    }
}

/// Calculates the ID for a boundary side based on the axis and direction.
///
/// - Axis 1 (Y) Min: -1
/// - Axis 0 (X) Max: -2
/// - Axis 1 (Y) Max: -3
/// - Axis 0 (X) Min: -4
pub fn box_side(axis: usize, is_max: bool) -> i64 {
    match (axis, is_max) {
        (1, false) => SIDE_ID_BOTTOM,
        (0, true) => SIDE_ID_RIGHT,
        (1, true) => SIDE_ID_TOP,
        _ => SIDE_ID_LEFT,
    }
}

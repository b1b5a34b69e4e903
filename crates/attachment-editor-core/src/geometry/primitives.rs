//! Point, size and rectangle value types.

use std::ops::{Add, Div, Mul, Neg, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A point (or vector) in some 2D coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// The middle of the unit square.
    pub const UNIT_MIDPOINT: Point = Point { x: 0.5, y: 0.5 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise minimum.
    pub fn min(self, other: Point) -> Point {
        DVec2::from(self).min(other.into()).into()
    }

    /// Component-wise maximum.
    pub fn max(self, other: Point) -> Point {
        DVec2::from(self).max(other.into()).into()
    }

    /// Clamp each component into `[min, max]` of the matching component.
    pub fn clamp(self, min: Point, max: Point) -> Point {
        self.max(min).min(max)
    }

    /// Clamp both components into `[0, 1]`.
    pub fn clamp01(self) -> Point {
        self.clamp(Point::ZERO, Point::new(1.0, 1.0))
    }

    pub fn length(self) -> f64 {
        DVec2::from(self).length()
    }

    pub fn distance(self, other: Point) -> f64 {
        DVec2::from(self).distance(other.into())
    }


    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns true if both components are within `epsilon` of `other`.
    pub fn fuzzy_eq(self, other: Point, epsilon: f64) -> bool {
        DVec2::from(self).abs_diff_eq(other.into(), epsilon)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        (DVec2::from(self) + DVec2::from(rhs)).into()
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        (DVec2::from(self) - DVec2::from(rhs)).into()
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        (DVec2::from(self) * rhs).into()
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Point::new(v.x, v.y)
    }
}

impl From<Point> for DVec2 {
    fn from(p: Point) -> Self {
        DVec2::new(p.x, p.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Width and height exchanged.
    pub fn swapped(self) -> Size {
        Size::new(self.height, self.width)
    }

    /// Each dimension rounded to the nearest integer.
    pub fn round(self) -> Size {
        Size::new(self.width.round(), self.height.round())
    }

    /// Each dimension rounded up.
    pub fn ceil(self) -> Size {
        Size::new(self.width.ceil(), self.height.ceil())
    }

    /// The smaller of the two dimensions.
    pub fn min_dimension(self) -> f64 {
        self.width.min(self.height)
    }

    /// Component-wise ratio `self / other`.
    pub fn ratio(self, other: Size) -> Point {
        Point::new(self.width / other.width, self.height / other.height)
    }
}

impl Mul<f64> for Size {
    type Output = Size;
    fn mul(self, rhs: f64) -> Size {
        Size::new(self.width * rhs, self.height * rhs)
    }
}

impl Div<f64> for Size {
    type Output = Size;
    fn div(self, rhs: f64) -> Size {
        Size::new(self.width / rhs, self.height / rhs)
    }
}

/// An axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// A rectangle of `size` at the origin.
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    /// A rectangle of `size` centered on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        Self {
            origin: Point::new(
                center.x - size.width * 0.5,
                center.y - size.height * 0.5,
            ),
            size,
        }
    }

    /// The smallest rectangle containing every point, or `None` if empty.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width * 0.5,
            self.origin.y + self.size.height * 0.5,
        )
    }

    /// Corners in order: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x(), self.min_y()),
            Point::new(self.max_x(), self.min_y()),
            Point::new(self.min_x(), self.max_y()),
            Point::new(self.max_x(), self.max_y()),
        ]
    }

    /// Whether `point` lies inside the rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Grow (positive) or shrink (negative) the rectangle on every side.
    pub fn outset(&self, amount: f64) -> Rect {
        Rect::new(
            self.origin.x - amount,
            self.origin.y - amount,
            self.size.width + amount * 2.0,
            self.size.height + amount * 2.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        !self.size.is_valid()
    }
}

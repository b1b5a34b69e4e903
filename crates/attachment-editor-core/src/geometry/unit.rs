//! Conversion between absolute and unit coordinates.
//!
//! Unit coordinates express a point as a fraction of a reference rectangle:
//! (0, 0) is the rectangle's top-left corner and (1, 1) its bottom-right.
//! Points outside the rectangle have components outside `[0, 1]` unless
//! clamping is requested.

use super::{Point, Rect, Size};
use crate::error::{EditorError, Result};

/// Whether [`to_unit`] should clamp its result into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClamp {
    Clamp,
    Unclamped,
}

/// Convert `point` into unit coordinates of `bounds`.
///
/// Returns [`EditorError::InvalidGeometry`] instead of dividing by a zero
/// (or otherwise invalid) dimension.
pub fn to_unit(point: Point, bounds: Rect, clamp: UnitClamp) -> Result<Point> {
    if !bounds.size.is_valid() {
        return Err(EditorError::invalid_geometry(
            "to_unit",
            bounds.width(),
            bounds.height(),
        ));
    }
    let unit = Point::new(
        (point.x - bounds.min_x()) / bounds.width(),
        (point.y - bounds.min_y()) / bounds.height(),
    );
    Ok(match clamp {
        UnitClamp::Clamp => unit.clamp01(),
        UnitClamp::Unclamped => unit,
    })
}

/// Convert unit coordinates of `bounds` back into absolute coordinates.
///
/// Exact inverse of [`to_unit`] with [`UnitClamp::Unclamped`].
pub fn from_unit(unit: Point, bounds: Rect) -> Point {
    Point::new(
        bounds.min_x() + unit.x * bounds.width(),
        bounds.min_y() + unit.y * bounds.height(),
    )
}

/// Convert a vector (not a point) into units of `size`.
///
/// Used for deltas, where the rectangle's origin is irrelevant.
pub fn vector_to_unit(vector: Point, size: Size) -> Result<Point> {
    to_unit(vector, Rect::from_size(size), UnitClamp::Unclamped)
}

/// Scale a unit vector back up by `size`.
pub fn vector_from_unit(unit: Point, size: Size) -> Point {
    Point::new(unit.x * size.width, unit.y * size.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_unit_basic() {
        let bounds = Rect::new(10.0, 20.0, 100.0, 200.0);
        let unit = to_unit(Point::new(60.0, 70.0), bounds, UnitClamp::Unclamped).unwrap();
        assert_eq!(unit, Point::new(0.5, 0.25));
    }

    #[test]
    fn test_to_unit_outside_unclamped() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let unit = to_unit(Point::new(-50.0, 150.0), bounds, UnitClamp::Unclamped).unwrap();
        assert_eq!(unit, Point::new(-0.5, 1.5));
    }

    #[test]
    fn test_to_unit_clamped() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let unit = to_unit(Point::new(-50.0, 150.0), bounds, UnitClamp::Clamp).unwrap();
        assert_eq!(unit, Point::new(0.0, 1.0));
    }

    #[test]
    fn test_to_unit_zero_bounds_is_error() {
        let bounds = Rect::new(0.0, 0.0, 0.0, 100.0);
        let result = to_unit(Point::new(1.0, 1.0), bounds, UnitClamp::Unclamped);
        assert!(matches!(result, Err(EditorError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_from_unit_basic() {
        let bounds = Rect::new(10.0, 20.0, 100.0, 200.0);
        assert_eq!(from_unit(Point::new(0.5, 0.25), bounds), Point::new(60.0, 70.0));
    }

    #[test]
    fn test_vector_conversions() {
        let size = Size::new(300.0, 400.0);
        let unit = vector_to_unit(Point::new(30.0, -100.0), size).unwrap();
        assert_eq!(unit, Point::new(0.1, -0.25));
        assert_eq!(vector_from_unit(unit, size), Point::new(30.0, -100.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: from_unit(to_unit(p)) == p for any valid bounds.
        #[test]
        fn prop_unit_round_trip(
            x in -1000.0f64..1000.0,
            y in -1000.0f64..1000.0,
            bx in -500.0f64..500.0,
            by in -500.0f64..500.0,
            bw in 0.01f64..1000.0,
            bh in 0.01f64..1000.0,
        ) {
            let bounds = Rect::new(bx, by, bw, bh);
            let p = Point::new(x, y);
            let unit = to_unit(p, bounds, UnitClamp::Unclamped).unwrap();
            let back = from_unit(unit, bounds);
            let epsilon = 1e-9 * (1.0 + x.abs().max(y.abs()) + bx.abs().max(by.abs()));
            prop_assert!(back.fuzzy_eq(p, epsilon), "{:?} != {:?}", back, p);
        }

        /// Property: clamped results always lie in the unit square.
        #[test]
        fn prop_clamped_in_unit_square(
            x in -1000.0f64..1000.0,
            y in -1000.0f64..1000.0,
            bw in 0.01f64..1000.0,
            bh in 0.01f64..1000.0,
        ) {
            let bounds = Rect::new(0.0, 0.0, bw, bh);
            let unit = to_unit(Point::new(x, y), bounds, UnitClamp::Clamp).unwrap();
            prop_assert!((0.0..=1.0).contains(&unit.x));
            prop_assert!((0.0..=1.0).contains(&unit.y));
        }
    }
}

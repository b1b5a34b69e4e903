//! Image frame computation and projections between coordinate spaces.

use glam::DAffine2;

use super::Transform;
use crate::error::{EditorError, Result};
use crate::geometry::{to_unit, Point, Rect, Size, UnitClamp};

/// Compute the canvas-space rectangle occupied by the unscaled background
/// image.
///
/// The image is sized to "cover" the axis-aligned bounding box of the canvas
/// rotated by the transform's rotation, preserving the image aspect ratio,
/// and centered on the canvas. Once rotated it therefore covers `view_size`
/// with no gaps. All unit-space items are projected through this frame,
/// which keeps their placement stable under rotation, scale and flip.
///
/// # Errors
///
/// [`EditorError::InvalidGeometry`] if either size has a zero dimension.
pub fn image_frame(view_size: Size, image_size: Size, transform: &Transform) -> Result<Rect> {
    if !view_size.is_valid() {
        return Err(EditorError::invalid_geometry(
            "image_frame view",
            view_size.width,
            view_size.height,
        ));
    }
    if !image_size.is_valid() {
        return Err(EditorError::invalid_geometry(
            "image_frame image",
            image_size.width,
            image_size.height,
        ));
    }

    let sin = transform.rotation_radians.sin().abs();
    let cos = transform.rotation_radians.cos().abs();
    let output_size = Size::new(
        view_size.width * cos + view_size.height * sin,
        view_size.width * sin + view_size.height * cos,
    );

    // Width-fit first; fall back to height-fit if that leaves a vertical gap.
    let mut width = output_size.width;
    let mut height = output_size.width * image_size.height / image_size.width;
    if height < output_size.height {
        width = output_size.height * image_size.width / image_size.height;
        height = output_size.height;
    }

    Ok(Rect::centered(
        Rect::from_size(view_size).center(),
        Size::new(width, height),
    ))
}

/// Project a canvas-space point into view space.
///
/// The content affine is applied about the view center, matching how the
/// content layer is anchored.
pub fn content_to_view(point: Point, view_size: Size, affine: &DAffine2) -> Point {
    let center = Rect::from_size(view_size).center();
    Point::from(affine.transform_point2((point - center).into())) + center
}

/// Project a view-space point back into canvas space. Inverse of
/// [`content_to_view`].
pub fn view_to_content(point: Point, view_size: Size, affine: &DAffine2) -> Point {
    let center = Rect::from_size(view_size).center();
    Point::from(affine.inverse().transform_point2((point - center).into())) + center
}

/// Convert a location in the view into image unit coordinates under the
/// given transform. Not clamped: locations off the image fall outside
/// `[0, 1]`.
pub fn location_image_unit(
    location_in_view: Point,
    view_size: Size,
    src_image_size: Size,
    transform: &Transform,
) -> Result<Point> {
    let frame = image_frame(view_size, src_image_size, transform)?;
    let affine = transform.affine_transform(view_size);
    let location_in_content = view_to_content(location_in_view, view_size, &affine);
    to_unit(location_in_content, frame, UnitClamp::Unclamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::from_unit;
    use std::f64::consts::FRAC_PI_2;

    fn approx_rect(a: Rect, b: Rect) -> bool {
        a.origin.fuzzy_eq(b.origin, 1e-9)
            && (a.width() - b.width()).abs() < 1e-9
            && (a.height() - b.height()).abs() < 1e-9
    }

    #[test]
    fn test_image_frame_same_aspect() {
        let t = Transform::default_for(Size::new(100.0, 200.0));
        let frame = image_frame(Size::new(100.0, 200.0), Size::new(100.0, 200.0), &t).unwrap();
        assert!(approx_rect(frame, Rect::new(0.0, 0.0, 100.0, 200.0)));
    }

    #[test]
    fn test_image_frame_tall_image_covers_canvas() {
        // A 1:2 image covering a 300x400 canvas is width-fit to 300x600 and
        // overflows vertically by 100 on each side.
        let t = Transform::default_for(Size::new(300.0, 400.0));
        let frame = image_frame(Size::new(300.0, 400.0), Size::new(100.0, 200.0), &t).unwrap();
        assert!(approx_rect(frame, Rect::new(0.0, -100.0, 300.0, 600.0)));
    }

    #[test]
    fn test_image_frame_wide_image_height_fit() {
        let t = Transform::default_for(Size::new(300.0, 400.0));
        let frame = image_frame(Size::new(300.0, 400.0), Size::new(400.0, 200.0), &t).unwrap();
        assert!(approx_rect(frame, Rect::new(-250.0, 0.0, 800.0, 400.0)));
    }

    #[test]
    fn test_image_frame_quarter_turn_uses_swapped_bounds() {
        let t = Transform::default_for(Size::new(300.0, 400.0)).with_rotation(FRAC_PI_2);
        let frame = image_frame(Size::new(300.0, 400.0), Size::new(400.0, 300.0), &t).unwrap();
        // The rotated canvas footprint is 400x300, which the image fits exactly.
        assert!(approx_rect(frame, Rect::new(-50.0, 50.0, 400.0, 300.0)));
    }

    #[test]
    fn test_image_frame_zero_view_is_error() {
        let t = Transform::default_for(Size::new(1.0, 1.0));
        let result = image_frame(Size::new(0.0, 100.0), Size::new(10.0, 10.0), &t);
        assert!(matches!(result, Err(EditorError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_image_frame_zero_image_is_error() {
        let t = Transform::default_for(Size::new(1.0, 1.0));
        let result = image_frame(Size::new(100.0, 100.0), Size::new(10.0, 0.0), &t);
        assert!(matches!(result, Err(EditorError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_view_content_round_trip() {
        let view = Size::new(300.0, 400.0);
        let t = Transform::new(view, Point::new(0.1, -0.2), 0.7, 1.5, false);
        let affine = t.affine_transform(view);
        let p = Point::new(12.0, 345.0);
        let back = view_to_content(content_to_view(p, view, &affine), view, &affine);
        assert!(back.fuzzy_eq(p, 1e-9));
    }

    #[test]
    fn test_location_image_unit_identity() {
        let view = Size::new(200.0, 100.0);
        let src = Size::new(400.0, 200.0);
        let t = Transform::default_for(src);
        let unit = location_image_unit(Point::new(50.0, 75.0), view, src, &t).unwrap();
        assert!(unit.fuzzy_eq(Point::new(0.25, 0.75), 1e-9));
    }

    #[test]
    fn test_location_image_unit_follows_translation() {
        let view = Size::new(100.0, 100.0);
        let src = Size::new(100.0, 100.0);
        let t = Transform::new(view, Point::new(0.25, 0.0), 0.0, 2.0, false);
        // Content center sits at view (75, 50); that is image unit (0.5, 0.5).
        let unit = location_image_unit(Point::new(75.0, 50.0), view, src, &t).unwrap();
        assert!(unit.fuzzy_eq(Point::UNIT_MIDPOINT, 1e-9));
    }

    #[test]
    fn test_unit_item_projection_round_trip() {
        let view = Size::new(300.0, 400.0);
        let src = Size::new(640.0, 480.0);
        let t = Transform::new(view, Point::new(0.05, 0.1), 0.4, 1.8, true);
        let frame = image_frame(view, src, &t).unwrap();
        let affine = t.affine_transform(view);
        let unit = Point::new(0.3, 0.6);
        let in_view = content_to_view(from_unit(unit, frame), view, &affine);
        let back = location_image_unit(in_view, view, src, &t).unwrap();
        assert!(back.fuzzy_eq(unit, 1e-9));
    }
}

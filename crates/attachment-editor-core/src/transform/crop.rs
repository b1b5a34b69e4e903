//! Committing a crop rectangle into a new transform.
//!
//! Cropping changes the output size and usually its aspect ratio. Because
//! the background image is rendered as an "aspect fill" of the output, the
//! scaling and translation both have to be recomputed so the content under
//! the crop rectangle is exactly what ends up on the new canvas.
//!
//! # Coordinate System
//!
//! The crop rectangle is in canvas-bounds coordinates: the same space as the
//! on-screen clip view, origin top-left, `canvas_size` in extent.

use super::{content_to_view, image_frame, Transform};
use crate::error::{EditorError, Result};
use crate::geometry::{to_unit, Point, Rect, Size, UnitClamp};

/// Relative tolerance for the width/height scaling deltas to disagree.
const SCALING_DELTA_TOLERANCE: f64 = 0.01;

/// New output pixel size after cropping `crop_rect` out of a canvas of
/// `canvas_size`, rounded per axis (never below one pixel).
pub fn cropped_output_size(output_size: Size, canvas_size: Size, crop_rect: Rect) -> Result<Size> {
    if !canvas_size.is_valid() {
        return Err(EditorError::invalid_geometry(
            "crop canvas",
            canvas_size.width,
            canvas_size.height,
        ));
    }
    if !crop_rect.size.is_valid() {
        return Err(EditorError::invalid_geometry(
            "crop rect",
            crop_rect.width(),
            crop_rect.height(),
        ));
    }
    if !output_size.is_valid() {
        return Err(EditorError::invalid_geometry(
            "crop output",
            output_size.width,
            output_size.height,
        ));
    }
    let ratio = crop_rect.size.ratio(canvas_size);
    let cropped = Size::new(output_size.width * ratio.x, output_size.height * ratio.y).round();
    Ok(Size::new(cropped.width.max(1.0), cropped.height.max(1.0)))
}

/// Build the transform that shows exactly the content under `crop_rect`.
///
/// 1. The output size shrinks by the crop/canvas ratio per axis.
/// 2. Scaling is corrected by how much the "naive" image frame (same
///    translation, rotation and scaling) changes between the old and new
///    output sizes.
/// 3. Translation is recomputed so the image content center stays put: the
///    old frame center is projected into view space and re-expressed in unit
///    coordinates of the crop rectangle, relative to its midpoint.
///
/// The result is normalized. Nothing is mutated, so an error leaves the
/// caller's state untouched.
pub fn crop_transform(
    transform: &Transform,
    src_image_size: Size,
    canvas_size: Size,
    crop_rect: Rect,
) -> Result<Transform> {
    let old_output = transform.output_size_pixels;
    let new_output = cropped_output_size(old_output, canvas_size, crop_rect)?;

    let naive = Transform {
        output_size_pixels: new_output,
        ..*transform
    };
    let naive_frame_old = image_frame(old_output, src_image_size, &naive)?;
    let naive_frame_new = image_frame(new_output, src_image_size, &naive)?;
    let delta_x = naive_frame_new.width() / naive_frame_old.width();
    let delta_y = naive_frame_new.height() / naive_frame_old.height();
    let scaling_delta = (delta_x + delta_y) * 0.5;
    if (delta_x - delta_y).abs() > SCALING_DELTA_TOLERANCE * scaling_delta {
        tracing::warn!(delta_x, delta_y, "crop scaling deltas diverge beyond rounding");
    }
    let scaling = transform.scaling / scaling_delta;

    let old_affine = transform.affine_transform(canvas_size);
    let old_frame_canvas = image_frame(canvas_size, src_image_size, transform)?;
    let old_image_center_view =
        content_to_view(old_frame_canvas.center(), canvas_size, &old_affine);
    let new_image_center_unit = to_unit(old_image_center_view, crop_rect, UnitClamp::Unclamped)?;
    let unit_translation = new_image_center_unit - Point::UNIT_MIDPOINT;

    tracing::debug!(
        old_width = old_output.width,
        old_height = old_output.height,
        new_width = new_output.width,
        new_height = new_output.height,
        scaling_delta,
        "crop committed"
    );

    Ok(Transform::new(
        new_output,
        unit_translation,
        transform.rotation_radians,
        scaling,
        transform.is_flipped,
    )
    .normalize(src_image_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::location_image_unit;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_cropped_output_size_scenario() {
        let size = cropped_output_size(
            Size::new(300.0, 400.0),
            Size::new(300.0, 400.0),
            Rect::new(50.0, 50.0, 200.0, 300.0),
        )
        .unwrap();
        assert_eq!(size, Size::new(200.0, 300.0));
    }

    #[test]
    fn test_cropped_output_size_scales_with_pixels() {
        // On-screen canvas is half the output resolution.
        let size = cropped_output_size(
            Size::new(1200.0, 1600.0),
            Size::new(600.0, 800.0),
            Rect::new(0.0, 0.0, 300.0, 200.0),
        )
        .unwrap();
        assert_eq!(size, Size::new(600.0, 400.0));
    }

    #[test]
    fn test_cropped_output_size_rounds() {
        let size = cropped_output_size(
            Size::new(100.0, 100.0),
            Size::new(300.0, 300.0),
            Rect::new(0.0, 0.0, 100.0, 200.0),
        )
        .unwrap();
        assert_eq!(size, Size::new(33.0, 67.0));
    }

    #[test]
    fn test_zero_canvas_is_error() {
        let t = Transform::default_for(Size::new(300.0, 400.0));
        let result = crop_transform(
            &t,
            Size::new(300.0, 400.0),
            Size::new(0.0, 400.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        assert!(matches!(result, Err(EditorError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_zero_crop_rect_is_error() {
        let t = Transform::default_for(Size::new(300.0, 400.0));
        let result = crop_transform(
            &t,
            Size::new(300.0, 400.0),
            Size::new(300.0, 400.0),
            Rect::new(10.0, 10.0, 0.0, 100.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_full_crop_is_identity() {
        let src = Size::new(640.0, 480.0);
        let t = Transform::new(Size::new(640.0, 480.0), Point::new(0.1, -0.05), 0.2, 1.7, false)
            .normalize(src);
        let canvas = Size::new(320.0, 240.0);
        let cropped = crop_transform(&t, src, canvas, Rect::from_size(canvas)).unwrap();
        assert_eq!(cropped.output_size_pixels, t.output_size_pixels);
        assert!(approx(cropped.scaling, t.scaling));
        assert!(cropped.unit_translation.fuzzy_eq(t.unit_translation, 1e-9));
        assert!(approx(cropped.rotation_radians, t.rotation_radians));
    }

    #[test]
    fn test_centered_half_crop_doubles_scaling() {
        let src = Size::new(300.0, 400.0);
        let t = Transform::default_for(src);
        let canvas = Size::new(300.0, 400.0);
        let cropped = crop_transform(&t, src, canvas, Rect::new(75.0, 100.0, 150.0, 200.0)).unwrap();
        assert_eq!(cropped.output_size_pixels, Size::new(150.0, 200.0));
        assert!(approx(cropped.scaling, 2.0));
        assert!(cropped.unit_translation.fuzzy_eq(Point::ZERO, 1e-9));
    }

    #[test]
    fn test_corner_crop_keeps_top_left_content() {
        let src = Size::new(300.0, 400.0);
        let t = Transform::default_for(src);
        let canvas = Size::new(300.0, 400.0);
        let cropped = crop_transform(&t, src, canvas, Rect::new(0.0, 0.0, 150.0, 200.0)).unwrap();
        assert_eq!(cropped.output_size_pixels, Size::new(150.0, 200.0));
        assert!(approx(cropped.scaling, 2.0));
        // The image center now sits on the new canvas's bottom-right corner.
        assert!(cropped.unit_translation.fuzzy_eq(Point::new(0.5, 0.5), 1e-9));
    }

    #[test]
    fn test_crop_keeps_content_under_rect_fixed() {
        let src = Size::new(300.0, 400.0);
        let canvas = Size::new(300.0, 400.0);
        let t = Transform::new(canvas, Point::new(0.02, -0.01), 0.785, 2.0, false).normalize(src);
        let crop = Rect::new(60.0, 80.0, 180.0, 220.0);
        let cropped = crop_transform(&t, src, canvas, crop).unwrap();
        assert_eq!(cropped.output_size_pixels, crop.size);

        // The new view is the crop rectangle; every location inside it must
        // still land on the same image point.
        let locations = [
            crop.center(),
            crop.origin + Point::new(10.0, 15.0),
            Point::new(crop.max_x() - 5.0, crop.max_y() - 5.0),
            Point::new(100.0, 250.0),
        ];
        for location in locations {
            let before = location_image_unit(location, canvas, src, &t).unwrap();
            let after = location_image_unit(location - crop.origin, crop.size, src, &cropped).unwrap();
            assert!(before.fuzzy_eq(after, 1e-9), "{location:?}: {before:?} vs {after:?}");
        }
    }

    #[test]
    fn test_crop_preserves_rotation_and_flip() {
        let src = Size::new(300.0, 400.0);
        let t = Transform::default_for(src).rotated_45().flipped().normalize(src);
        let canvas = Size::new(300.0, 400.0);
        let cropped = crop_transform(&t, src, canvas, Rect::new(50.0, 50.0, 200.0, 300.0)).unwrap();
        assert_eq!(cropped.output_size_pixels, Size::new(200.0, 300.0));
        assert!(approx(cropped.rotation_radians, t.rotation_radians));
        assert!(cropped.is_flipped);
    }
}
